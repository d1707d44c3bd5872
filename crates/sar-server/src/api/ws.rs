//! Real-time stream: a single `/ws` WebSocket speaking the subscribe /
//! unsubscribe / ping envelope protocol, backed by the fan-out bus.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use sar_core::Topic;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app_state::AppState;
use crate::bus::BusMessage;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Subscribe { payload: TopicsPayload },
    Unsubscribe { payload: TopicsPayload },
    Ping,
}

#[derive(Debug, Deserialize)]
struct TopicsPayload {
    topics: Vec<String>,
}

struct ActiveSubscription {
    id: u64,
    forwarder: JoinHandle<()>,
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

fn envelope(msg_type: &str, payload: serde_json::Value) -> String {
    serde_json::json!({
        "type": msg_type,
        "payload": payload,
        "timestamp": Utc::now(),
    })
    .to_string()
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let (forward_tx, mut forward_rx) = mpsc::channel::<BusMessage>(256);
    let mut subscriptions: HashMap<String, ActiveSubscription> = HashMap::new();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(msg)) = incoming else { break };
                let Message::Text(text) = msg else { continue };
                let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) else { continue };
                match client_msg {
                    ClientMessage::Ping => {
                        if socket.send(Message::Text(envelope("pong", serde_json::Value::Null))).await.is_err() {
                            break;
                        }
                    }
                    ClientMessage::Subscribe { payload } => {
                        for topic in payload.topics {
                            if subscriptions.contains_key(&topic) {
                                continue;
                            }
                            let mut sub = state.bus.subscribe(&Topic::parse(&topic));
                            let id = sub.id;
                            let tx = forward_tx.clone();
                            let forwarder = tokio::spawn(async move {
                                while let Some(message) = sub.rx.recv().await {
                                    if tx.send(message).await.is_err() {
                                        break;
                                    }
                                }
                            });
                            subscriptions.insert(topic, ActiveSubscription { id, forwarder });
                        }
                        let topics: Vec<&String> = subscriptions.keys().collect();
                        if socket
                            .send(Message::Text(envelope("subscribed", serde_json::json!({"topics": topics}))))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    ClientMessage::Unsubscribe { payload } => {
                        for topic in &payload.topics {
                            if let Some(active) = subscriptions.remove(topic) {
                                state.bus.unsubscribe(topic, active.id);
                                active.forwarder.abort();
                            }
                        }
                        if socket
                            .send(Message::Text(envelope("unsubscribed", serde_json::json!({"topics": payload.topics}))))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
            forwarded = forward_rx.recv() => {
                let Some(message) = forwarded else { break };
                let text = envelope(&message.topic, message.payload);
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    }

    for (topic, active) in subscriptions {
        state.bus.unsubscribe(&topic, active.id);
        active.forwarder.abort();
    }
}
