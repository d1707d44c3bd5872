//! `/ws` real-time stream client: subscribe/unsubscribe/ping envelope
//! protocol over a `tokio-tungstenite` WebSocket.

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// A message received on the stream: a topic publication, or one of the
/// control acknowledgements (`pong`, `subscribed`, `unsubscribed`,
/// `subscriber_dropped`).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage<'a> {
    Subscribe { payload: TopicsPayload<'a> },
    Unsubscribe { payload: TopicsPayload<'a> },
    Ping,
}

#[derive(Debug, Serialize)]
struct TopicsPayload<'a> {
    topics: &'a [String],
}

/// An open `/ws` connection.
pub struct FleetStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl FleetStream {
    pub(crate) async fn connect(base_url: &str) -> Result<Self> {
        let url = build_ws_url(base_url)?;
        let (socket, _) = connect_async(url.as_str()).await?;
        Ok(Self { socket })
    }

    /// Subscribe to one or more topics (`telemetry`, `mission_updates`,
    /// `ai_decisions`, `alerts`, `detections`, or an ad-hoc name).
    pub async fn subscribe(&mut self, topics: &[String]) -> Result<()> {
        self.send(&ClientMessage::Subscribe { payload: TopicsPayload { topics } }).await
    }

    /// Unsubscribe from one or more topics.
    pub async fn unsubscribe(&mut self, topics: &[String]) -> Result<()> {
        self.send(&ClientMessage::Unsubscribe { payload: TopicsPayload { topics } }).await
    }

    /// Send a keepalive ping; expect a `pong` event in response.
    pub async fn ping(&mut self) -> Result<()> {
        self.send(&ClientMessage::Ping).await
    }

    async fn send(&mut self, msg: &ClientMessage<'_>) -> Result<()> {
        let text = serde_json::to_string(msg)?;
        self.socket.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Read the next event from the stream. Returns `None` once the server
    /// closes the connection.
    pub async fn next_event(&mut self) -> Result<Option<ServerEvent>> {
        while let Some(msg) = self.socket.next().await {
            match msg? {
                Message::Text(text) => return Ok(Some(serde_json::from_str(&text)?)),
                Message::Close(_) => return Ok(None),
                _ => continue,
            }
        }
        Ok(None)
    }
}

fn build_ws_url(base: &str) -> Result<Url> {
    let mut url = Url::parse(base)?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => other,
    }
    .to_string();
    url.set_scheme(&scheme).map_err(|_| anyhow::anyhow!("invalid base URL scheme"))?;
    url.set_path("/ws");
    Ok(url)
}
