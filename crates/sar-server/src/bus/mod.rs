//! Real-time fan-out bus: topic-addressed pub/sub with bounded, per-subscriber
//! queues. A slow subscriber can never block a fast one, and a lagging
//! subscriber is dropped rather than allowed to apply backpressure to the
//! publisher.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sar_core::Topic;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize)]
pub struct BusMessage {
    pub topic: String,
    pub payload: serde_json::Value,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    pub queue_depth: usize,
    pub lag_limit: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            queue_depth: 256,
            lag_limit: 16,
        }
    }
}

impl From<&sar_core::MissionThresholds> for BusConfig {
    fn from(thresholds: &sar_core::MissionThresholds) -> Self {
        Self {
            queue_depth: thresholds.bus_queue_depth,
            lag_limit: thresholds.bus_lag_limit,
        }
    }
}

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<BusMessage>,
    consecutive_lags: AtomicU32,
}

pub struct FanOutBus {
    config: BusConfig,
    subscribers: DashMap<String, Vec<Arc<Subscriber>>>,
    next_id: AtomicU64,
}

pub struct Subscription {
    pub id: u64,
    pub topic: String,
    pub rx: mpsc::Receiver<BusMessage>,
}

impl FanOutBus {
    pub fn new(config: BusConfig) -> Self {
        Self {
            config,
            subscribers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self, topic: &Topic) -> Subscription {
        let (tx, rx) = mpsc::channel(self.config.queue_depth);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sub = Arc::new(Subscriber {
            id,
            tx,
            consecutive_lags: AtomicU32::new(0),
        });
        self.subscribers
            .entry(topic.as_str().to_string())
            .or_default()
            .push(sub);
        Subscription {
            id,
            topic: topic.as_str().to_string(),
            rx,
        }
    }

    pub fn unsubscribe(&self, topic: &str, id: u64) {
        if let Some(mut entry) = self.subscribers.get_mut(topic) {
            entry.retain(|sub| sub.id != id);
        }
    }

    /// Publish to every current subscriber of `topic`. Never blocks: a full
    /// queue counts as a lag for that subscriber rather than stalling the
    /// publisher. After `lag_limit` consecutive lags the subscriber is
    /// dropped and a `subscriber_dropped` alert is raised.
    pub fn publish(&self, topic: &Topic, payload: serde_json::Value) {
        self.publish_raw(topic.as_str(), payload);
    }

    fn publish_raw(&self, topic: &str, payload: serde_json::Value) {
        let message = BusMessage {
            topic: topic.to_string(),
            payload,
            published_at: Utc::now(),
        };

        let mut dropped: Vec<u64> = Vec::new();
        if let Some(entry) = self.subscribers.get(topic) {
            for sub in entry.value() {
                match sub.tx.try_send(message.clone()) {
                    Ok(()) => {
                        sub.consecutive_lags.store(0, Ordering::Relaxed);
                    }
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        let lags = sub.consecutive_lags.fetch_add(1, Ordering::Relaxed) + 1;
                        if lags >= self.config.lag_limit {
                            dropped.push(sub.id);
                        }
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dropped.push(sub.id);
                    }
                }
            }
        }

        if dropped.is_empty() {
            return;
        }

        if let Some(mut entry) = self.subscribers.get_mut(topic) {
            entry.retain(|sub| !dropped.contains(&sub.id));
        }

        for id in dropped {
            if topic != Topic::Alerts.as_str() {
                self.publish_raw(
                    Topic::Alerts.as_str(),
                    serde_json::json!({
                        "event": "subscriber_dropped",
                        "topic": topic,
                        "subscriber_id": id,
                    }),
                );
            }
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers.get(topic).map(|e| e.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_subscribed_topic_only() {
        let bus = FanOutBus::new(BusConfig::default());
        let mut sub = bus.subscribe(&Topic::Alerts);
        bus.publish(&Topic::Telemetry, serde_json::json!({"x": 1}));
        bus.publish(&Topic::Alerts, serde_json::json!({"y": 2}));
        let msg = sub.rx.recv().await.unwrap();
        assert_eq!(msg.topic, "alerts");
        assert!(sub.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn drops_subscriber_after_sustained_lag() {
        let bus = FanOutBus::new(BusConfig {
            queue_depth: 1,
            lag_limit: 3,
        });
        let sub = bus.subscribe(&Topic::Detections);
        for _ in 0..10 {
            bus.publish(&Topic::Detections, serde_json::json!({}));
        }
        assert_eq!(bus.subscriber_count("detections"), 0);
        drop(sub);
    }
}
