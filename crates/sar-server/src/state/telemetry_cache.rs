//! In-memory, per-drone telemetry cache.
//!
//! Each drone gets its own slot; a write to drone A never blocks a read of
//! drone B. Ingest enforces strictly monotonic timestamps per drone and
//! fans the accepted reading out to the `telemetry` bus topic without
//! waiting on subscriber drains.

use chrono::Utc;
use dashmap::DashMap;
use sar_core::{DroneId, Telemetry, Topic};
use std::collections::HashMap;
use std::sync::Arc;

use crate::bus::FanOutBus;

pub struct TelemetryCache {
    slots: DashMap<DroneId, Telemetry>,
    bus: Arc<FanOutBus>,
}

impl TelemetryCache {
    pub fn new(bus: Arc<FanOutBus>) -> Self {
        Self {
            slots: DashMap::new(),
            bus,
        }
    }

    /// Accept a telemetry reading if its timestamp is strictly newer than
    /// the drone's current slot. Returns `false` for stale/duplicate reports.
    pub fn ingest(&self, reading: Telemetry) -> bool {
        let accepted = match self.slots.get(&reading.drone_id) {
            Some(existing) => reading.timestamp > existing.timestamp,
            None => true,
        };
        if !accepted {
            return false;
        }

        self.slots.insert(reading.drone_id.clone(), reading.clone());
        let payload = serde_json::json!({
            "drone_id": reading.drone_id.0,
            "lat": reading.lat,
            "lon": reading.lon,
            "altitude_m": reading.altitude_m,
            "heading_deg": reading.heading_deg,
            "speed_mps": reading.speed_mps,
            "battery_pct": reading.battery_pct,
            "timestamp": reading.timestamp,
        });
        self.bus.publish(&Topic::Telemetry, payload);
        true
    }

    pub fn get(&self, drone_id: &DroneId) -> Option<Telemetry> {
        self.slots.get(drone_id).map(|entry| entry.value().clone())
    }

    /// Point-in-time snapshot of every drone's last known telemetry. Each
    /// drone's reading is read atomically; the map as a whole is not a
    /// single critical section.
    pub fn snapshot(&self) -> HashMap<DroneId, Telemetry> {
        self.slots
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn seconds_since_last_seen(&self, drone_id: &DroneId) -> Option<i64> {
        self.slots
            .get(drone_id)
            .map(|entry| (Utc::now() - entry.value().timestamp).num_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reading(drone: &str, ts: chrono::DateTime<Utc>) -> Telemetry {
        Telemetry {
            drone_id: DroneId::from(drone),
            lat: 0.0,
            lon: 0.0,
            altitude_m: 10.0,
            heading_deg: 0.0,
            speed_mps: 0.0,
            battery_pct: 100.0,
            timestamp: ts,
        }
    }

    #[test]
    fn rejects_stale_reading() {
        let cache = TelemetryCache::new(Arc::new(FanOutBus::new(Default::default())));
        let t0 = Utc::now();
        assert!(cache.ingest(reading("d1", t0)));
        assert!(!cache.ingest(reading("d1", t0 - Duration::seconds(1))));
        assert!(cache.ingest(reading("d1", t0 + Duration::seconds(1))));
    }

    #[test]
    fn independent_drone_slots() {
        let cache = TelemetryCache::new(Arc::new(FanOutBus::new(Default::default())));
        let t0 = Utc::now();
        cache.ingest(reading("d1", t0));
        cache.ingest(reading("d2", t0));
        assert_eq!(cache.snapshot().len(), 2);
    }
}
