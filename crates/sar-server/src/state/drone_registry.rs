//! Drone fleet registry: identity, connectivity status and mission assignment.
//!
//! Only the registry mutates a `DroneRecord`'s status/assignment fields; the
//! mission driver reads assignment to enforce at-most-one-active-mission.

use chrono::Utc;
use dashmap::DashMap;
use sar_core::{DroneId, DroneRecord, DroneStatus, MissionId, MissionThresholds, Telemetry};

pub struct DroneRegistry {
    drones: DashMap<DroneId, DroneRecord>,
    thresholds: MissionThresholds,
}

impl DroneRegistry {
    pub fn new(thresholds: MissionThresholds) -> Self {
        Self {
            drones: DashMap::new(),
            thresholds,
        }
    }

    pub fn register(&self, drone_id: DroneId) {
        self.drones
            .entry(drone_id.clone())
            .or_insert_with(|| DroneRecord::new(drone_id));
    }

    pub fn record_telemetry(&self, reading: &Telemetry) {
        self.drones
            .entry(reading.drone_id.clone())
            .and_modify(|record| {
                record.status = DroneStatus::Online;
                record.last_telemetry = Some(reading.clone());
                record.last_seen = Some(reading.timestamp);
            })
            .or_insert_with(|| {
                let mut record = DroneRecord::new(reading.drone_id.clone());
                record.status = DroneStatus::Online;
                record.last_telemetry = Some(reading.clone());
                record.last_seen = Some(reading.timestamp);
                record
            });
    }

    pub fn get(&self, drone_id: &DroneId) -> Option<DroneRecord> {
        self.drones.get(drone_id).map(|e| e.value().clone())
    }

    pub fn snapshot(&self) -> Vec<DroneRecord> {
        self.drones.iter().map(|e| e.value().clone()).collect()
    }

    /// At-most-one-mission invariant: fails if the drone already has an
    /// assignment different from `mission_id`.
    pub fn set_assignment(&self, drone_id: &DroneId, mission_id: MissionId) -> Result<(), String> {
        let mut entry = self
            .drones
            .entry(drone_id.clone())
            .or_insert_with(|| DroneRecord::new(drone_id.clone()));
        match &entry.assigned_mission {
            Some(existing) if *existing != mission_id => {
                Err(format!("drone {} already assigned to mission {}", drone_id, existing))
            }
            _ => {
                entry.assigned_mission = Some(mission_id);
                Ok(())
            }
        }
    }

    pub fn clear_assignment(&self, drone_id: &DroneId) {
        if let Some(mut entry) = self.drones.get_mut(drone_id) {
            entry.assigned_mission = None;
        }
    }

    /// Low-frequency sweep transitioning online -> degraded -> offline based
    /// on telemetry silence.
    pub fn tick_timeouts(&self) {
        let now = Utc::now();
        for mut entry in self.drones.iter_mut() {
            let Some(last_seen) = entry.last_seen else {
                continue;
            };
            let silence = (now - last_seen).num_seconds().max(0) as u64;
            let degraded_at = self.thresholds.communication_timeout.as_secs();
            let offline_at = self.thresholds.lost_timeout().as_secs();
            entry.status = if silence >= offline_at {
                DroneStatus::Offline
            } else if silence >= degraded_at {
                DroneStatus::Degraded
            } else {
                DroneStatus::Online
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_is_exclusive() {
        let registry = DroneRegistry::new(MissionThresholds::default());
        let drone = DroneId::from("d1");
        registry.register(drone.clone());
        registry.set_assignment(&drone, MissionId::from("m1".to_string())).unwrap();
        let result = registry.set_assignment(&drone, MissionId::from("m2".to_string()));
        assert!(result.is_err());
        registry.clear_assignment(&drone);
        registry.set_assignment(&drone, MissionId::from("m2".to_string())).unwrap();
    }
}
