//! Mission and safety thresholds for the SAR drone fleet coordinator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Numeric thresholds driving phase completion predicates, safety checks and
/// dispatch deadlines. Overridable per mission; these are the fleet-wide
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionThresholds {
    /// Altitude match tolerance for phase completion (meters).
    pub alt_tolerance_m: f64,
    /// Horizontal position match tolerance for phase completion (meters).
    pub pos_tolerance_m: f64,
    /// Altitude-above-ground tolerance counted as "on the ground" (meters).
    pub ground_tolerance_m: f64,
    /// Telemetry silence before a drone is marked degraded.
    pub communication_timeout: Duration,
    /// Multiplier of `communication_timeout` before a drone is marked lost.
    pub lost_multiplier: u32,
    /// Battery percentage at which a drone is considered low.
    pub low_battery_pct: f64,
    /// Battery percentage at which a drone is considered critical.
    pub critical_battery_pct: f64,
    /// Maximum time a mission may remain in PREPARE before it is failed.
    pub prepare_timeout: Duration,
    /// Total wall-clock budget for an emergency command's dispatch + outcome.
    pub emergency_deadline: Duration,
    /// Per-command deadline for routine (non-emergency) transport sends.
    pub routine_send_deadline: Duration,
    /// Capacity of the in-memory decision log ring buffer.
    pub decision_log_capacity: usize,
    /// Per-subscriber bounded queue depth on the fan-out bus.
    pub bus_queue_depth: usize,
    /// Consecutive lags before a fan-out subscriber is auto-unsubscribed.
    pub bus_lag_limit: u32,
}

impl Default for MissionThresholds {
    fn default() -> Self {
        Self {
            alt_tolerance_m: 1.5,
            pos_tolerance_m: 2.0,
            ground_tolerance_m: 0.5,
            communication_timeout: Duration::from_secs(10),
            lost_multiplier: 2,
            low_battery_pct: 25.0,
            critical_battery_pct: 15.0,
            prepare_timeout: Duration::from_secs(30),
            emergency_deadline: Duration::from_secs(5),
            routine_send_deadline: Duration::from_secs(3),
            decision_log_capacity: 10_000,
            bus_queue_depth: 256,
            bus_lag_limit: 16,
        }
    }
}

impl MissionThresholds {
    pub fn lost_timeout(&self) -> Duration {
        self.communication_timeout * self.lost_multiplier
    }
}
