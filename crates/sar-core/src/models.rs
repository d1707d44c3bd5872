//! Core data models for the SAR drone fleet coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype over a drone's registered identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DroneId(pub String);

impl fmt::Display for DroneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DroneId {
    fn from(value: String) -> Self {
        DroneId(value)
    }
}

impl From<&str> for DroneId {
    fn from(value: &str) -> Self {
        DroneId(value.to_string())
    }
}

/// Newtype over a mission's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissionId(pub String);

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MissionId {
    fn from(value: String) -> Self {
        MissionId(value)
    }
}

/// Telemetry reading ingested from a drone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    pub drone_id: DroneId,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
    #[serde(default)]
    pub heading_deg: f64,
    #[serde(default)]
    pub speed_mps: f64,
    #[serde(default)]
    pub battery_pct: f64,
    pub timestamp: DateTime<Utc>,
}

/// Known lifecycle status of a registered drone, maintained by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroneStatus {
    #[default]
    Online,
    Degraded,
    Offline,
}

/// A drone's registry entry: identity, last known telemetry, and assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneRecord {
    pub drone_id: DroneId,
    pub status: DroneStatus,
    pub last_telemetry: Option<Telemetry>,
    pub last_seen: Option<DateTime<Utc>>,
    pub assigned_mission: Option<MissionId>,
}

impl DroneRecord {
    pub fn new(drone_id: DroneId) -> Self {
        Self {
            drone_id,
            status: DroneStatus::Offline,
            last_telemetry: None,
            last_seen: None,
            assigned_mission: None,
        }
    }
}

/// A search waypoint expressed in WGS84 + altitude AGL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

/// The search pattern a mission's SEARCH phase sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchArea {
    pub waypoints: Vec<Waypoint>,
}

/// Relative dispatch priority. Priority 3 is reserved for emergency commands
/// and must preempt any routine command already queued to the same drone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Routine = 1,
    Elevated = 2,
    Emergency = 3,
}

/// Commands dispatched to a drone through the `Transport` interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandType {
    Takeoff { target_altitude_m: f64 },
    GotoWaypoint { waypoint: Waypoint },
    Land,
    ReturnHome,
    Pause,
    Resume,
    EmergencyStop,
    EmergencyLand,
    EmergencyDisarm,
}

impl CommandType {
    /// Commands issued only by the emergency pipeline, always at priority 3.
    pub fn is_emergency(&self) -> bool {
        matches!(
            self,
            CommandType::EmergencyStop | CommandType::EmergencyLand | CommandType::EmergencyDisarm
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub command_id: String,
    pub drone_id: DroneId,
    pub kind: CommandType,
    pub priority: Priority,
    pub issued_at: DateTime<Utc>,
}

/// Cross-cutting mission phase. `Prepare` through `Land`/`Complete` is the
/// happy path; `Aborted`/`Failed`/`Paused` can interrupt it from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionPhase {
    Prepare,
    Takeoff,
    Transit,
    Search,
    Return,
    Land,
    Complete,
    Paused,
    Aborted,
    Failed,
}

/// Static description of a mission, submitted by an operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSpec {
    pub mission_id: MissionId,
    pub drone_ids: Vec<DroneId>,
    pub search_area: SearchArea,
    pub home: Waypoint,
    pub transit_altitude_m: f64,
    #[serde(default)]
    pub low_battery_pct: Option<f64>,
    #[serde(default)]
    pub critical_battery_pct: Option<f64>,
}

/// Live, mutable mission state, owned exclusively by the mission's driver task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionState {
    pub spec: MissionSpec,
    pub phase: MissionPhase,
    pub progress: f64,
    pub waypoints_done: usize,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub abort_reason: Option<String>,
}

impl MissionState {
    pub fn new(spec: MissionSpec, now: DateTime<Utc>) -> Self {
        Self {
            spec,
            phase: MissionPhase::Prepare,
            progress: 0.0,
            waypoints_done: 0,
            started_at: now,
            updated_at: now,
            abort_reason: None,
        }
    }
}

/// Kinds of emergency an operator, or the AI monitor, may raise.
///
/// `Rtl` commands a drone back to its mission's take-off point
/// (`CommandType::ReturnHome`); `Land` is reserved for an immediate
/// land-in-place intent (`CommandType::EmergencyLand`), distinct from RTL,
/// not yet exposed through any REST endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyKind {
    Stop,
    Rtl,
    Land,
    Disarm,
}

/// An operator- or AIMonitor-submitted emergency request, naming its targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyIntent {
    pub kind: EmergencyKind,
    pub targets: Vec<DroneId>,
    pub operator: String,
    pub reason: String,
    pub requested_at: DateTime<Utc>,
}

/// A decision emitted by the AI monitor onto the `ai_decisions` topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision_id: String,
    pub drone_id: Option<DroneId>,
    pub mission_id: Option<MissionId>,
    pub summary: String,
    pub recommended_action: Option<CommandType>,
    pub executed: bool,
    pub created_at: DateTime<Utc>,
}

/// Reserved real-time bus topics, plus an escape hatch for ad-hoc ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Telemetry,
    MissionUpdates,
    AiDecisions,
    Alerts,
    Detections,
    Other(String),
}

impl Topic {
    pub fn as_str(&self) -> &str {
        match self {
            Topic::Telemetry => "telemetry",
            Topic::MissionUpdates => "mission_updates",
            Topic::AiDecisions => "ai_decisions",
            Topic::Alerts => "alerts",
            Topic::Detections => "detections",
            Topic::Other(name) => name,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "telemetry" => Topic::Telemetry,
            "mission_updates" => Topic::MissionUpdates,
            "ai_decisions" => Topic::AiDecisions,
            "alerts" => Topic::Alerts,
            "detections" => Topic::Detections,
            other => Topic::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
