//! sar-core - Pure domain logic for the SAR drone fleet coordinator.
//!
//! This crate contains the domain models, thresholds, error taxonomy and
//! transport interface with NO networking or persistence dependencies.

pub mod error;
pub mod models;
pub mod spatial;
pub mod thresholds;
pub mod transport;

pub use error::CoreError;
pub use models::{
    Command, CommandType, DecisionRecord, DroneId, DroneRecord, DroneStatus, EmergencyIntent,
    EmergencyKind, MissionId, MissionPhase, MissionSpec, MissionState, Priority, SearchArea,
    Telemetry, Topic, Waypoint,
};
pub use thresholds::MissionThresholds;
pub use transport::{Transport, TransportOutcome, TransportResult};
