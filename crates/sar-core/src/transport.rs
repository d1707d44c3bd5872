//! The drone transport interface. The wire protocol spoken to real drones
//! is out of scope here; this crate only defines the contract the mission
//! engine and emergency pipeline dispatch through.

use crate::models::{CommandType, DroneId, Priority};
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of a single dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOutcome {
    Sent,
    Rejected,
    Timeout,
    Unreachable,
}

pub type TransportResult = Result<TransportOutcome, crate::error::CoreError>;

/// Collaborator responsible for actually delivering a command to a drone.
/// Priority 3 (emergency) sends must preempt any routine command already
/// in flight to the same drone.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        drone_id: &DroneId,
        command: &CommandType,
        priority: Priority,
        deadline: Duration,
    ) -> TransportResult;
}
