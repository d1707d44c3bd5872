//! Transport implementations. The real drone-side wire protocol is out of
//! scope; these two implementations exist to make the rest of the system
//! runnable and testable.

use async_trait::async_trait;
use dashmap::DashMap;
use sar_core::{CommandType, DroneId, Priority, Transport, TransportOutcome, TransportResult};
use std::time::Duration;

/// Logs every dispatch and always reports success. Useful for demos where
/// no simulated drone consumes the command.
pub struct NullTransport;

#[async_trait]
impl Transport for NullTransport {
    async fn send(
        &self,
        drone_id: &DroneId,
        command: &CommandType,
        priority: Priority,
        _deadline: Duration,
    ) -> TransportResult {
        tracing::info!(%drone_id, ?command, ?priority, "null transport dispatch");
        Ok(TransportOutcome::Sent)
    }
}

/// In-memory simulator: records the most recent command per drone so test
/// scenarios and CLI demos can assert on what was dispatched without a real
/// wire protocol.
pub struct SimTransport {
    unreachable: DashMap<DroneId, ()>,
    last_command: DashMap<DroneId, CommandType>,
}

impl Default for SimTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SimTransport {
    pub fn new() -> Self {
        Self {
            unreachable: DashMap::new(),
            last_command: DashMap::new(),
        }
    }

    /// Mark a drone as unreachable so future sends to it report `Unreachable`.
    pub fn mark_unreachable(&self, drone_id: DroneId) {
        self.unreachable.insert(drone_id, ());
    }

    pub fn last_command(&self, drone_id: &DroneId) -> Option<CommandType> {
        self.last_command.get(drone_id).map(|e| e.value().clone())
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn send(
        &self,
        drone_id: &DroneId,
        command: &CommandType,
        priority: Priority,
        _deadline: Duration,
    ) -> TransportResult {
        if self.unreachable.contains_key(drone_id) {
            return Ok(TransportOutcome::Unreachable);
        }
        tracing::debug!(%drone_id, ?command, ?priority, "sim transport dispatch");
        self.last_command.insert(drone_id.clone(), command.clone());
        Ok(TransportOutcome::Sent)
    }
}
