//! Error taxonomy shared by the mission engine, emergency pipeline and API layer.

use thiserror::Error;

/// The fleet coordinator's error taxonomy. Each variant has a defined
/// propagation/recovery policy: validation and conflict errors are rejected
/// to the caller, transport/timeout errors are retried or surfaced as
/// degraded state, lost-drone errors are internal-only, and internal errors
/// indicate a bug and are logged loudly.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflicting request: {0}")]
    Conflict(String),

    #[error("transport error dispatching to {drone_id}: {reason}")]
    Transport { drone_id: String, reason: String },

    #[error("timed out waiting on {0}")]
    Timeout(String),

    #[error("drone {0} is lost (no telemetry within the communication window)")]
    LostDrone(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
