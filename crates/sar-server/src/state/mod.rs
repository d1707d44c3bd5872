//! Shared, concurrently-accessed server state.

pub mod drone_registry;
pub mod telemetry_cache;

pub use drone_registry::DroneRegistry;
pub use telemetry_cache::TelemetryCache;
