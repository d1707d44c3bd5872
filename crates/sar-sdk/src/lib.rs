//! SAR fleet coordinator SDK - drone integration library.
//!
//! Provides a simple API for drones (and other integrators) to register,
//! push telemetry, and subscribe to the fleet coordinator's real-time
//! stream.

pub mod client;
pub mod stream;
pub mod telemetry;

pub use client::DroneClient;
pub use sar_core::Telemetry;
pub use stream::{FleetStream, ServerEvent};
