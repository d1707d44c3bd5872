//! SAR CLI - operator and demo tooling for the drone fleet coordinator.
//!
//! This crate provides the binaries:
//! - register_drone: register a simulated drone and stream synthetic telemetry
//! - run_demo_mission: submit a demo mission and drive it to completion
//! - trigger_emergency: fire a fleet-wide emergency intent

pub mod sim;
