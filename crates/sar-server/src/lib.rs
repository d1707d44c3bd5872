//! Shared library surface for the SAR fleet coordinator server and its tests.

pub mod ai_monitor;
pub mod api;
pub mod app_state;
pub mod backoff;
pub mod bus;
pub mod config;
pub mod emergency;
pub mod mission;
pub mod persistence;
pub mod spatial_checks;
pub mod state;
pub mod supervisor;
pub mod transport_sim;
