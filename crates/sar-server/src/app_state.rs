//! The aggregate of shared services the API layer needs, handed to axum as
//! router state.

use std::sync::Arc;

use crate::ai_monitor::AiMonitor;
use crate::api::auth::RateLimiter;
use crate::bus::FanOutBus;
use crate::config::Config;
use crate::emergency::EmergencyPipeline;
use crate::mission::MissionEngine;
use crate::persistence::Persistence;
use crate::state::{DroneRegistry, TelemetryCache};

#[derive(Clone)]
pub struct AppState {
    pub telemetry: Arc<TelemetryCache>,
    pub registry: Arc<DroneRegistry>,
    pub bus: Arc<FanOutBus>,
    pub missions: Arc<MissionEngine>,
    pub emergency: Arc<EmergencyPipeline>,
    pub ai_monitor: Arc<AiMonitor>,
    pub persistence: Arc<dyn Persistence>,
    pub config: Config,
    pub rate_limiter: RateLimiter,
}
