//! Periodic, deterministic monitor that watches fleet telemetry and mission
//! state and raises decisions on the `ai_decisions` topic. This is threshold
//! evaluation, not a model call: every recommendation here is traceable to a
//! concrete numeric check.

use chrono::Utc;
use sar_core::{CommandType, DecisionRecord, EmergencyIntent, EmergencyKind, MissionId, MissionPhase, MissionThresholds};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::interval;
use uuid::Uuid;

use crate::bus::FanOutBus;
use crate::emergency::EmergencyPipeline;
use crate::mission::MissionEngine;
use crate::persistence::Persistence;
use crate::state::DroneRegistry;

const TICK_INTERVAL: Duration = Duration::from_secs(2);

pub struct AiMonitor {
    registry: Arc<DroneRegistry>,
    missions: Arc<MissionEngine>,
    emergency: Arc<EmergencyPipeline>,
    bus: Arc<FanOutBus>,
    persistence: Arc<dyn Persistence>,
    thresholds: MissionThresholds,
    autonomous_execute: bool,
}

impl AiMonitor {
    pub fn new(
        registry: Arc<DroneRegistry>,
        missions: Arc<MissionEngine>,
        emergency: Arc<EmergencyPipeline>,
        bus: Arc<FanOutBus>,
        persistence: Arc<dyn Persistence>,
        thresholds: MissionThresholds,
        autonomous_execute: bool,
    ) -> Self {
        Self {
            registry,
            missions,
            emergency,
            bus,
            persistence,
            thresholds,
            autonomous_execute,
        }
    }

    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = interval(TICK_INTERVAL);
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("ai monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.evaluate().await;
                }
            }
        }
    }

    async fn evaluate(&self) {
        for drone in self.registry.snapshot() {
            let Some(telemetry) = &drone.last_telemetry else {
                continue;
            };

            if telemetry.battery_pct <= self.thresholds.critical_battery_pct {
                let already_returning = self.mission_already_returning(drone.assigned_mission.as_ref()).await;
                let will_execute = self.autonomous_execute && !already_returning;

                let decision = DecisionRecord {
                    decision_id: Uuid::new_v4().to_string(),
                    drone_id: Some(drone.drone_id.clone()),
                    mission_id: drone.assigned_mission.clone(),
                    summary: format!(
                        "drone {} battery at {:.1}% (critical threshold {:.1}%)",
                        drone.drone_id, telemetry.battery_pct, self.thresholds.critical_battery_pct
                    ),
                    recommended_action: Some(CommandType::ReturnHome),
                    executed: will_execute,
                    created_at: Utc::now(),
                };
                self.emit(decision).await;

                if will_execute {
                    let intent = EmergencyIntent {
                        kind: EmergencyKind::Rtl,
                        targets: vec![drone.drone_id.clone()],
                        operator: "ai_monitor".to_string(),
                        reason: "autonomous critical battery response".to_string(),
                        requested_at: Utc::now(),
                    };
                    if let Err(err) = self.emergency.trigger(intent).await {
                        tracing::warn!(error = %err, "ai monitor autonomous emergency trigger failed");
                    }
                }
            } else if telemetry.battery_pct <= self.thresholds.low_battery_pct {
                let decision = DecisionRecord {
                    decision_id: Uuid::new_v4().to_string(),
                    drone_id: Some(drone.drone_id.clone()),
                    mission_id: drone.assigned_mission.clone(),
                    summary: format!(
                        "drone {} battery at {:.1}% (low threshold {:.1}%)",
                        drone.drone_id, telemetry.battery_pct, self.thresholds.low_battery_pct
                    ),
                    recommended_action: Some(CommandType::ReturnHome),
                    executed: false,
                    created_at: Utc::now(),
                };
                self.emit(decision).await;
            }
        }
    }

    /// Whether the drone's mission, if any, has already entered a phase that
    /// implies it is heading home or is done - in which case a fresh
    /// autonomous RTL trigger would be redundant.
    async fn mission_already_returning(&self, mission_id: Option<&MissionId>) -> bool {
        let Some(mission_id) = mission_id else { return false };
        let Some(state) = self.missions.snapshot(mission_id).await else { return false };
        matches!(
            state.phase,
            MissionPhase::Return | MissionPhase::Land | MissionPhase::Complete | MissionPhase::Aborted | MissionPhase::Failed
        )
    }

    async fn emit(&self, decision: DecisionRecord) {
        self.bus.publish(
            &sar_core::Topic::AiDecisions,
            serde_json::to_value(&decision).unwrap_or(serde_json::Value::Null),
        );
        if let Err(err) = self.persistence.save_decision(&decision).await {
            tracing::warn!(error = %err, "failed to persist decision record");
        }
    }
}
