//! Emergency command pipeline: the high-priority stop/RTL/disarm path with a
//! bounded end-to-end deadline.

use chrono::Utc;
use dashmap::DashMap;
use futures::future::join_all;
use sar_core::{CommandType, EmergencyIntent, EmergencyKind, MissionThresholds, Priority, Transport};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::bus::FanOutBus;
use crate::mission::MissionEngine;

#[derive(Debug, Clone, Serialize)]
pub struct EmergencyOutcome {
    pub emergency_id: String,
    pub kind: EmergencyKind,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    pub unreachable: Vec<String>,
    pub elapsed_ms: u128,
}

pub struct EmergencyPipeline {
    transport: Arc<dyn Transport>,
    bus: Arc<FanOutBus>,
    missions: Arc<MissionEngine>,
    thresholds: MissionThresholds,
    recent: DashMap<String, Instant>,
}

impl EmergencyPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        bus: Arc<FanOutBus>,
        missions: Arc<MissionEngine>,
        thresholds: MissionThresholds,
    ) -> Self {
        Self {
            transport,
            bus,
            missions,
            thresholds,
            recent: DashMap::new(),
        }
    }

    /// Execute an emergency intent. `disarm_all` (an empty-targets Disarm
    /// intent) requires the caller to have already confirmed; this function
    /// does not re-prompt.
    pub async fn trigger(&self, intent: EmergencyIntent) -> Result<EmergencyOutcome, String> {
        let dedupe_key = format!(
            "{:?}:{}:{}",
            intent.kind,
            intent.operator,
            intent
                .targets
                .iter()
                .map(|t| t.0.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );
        if let Some(seen_at) = self.recent.get(&dedupe_key) {
            if seen_at.elapsed().as_secs_f64() < 1.0 {
                return Err("duplicate emergency request within idempotence window".to_string());
            }
        }
        self.recent.insert(dedupe_key, Instant::now());

        let emergency_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        for target in &intent.targets {
            self.missions.mark_drone_aborting(target, &intent.reason).await;
        }

        let command = match intent.kind {
            EmergencyKind::Stop => CommandType::EmergencyStop,
            EmergencyKind::Rtl => CommandType::ReturnHome,
            EmergencyKind::Land => CommandType::EmergencyLand,
            EmergencyKind::Disarm => CommandType::EmergencyDisarm,
        };

        let deadline = self.thresholds.emergency_deadline;
        let dispatch = join_all(intent.targets.iter().map(|drone_id| {
            let transport = self.transport.clone();
            let command = command.clone();
            let drone_id = drone_id.clone();
            async move {
                let result = transport.send(&drone_id, &command, Priority::Emergency, deadline).await;
                (drone_id, result)
            }
        }));

        let results = match tokio::time::timeout(deadline, dispatch).await {
            Ok(results) => results,
            Err(_) => {
                tracing::error!(emergency_id = %emergency_id, "emergency dispatch exceeded deadline");
                intent
                    .targets
                    .iter()
                    .map(|d| (d.clone(), Ok(sar_core::TransportOutcome::Timeout)))
                    .collect()
            }
        };

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut unreachable = Vec::new();
        for (drone_id, result) in results {
            match result {
                Ok(sar_core::TransportOutcome::Sent) => succeeded.push(drone_id.0),
                Ok(sar_core::TransportOutcome::Unreachable) => unreachable.push(drone_id.0),
                Ok(sar_core::TransportOutcome::Rejected)
                | Ok(sar_core::TransportOutcome::Timeout)
                | Err(_) => failed.push(drone_id.0),
            }
        }

        let outcome = EmergencyOutcome {
            emergency_id,
            kind: intent.kind,
            succeeded,
            failed,
            unreachable,
            elapsed_ms: started.elapsed().as_millis(),
        };

        self.bus.publish(
            &sar_core::Topic::Alerts,
            serde_json::json!({
                "event": "emergency_outcome",
                "outcome": outcome,
                "timestamp": Utc::now(),
            }),
        );

        Ok(outcome)
    }
}
