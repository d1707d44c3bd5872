//! Mission execution engine: one driver task per running mission, advancing
//! drones through PREPARE -> TAKEOFF -> TRANSIT -> SEARCH -> RETURN -> LAND.

pub mod driver;

use chrono::Utc;
use dashmap::DashMap;
use futures::future::join_all;
use sar_core::{DroneId, MissionId, MissionPhase, MissionSpec, MissionState, MissionThresholds, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};

use crate::bus::FanOutBus;
use crate::persistence::Persistence;
use crate::state::drone_registry::DroneRegistry;
use crate::state::telemetry_cache::TelemetryCache;

/// Control signals a mission's own driver task observes every tick. Setting
/// any of these from outside the driver is the only way external callers
/// (the emergency pipeline, the pause/resume API) influence a running
/// mission; the driver still owns every other field of its `MissionState`.
pub struct MissionControl {
    pub paused: AtomicBool,
    pub abort_reason: RwLock<Option<String>>,
    notify: watch::Sender<()>,
}

impl MissionControl {
    fn new() -> (Arc<Self>, watch::Receiver<()>) {
        let (tx, rx) = watch::channel(());
        (
            Arc::new(Self {
                paused: AtomicBool::new(false),
                abort_reason: RwLock::new(None),
                notify: tx,
            }),
            rx,
        )
    }

    pub fn request_pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        let _ = self.notify.send(());
    }

    pub fn request_resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        let _ = self.notify.send(());
    }

    pub async fn request_abort(&self, reason: String) {
        *self.abort_reason.write().await = Some(reason);
        let _ = self.notify.send(());
    }
}

struct MissionHandle {
    control: Arc<MissionControl>,
    state: Arc<RwLock<MissionState>>,
    drones: Vec<DroneId>,
}

pub struct MissionEngine {
    missions: DashMap<MissionId, MissionHandle>,
    registry: Arc<DroneRegistry>,
    telemetry: Arc<TelemetryCache>,
    transport: Arc<dyn Transport>,
    bus: Arc<FanOutBus>,
    persistence: Arc<dyn Persistence>,
    thresholds: MissionThresholds,
}

impl MissionEngine {
    pub fn new(
        registry: Arc<DroneRegistry>,
        telemetry: Arc<TelemetryCache>,
        transport: Arc<dyn Transport>,
        bus: Arc<FanOutBus>,
        persistence: Arc<dyn Persistence>,
        thresholds: MissionThresholds,
    ) -> Self {
        Self {
            missions: DashMap::new(),
            registry,
            telemetry,
            transport,
            bus,
            persistence,
            thresholds,
        }
    }

    /// Submit a new mission. Fails if any target drone is already assigned
    /// to a different running mission.
    pub fn submit(self: &Arc<Self>, spec: MissionSpec) -> Result<MissionId, String> {
        let mission_id = spec.mission_id.clone();
        for drone_id in &spec.drone_ids {
            self.registry.set_assignment(drone_id, mission_id.clone())?;
        }

        let state = Arc::new(RwLock::new(MissionState::new(spec.clone(), Utc::now())));
        let (control, control_rx) = MissionControl::new();

        self.missions.insert(
            mission_id.clone(),
            MissionHandle {
                control: control.clone(),
                state: state.clone(),
                drones: spec.drone_ids.clone(),
            },
        );

        let ctx = driver::DriverContext {
            engine: self.clone(),
            state,
            control,
            control_rx,
        };
        tokio::spawn(driver::run(ctx));

        Ok(mission_id)
    }

    pub async fn snapshot(&self, mission_id: &MissionId) -> Option<MissionState> {
        let handle = self.missions.get(mission_id)?;
        Some(handle.state.read().await.clone())
    }

    pub async fn snapshot_all(&self) -> Vec<MissionState> {
        let mut out = Vec::with_capacity(self.missions.len());
        for entry in self.missions.iter() {
            out.push(entry.value().state.read().await.clone());
        }
        out
    }

    pub async fn abort(&self, mission_id: &MissionId, reason: String) -> Result<(), String> {
        let handle = self
            .missions
            .get(mission_id)
            .ok_or_else(|| format!("unknown mission {}", mission_id))?;
        handle.control.request_abort(reason).await;
        Ok(())
    }

    pub fn pause(&self, mission_id: &MissionId) -> Result<(), String> {
        let handle = self
            .missions
            .get(mission_id)
            .ok_or_else(|| format!("unknown mission {}", mission_id))?;
        handle.control.request_pause();
        Ok(())
    }

    pub fn resume(&self, mission_id: &MissionId) -> Result<(), String> {
        let handle = self
            .missions
            .get(mission_id)
            .ok_or_else(|| format!("unknown mission {}", mission_id))?;
        handle.control.request_resume();
        Ok(())
    }

    /// Called by the emergency pipeline: abort every mission the given
    /// drone participates in, and do not return until each affected
    /// mission's driver has actually driven its state to a terminal phase
    /// (or the emergency deadline elapses). The pipeline depends on this to
    /// guarantee affected missions are `aborted` before it dispatches the
    /// emergency command and reports an outcome.
    pub async fn mark_drone_aborting(&self, drone_id: &DroneId, reason: &str) {
        let affected: Vec<(Arc<MissionControl>, Arc<RwLock<MissionState>>)> = self
            .missions
            .iter()
            .filter(|entry| entry.value().drones.contains(drone_id))
            .map(|entry| (entry.value().control.clone(), entry.value().state.clone()))
            .collect();

        if affected.is_empty() {
            return;
        }

        join_all(
            affected
                .iter()
                .map(|(control, _)| control.request_abort(reason.to_string())),
        )
        .await;

        join_all(
            affected
                .iter()
                .map(|(_, state)| wait_for_terminal_phase(state, self.thresholds.emergency_deadline)),
        )
        .await;
    }

    fn remove(&self, mission_id: &MissionId) {
        if let Some((_, handle)) = self.missions.remove(mission_id) {
            for drone_id in &handle.drones {
                self.registry.clear_assignment(drone_id);
            }
        }
    }

    pub fn telemetry_snapshot(&self, drone_id: &DroneId) -> Option<sar_core::Telemetry> {
        self.telemetry.get(drone_id)
    }

    pub async fn transport_send(
        &self,
        drone_id: &DroneId,
        command: &sar_core::CommandType,
        priority: sar_core::Priority,
        deadline: std::time::Duration,
    ) -> Result<sar_core::TransportOutcome, sar_core::CoreError> {
        self.transport.send(drone_id, command, priority, deadline).await
    }

    pub async fn persist_mission(&self, mission: &MissionState) -> anyhow::Result<()> {
        self.persistence.save_mission(mission).await
    }

    pub fn publish_mission_update(&self, mission: &MissionState) {
        self.bus.publish(
            &sar_core::Topic::MissionUpdates,
            serde_json::to_value(mission).unwrap_or(serde_json::Value::Null),
        );
    }

    pub fn thresholds_prepare_timeout(&self) -> std::time::Duration {
        self.thresholds.prepare_timeout
    }

    pub fn thresholds_routine_deadline(&self) -> std::time::Duration {
        self.thresholds.routine_send_deadline
    }

    pub fn thresholds_critical(&self) -> f64 {
        self.thresholds.critical_battery_pct
    }

    pub fn alt_tolerance(&self) -> f64 {
        self.thresholds.alt_tolerance_m
    }

    pub fn pos_tolerance(&self) -> f64 {
        self.thresholds.pos_tolerance_m
    }

    pub fn ground_tolerance(&self) -> f64 {
        self.thresholds.ground_tolerance_m
    }
}

/// Poll a mission's state until its driver has moved it to a terminal
/// phase, bounded by `deadline` so a stuck driver can't hang the emergency
/// pipeline forever.
async fn wait_for_terminal_phase(state: &Arc<RwLock<MissionState>>, deadline: Duration) {
    let start = Instant::now();
    loop {
        if matches!(
            state.read().await.phase,
            MissionPhase::Aborted | MissionPhase::Failed | MissionPhase::Complete
        ) {
            return;
        }
        if start.elapsed() >= deadline {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
