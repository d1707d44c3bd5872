//! Per-mission driver task: one `tokio::spawn`ed loop per running mission,
//! advancing its phase on a fixed tick and dispatching commands through the
//! transport interface. Priority of concerns, highest first: an abort
//! request, a low/critical battery safety check, a pause request, then the
//! phase's own entry/progress/completion logic.

use chrono::Utc;
use sar_core::{CommandType, DroneId, MissionPhase, MissionState, Priority};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::interval;

use super::{MissionControl, MissionEngine};
use crate::spatial_checks::{at_altitude, at_ground, at_waypoint};

const TICK_INTERVAL: Duration = Duration::from_millis(500);

pub struct DriverContext {
    pub engine: Arc<MissionEngine>,
    pub state: Arc<RwLock<MissionState>>,
    pub control: Arc<MissionControl>,
    pub control_rx: watch::Receiver<()>,
}

pub async fn run(ctx: DriverContext) {
    let DriverContext {
        engine,
        state,
        control,
        mut control_rx,
    } = ctx;

    let mut ticker = interval(TICK_INTERVAL);
    let prepare_deadline = Utc::now() + engine_prepare_timeout(&engine);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = control_rx.changed() => {}
        }

        let mut guard = state.write().await;
        let mission_id = guard.spec.mission_id.clone();

        if let Some(reason) = control.abort_reason.read().await.clone() {
            if !matches!(guard.phase, MissionPhase::Aborted | MissionPhase::Failed | MissionPhase::Complete) {
                guard.phase = MissionPhase::Aborted;
                guard.abort_reason = Some(reason);
                guard.updated_at = Utc::now();
                dispatch_abort_commands(&engine, &guard).await;
            }
        }

        if matches!(guard.phase, MissionPhase::Aborted | MissionPhase::Failed | MissionPhase::Complete) {
            let terminal = guard.clone();
            drop(guard);
            persist(&engine, &terminal).await;
            publish_update(&engine, &terminal);
            engine.remove(&mission_id);
            break;
        }

        if control.paused.load(Ordering::SeqCst) {
            if guard.phase != MissionPhase::Paused {
                guard.phase = MissionPhase::Paused;
                guard.updated_at = Utc::now();
                dispatch_pause_commands(&engine, &guard).await;
            }
            let snapshot = guard.clone();
            drop(guard);
            persist(&engine, &snapshot).await;
            publish_update(&engine, &snapshot);
            continue;
        }

        if guard.phase == MissionPhase::Paused {
            guard.phase = MissionPhase::Prepare;
        }

        if guard.phase == MissionPhase::Prepare && Utc::now() > prepare_deadline {
            guard.phase = MissionPhase::Failed;
            guard.abort_reason = Some("prepare phase timed out".to_string());
            guard.updated_at = Utc::now();
            let snapshot = guard.clone();
            drop(guard);
            persist(&engine, &snapshot).await;
            publish_update(&engine, &snapshot);
            engine.remove(&mission_id);
            break;
        }

        if let Some(critical) = lowest_battery_below(&engine, &guard, engine.thresholds_critical()).await {
            guard.phase = MissionPhase::Aborted;
            guard.abort_reason = Some(format!("critical battery on {}", critical));
            guard.updated_at = Utc::now();
            dispatch_abort_commands(&engine, &guard).await;
            let snapshot = guard.clone();
            drop(guard);
            persist(&engine, &snapshot).await;
            publish_update(&engine, &snapshot);
            engine.remove(&mission_id);
            break;
        }

        advance_phase(&engine, &mut guard).await;
        let snapshot = guard.clone();
        drop(guard);
        persist(&engine, &snapshot).await;
        publish_update(&engine, &snapshot);
    }
}

fn engine_prepare_timeout(engine: &Arc<MissionEngine>) -> chrono::Duration {
    chrono::Duration::from_std(engine.thresholds_prepare_timeout()).unwrap_or(chrono::Duration::seconds(30))
}

async fn advance_phase(engine: &Arc<MissionEngine>, mission: &mut MissionState) {
    let home = mission.spec.home;
    let transit_altitude = mission.spec.transit_altitude_m;
    let drones = mission.spec.drone_ids.clone();

    match mission.phase {
        MissionPhase::Prepare => {
            for drone_id in &drones {
                dispatch(engine, drone_id, CommandType::Takeoff { target_altitude_m: transit_altitude }, Priority::Routine).await;
            }
            mission.phase = MissionPhase::Takeoff;
            mission.progress = 0.05;
        }
        MissionPhase::Takeoff => {
            if all_drones(engine, &drones, |t| at_altitude(t, transit_altitude, engine.alt_tolerance())) {
                let first_waypoint = mission.spec.search_area.waypoints.first().copied();
                if let Some(wp) = first_waypoint {
                    for drone_id in &drones {
                        dispatch(engine, drone_id, CommandType::GotoWaypoint { waypoint: wp }, Priority::Routine).await;
                    }
                }
                mission.phase = MissionPhase::Transit;
                mission.progress = 0.15;
            }
        }
        MissionPhase::Transit => {
            let first_waypoint = mission.spec.search_area.waypoints.first().copied();
            if let Some(wp) = first_waypoint {
                if all_drones(engine, &drones, |t| at_waypoint(t, wp, engine.pos_tolerance())) {
                    mission.phase = MissionPhase::Search;
                    mission.waypoints_done = 1;
                    mission.progress = search_progress(mission);
                }
            }
        }
        MissionPhase::Search => {
            let total = mission.spec.search_area.waypoints.len().max(1);
            if let Some(next) = mission.spec.search_area.waypoints.get(mission.waypoints_done).copied() {
                for drone_id in &drones {
                    dispatch(engine, drone_id, CommandType::GotoWaypoint { waypoint: next }, Priority::Routine).await;
                }
                if all_drones(engine, &drones, |t| at_waypoint(t, next, engine.pos_tolerance())) {
                    mission.waypoints_done += 1;
                    mission.progress = search_progress(mission);
                }
            } else {
                let _ = total;
                for drone_id in &drones {
                    dispatch(engine, drone_id, CommandType::ReturnHome, Priority::Routine).await;
                }
                mission.phase = MissionPhase::Return;
                mission.progress = 0.9;
            }
        }
        MissionPhase::Return => {
            if all_drones(engine, &drones, |t| at_waypoint(t, home, engine.pos_tolerance())) {
                for drone_id in &drones {
                    dispatch(engine, drone_id, CommandType::Land, Priority::Routine).await;
                }
                mission.phase = MissionPhase::Land;
                mission.progress = 0.95;
            }
        }
        MissionPhase::Land => {
            if all_drones(engine, &drones, |t| at_ground(t, engine.ground_tolerance())) {
                mission.phase = MissionPhase::Complete;
                mission.progress = 1.0;
            }
        }
        MissionPhase::Complete
        | MissionPhase::Paused
        | MissionPhase::Aborted
        | MissionPhase::Failed => {}
    }
    mission.updated_at = Utc::now();
}

fn search_progress(mission: &MissionState) -> f64 {
    let total = mission.spec.search_area.waypoints.len().max(1) as f64;
    0.15 + 0.75 * (mission.waypoints_done as f64 / total)
}

fn all_drones(
    engine: &Arc<MissionEngine>,
    drones: &[DroneId],
    predicate: impl Fn(&sar_core::Telemetry) -> bool,
) -> bool {
    drones.iter().all(|drone_id| {
        engine
            .telemetry_snapshot(drone_id)
            .map(|t| predicate(&t))
            .unwrap_or(false)
    })
}

async fn lowest_battery_below(
    engine: &Arc<MissionEngine>,
    mission: &MissionState,
    critical_pct: f64,
) -> Option<DroneId> {
    let critical = mission.spec.critical_battery_pct.unwrap_or(critical_pct);
    for drone_id in &mission.spec.drone_ids {
        if let Some(reading) = engine.telemetry_snapshot(drone_id) {
            if reading.battery_pct <= critical {
                return Some(drone_id.clone());
            }
        }
    }
    None
}

async fn dispatch(engine: &Arc<MissionEngine>, drone_id: &DroneId, command: CommandType, priority: Priority) {
    let deadline = engine.thresholds_routine_deadline();
    if let Err(err) = engine.transport_send(drone_id, &command, priority, deadline).await {
        tracing::warn!(%drone_id, ?command, error = %err, "mission command dispatch failed");
    }
}

/// Abort's `return_home` preempts any routine phase command already queued
/// to the same drone, per the mission-abort deadline.
async fn dispatch_abort_commands(engine: &Arc<MissionEngine>, mission: &MissionState) {
    for drone_id in &mission.spec.drone_ids {
        dispatch(engine, drone_id, CommandType::ReturnHome, Priority::Elevated).await;
    }
}

async fn dispatch_pause_commands(engine: &Arc<MissionEngine>, mission: &MissionState) {
    for drone_id in &mission.spec.drone_ids {
        dispatch(engine, drone_id, CommandType::Pause, Priority::Routine).await;
    }
}

async fn persist(engine: &Arc<MissionEngine>, mission: &MissionState) {
    if let Err(err) = engine.persist_mission(mission).await {
        tracing::warn!(error = %err, "failed to persist mission state");
    }
}

fn publish_update(engine: &Arc<MissionEngine>, mission: &MissionState) {
    engine.publish_mission_update(mission);
}
