//! Client-facing REST routes, the table in spec.md §6.1 under a `/v1` prefix.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sar_core::{EmergencyIntent, EmergencyKind, MissionId, MissionSpec, Telemetry};
use serde::Deserialize;

use crate::api::auth;
use crate::api::error::{ok_envelope, ApiError};
use crate::app_state::AppState;

pub fn create_router() -> Router<AppState> {
    let mutating = Router::new()
        .route("/v1/missions", post(submit_mission))
        .route("/v1/missions/:id/abort", post(abort_mission))
        .route("/v1/missions/:id/pause", post(pause_mission))
        .route("/v1/missions/:id/resume", post(resume_mission))
        .route("/v1/emergency/stop-all", post(emergency_stop_all))
        .route("/v1/emergency/rtl", post(emergency_rtl))
        .route("/v1/emergency/kill", post(emergency_kill))
        .route_layer(middleware::from_fn(auth::require_admin));

    let open = Router::new()
        .route("/v1/drones/register", post(register_drone))
        .route("/v1/telemetry", post(receive_telemetry))
        .route("/v1/drones", get(list_drones))
        .route("/v1/missions/:id", get(get_mission))
        .route("/v1/missions", get(list_missions))
        .route("/v1/emergency/status", get(emergency_status))
        .route("/v1/decisions", get(list_decisions));

    mutating.merge(open)
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    drone_id: String,
}

async fn register_drone(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> StatusCode {
    state.registry.register(req.drone_id.into());
    StatusCode::CREATED
}

async fn receive_telemetry(State(state): State<AppState>, Json(reading): Json<Telemetry>) -> StatusCode {
    state.registry.record_telemetry(&reading);
    if state.telemetry.ingest(reading) {
        StatusCode::ACCEPTED
    } else {
        StatusCode::CONFLICT
    }
}

async fn list_drones(State(state): State<AppState>) -> Json<Vec<sar_core::DroneRecord>> {
    Json(state.registry.snapshot())
}

async fn submit_mission(
    State(state): State<AppState>,
    Json(spec): Json<MissionSpec>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let mission_id = state.missions.submit(spec).map_err(ApiError::from_domain_string)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"status": "ok", "mission_id": mission_id.0})),
    ))
}

#[derive(Debug, Deserialize)]
struct AbortRequest {
    reason: String,
}

async fn abort_mission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AbortRequest>,
) -> Result<Json<crate::api::error::Envelope>, ApiError> {
    state
        .missions
        .abort(&MissionId(id), req.reason)
        .await
        .map_err(ApiError::from_domain_string)?;
    Ok(ok_envelope())
}

async fn pause_mission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<crate::api::error::Envelope>, ApiError> {
    state
        .missions
        .pause(&MissionId(id))
        .map_err(ApiError::from_domain_string)?;
    Ok(ok_envelope())
}

async fn resume_mission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<crate::api::error::Envelope>, ApiError> {
    state
        .missions
        .resume(&MissionId(id))
        .map_err(ApiError::from_domain_string)?;
    Ok(ok_envelope())
}

async fn get_mission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<sar_core::MissionState>, ApiError> {
    state
        .missions
        .snapshot(&MissionId(id.clone()))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("unknown mission {id}")))
}

async fn list_missions(State(state): State<AppState>) -> Json<Vec<sar_core::MissionState>> {
    Json(state.missions.snapshot_all().await)
}

#[derive(Debug, Deserialize)]
struct EmergencyRequest {
    reason: String,
    operator_id: String,
    #[serde(default)]
    confirm: bool,
}

async fn dispatch_emergency(
    state: &AppState,
    kind: EmergencyKind,
    req: EmergencyRequest,
) -> Result<Json<crate::emergency::EmergencyOutcome>, ApiError> {
    let targets = state.registry.snapshot().into_iter().map(|d| d.drone_id).collect();
    let intent = EmergencyIntent {
        kind,
        targets,
        operator: req.operator_id,
        reason: req.reason,
        requested_at: Utc::now(),
    };
    state
        .emergency
        .trigger(intent)
        .await
        .map(Json)
        .map_err(ApiError::conflict)
}

async fn emergency_stop_all(
    State(state): State<AppState>,
    Json(req): Json<EmergencyRequest>,
) -> Result<Json<crate::emergency::EmergencyOutcome>, ApiError> {
    dispatch_emergency(&state, EmergencyKind::Stop, req).await
}

async fn emergency_rtl(
    State(state): State<AppState>,
    Json(req): Json<EmergencyRequest>,
) -> Result<Json<crate::emergency::EmergencyOutcome>, ApiError> {
    dispatch_emergency(&state, EmergencyKind::Rtl, req).await
}

async fn emergency_kill(
    State(state): State<AppState>,
    Json(req): Json<EmergencyRequest>,
) -> Result<Json<crate::emergency::EmergencyOutcome>, ApiError> {
    if !req.confirm {
        return Err(ApiError::validation("disarm requires confirm: true"));
    }
    dispatch_emergency(&state, EmergencyKind::Disarm, req).await
}

async fn emergency_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let drones = state.registry.snapshot();
    let connected = drones
        .iter()
        .filter(|d| d.status == sar_core::DroneStatus::Online)
        .count();
    let active_missions = state.missions.snapshot_all().await.len();
    Json(serde_json::json!({
        "connected_drones": connected,
        "total_drones": drones.len(),
        "active_missions": active_missions,
    }))
}

#[derive(Debug, Deserialize)]
struct DecisionsQuery {
    #[serde(default = "default_decisions_limit")]
    limit: usize,
}

fn default_decisions_limit() -> usize {
    100
}

async fn list_decisions(
    State(state): State<AppState>,
    axum::extract::Query(query): axum::extract::Query<DecisionsQuery>,
) -> Result<Json<Vec<sar_core::DecisionRecord>>, ApiError> {
    state
        .persistence
        .load_recent_decisions(query.limit)
        .await
        .map(Json)
        .map_err(|err| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
}
