//! Mission persistence operations.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sar_core::{MissionPhase, MissionSpec, MissionState};
use sqlx::SqlitePool;

/// Upsert a mission's current state into the database.
pub async fn upsert_mission(pool: &SqlitePool, mission: &MissionState) -> Result<()> {
    let spec_json = serde_json::to_string(&mission.spec)?;
    let phase = phase_to_str(mission.phase);

    sqlx::query(
        r#"
        INSERT INTO missions (mission_id, phase, progress, spec_json, abort_reason, started_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(mission_id) DO UPDATE SET
            phase = ?2, progress = ?3, spec_json = ?4, abort_reason = ?5, updated_at = ?7
        "#,
    )
    .bind(mission.spec.mission_id.0.as_str())
    .bind(phase)
    .bind(mission.progress)
    .bind(spec_json)
    .bind(&mission.abort_reason)
    .bind(mission.started_at.to_rfc3339())
    .bind(mission.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every mission that has not reached a terminal phase.
pub async fn load_active_missions(pool: &SqlitePool) -> Result<Vec<MissionState>> {
    let rows = sqlx::query_as::<_, MissionRow>(
        r#"
        SELECT mission_id, phase, progress, spec_json, abort_reason, started_at, updated_at
        FROM missions
        WHERE phase NOT IN ('complete', 'aborted', 'failed')
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

fn phase_to_str(phase: MissionPhase) -> &'static str {
    match phase {
        MissionPhase::Prepare => "prepare",
        MissionPhase::Takeoff => "takeoff",
        MissionPhase::Transit => "transit",
        MissionPhase::Search => "search",
        MissionPhase::Return => "return",
        MissionPhase::Land => "land",
        MissionPhase::Complete => "complete",
        MissionPhase::Paused => "paused",
        MissionPhase::Aborted => "aborted",
        MissionPhase::Failed => "failed",
    }
}

fn phase_from_str(value: &str) -> MissionPhase {
    match value {
        "prepare" => MissionPhase::Prepare,
        "takeoff" => MissionPhase::Takeoff,
        "transit" => MissionPhase::Transit,
        "search" => MissionPhase::Search,
        "return" => MissionPhase::Return,
        "land" => MissionPhase::Land,
        "complete" => MissionPhase::Complete,
        "paused" => MissionPhase::Paused,
        "aborted" => MissionPhase::Aborted,
        _ => MissionPhase::Failed,
    }
}

#[derive(sqlx::FromRow)]
struct MissionRow {
    mission_id: String,
    phase: String,
    progress: f64,
    spec_json: String,
    abort_reason: Option<String>,
    started_at: String,
    updated_at: String,
}

impl TryFrom<MissionRow> for MissionState {
    type Error = anyhow::Error;

    fn try_from(row: MissionRow) -> Result<Self> {
        let spec: MissionSpec = serde_json::from_str(&row.spec_json)?;
        let started_at = DateTime::parse_from_rfc3339(&row.started_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        let updated_at = DateTime::parse_from_rfc3339(&row.updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(MissionState {
            spec,
            phase: phase_from_str(&row.phase),
            progress: row.progress,
            waypoints_done: 0,
            started_at,
            updated_at,
            abort_reason: row.abort_reason,
        })
    }
}
