//! Decision record persistence operations.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sar_core::{CommandType, DecisionRecord, DroneId, MissionId};
use sqlx::SqlitePool;

/// Insert a decision record.
pub async fn insert_decision(pool: &SqlitePool, decision: &DecisionRecord) -> Result<()> {
    let recommended_action_json = decision
        .recommended_action
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO decisions (decision_id, drone_id, mission_id, summary, recommended_action_json, executed, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(decision_id) DO NOTHING
        "#,
    )
    .bind(&decision.decision_id)
    .bind(decision.drone_id.as_ref().map(|d| d.0.as_str()))
    .bind(decision.mission_id.as_ref().map(|m| m.0.as_str()))
    .bind(&decision.summary)
    .bind(recommended_action_json)
    .bind(decision.executed)
    .bind(decision.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the most recent decisions, newest first.
pub async fn load_recent_decisions(pool: &SqlitePool, limit: i64) -> Result<Vec<DecisionRecord>> {
    let rows = sqlx::query_as::<_, DecisionRow>(
        r#"
        SELECT decision_id, drone_id, mission_id, summary, recommended_action_json, executed, created_at
        FROM decisions
        ORDER BY created_at DESC
        LIMIT ?1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

#[derive(sqlx::FromRow)]
struct DecisionRow {
    decision_id: String,
    drone_id: Option<String>,
    mission_id: Option<String>,
    summary: String,
    recommended_action_json: Option<String>,
    executed: bool,
    created_at: String,
}

impl TryFrom<DecisionRow> for DecisionRecord {
    type Error = anyhow::Error;

    fn try_from(row: DecisionRow) -> Result<Self> {
        let recommended_action: Option<CommandType> = row
            .recommended_action_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(DecisionRecord {
            decision_id: row.decision_id,
            drone_id: row.drone_id.map(DroneId),
            mission_id: row.mission_id.map(MissionId),
            summary: row.summary,
            recommended_action,
            executed: row.executed,
            created_at,
        })
    }
}
