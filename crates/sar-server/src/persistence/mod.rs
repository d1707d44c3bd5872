//! Persistence layer for the SAR drone fleet coordinator.
//!
//! Defines the `Persistence` interface the mission engine and AI monitor
//! depend on, plus a default SQLite-backed implementation. Calls are made
//! off the hot path and failures are logged, never propagated back into the
//! mission driver loop.

pub mod db;
pub mod decisions;
pub mod missions;

pub use db::{init_database, Database};

use anyhow::Result;
use async_trait::async_trait;
use sar_core::{DecisionRecord, MissionState};

/// The five operations the rest of the system needs from durable storage.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn save_mission(&self, mission: &MissionState) -> Result<()>;
    async fn load_active_missions(&self) -> Result<Vec<MissionState>>;
    async fn save_decision(&self, decision: &DecisionRecord) -> Result<()>;
    async fn load_recent_decisions(&self, limit: usize) -> Result<Vec<DecisionRecord>>;
    async fn clear_all(&self) -> Result<()>;
}

#[async_trait]
impl Persistence for Database {
    async fn save_mission(&self, mission: &MissionState) -> Result<()> {
        missions::upsert_mission(self.pool(), mission).await
    }

    async fn load_active_missions(&self) -> Result<Vec<MissionState>> {
        missions::load_active_missions(self.pool()).await
    }

    async fn save_decision(&self, decision: &DecisionRecord) -> Result<()> {
        decisions::insert_decision(self.pool(), decision).await
    }

    async fn load_recent_decisions(&self, limit: usize) -> Result<Vec<DecisionRecord>> {
        decisions::load_recent_decisions(self.pool(), limit as i64).await
    }

    async fn clear_all(&self) -> Result<()> {
        db::clear_all(self.pool()).await
    }
}
