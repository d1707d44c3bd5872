//! Server configuration from environment.

use sar_core::MissionThresholds;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub database_max_connections: u32,
    pub admin_token: String,
    pub allowed_origins: Vec<String>,
    pub rate_limit_enabled: bool,
    pub rate_limit_rps: u32,
    pub rate_limit_trust_proxy: bool,
    pub ai_autonomous_execute: bool,
    pub thresholds: MissionThresholds,
}

impl Config {
    pub fn from_env() -> Self {
        let mut thresholds = MissionThresholds::default();
        if let Some(v) = env_f64("SAR_LOW_BATTERY_PCT") {
            thresholds.low_battery_pct = v;
        }
        if let Some(v) = env_f64("SAR_CRITICAL_BATTERY_PCT") {
            thresholds.critical_battery_pct = v;
        }
        if let Some(secs) = env_u64("SAR_COMMUNICATION_TIMEOUT_SECS") {
            thresholds.communication_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("SAR_EMERGENCY_DEADLINE_SECS") {
            thresholds.emergency_deadline = Duration::from_secs(secs);
        }

        Self {
            server_port: env::var("SAR_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            database_path: env::var("SAR_DATABASE_PATH")
                .unwrap_or_else(|_| "data/sar.db".to_string()),
            database_max_connections: env::var("SAR_DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            admin_token: env::var("SAR_ADMIN_TOKEN").unwrap_or_else(|_| "change-me-admin".to_string()),
            allowed_origins: env::var("SAR_ALLOWED_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).filter(|o| !o.is_empty()).collect())
                .unwrap_or_default(),
            rate_limit_enabled: env::var("SAR_RATE_LIMIT_ENABLED")
                .map(|s| s != "0" && !s.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            rate_limit_rps: env::var("SAR_RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50),
            rate_limit_trust_proxy: env::var("SAR_TRUST_PROXY")
                .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            ai_autonomous_execute: env::var("SAR_AI_AUTONOMOUS_EXECUTE")
                .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            thresholds,
        }
    }
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
