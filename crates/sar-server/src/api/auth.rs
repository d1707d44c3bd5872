//! Authentication and rate-limit middleware for protected endpoints.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::app_state::AppState;

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (&left, &right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}

/// Middleware requiring `Authorization: Bearer <admin_token>` on mutation
/// and emergency routes. Mission/drone GETs and telemetry ingress bypass it.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match auth_header {
        Some(auth) if auth.starts_with("Bearer ") => {
            let token = auth.trim_start_matches("Bearer ");
            if constant_time_eq(token.as_bytes(), state.config.admin_token.as_bytes()) {
                next.run(request).await
            } else {
                (
                    StatusCode::FORBIDDEN,
                    Json(serde_json::json!({
                        "status": "error",
                        "reason": "invalid admin token",
                        "hint": "check SAR_ADMIN_TOKEN",
                    })),
                )
                    .into_response()
            }
        }
        Some(_) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "error",
                "reason": "invalid Authorization header format",
                "expected": "Bearer <token>",
            })),
        )
            .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "status": "error",
                "reason": "authorization required",
                "hint": "Add header: Authorization: Bearer <admin_token>",
            })),
        )
            .into_response(),
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    window_start_epoch_s: u64,
    window_count: u32,
    last_seen_epoch_s: u64,
}

/// Per-IP sliding-window rate limiter.
#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<DashMap<String, RateLimitEntry>>,
    last_cleanup_epoch_s: Arc<AtomicU64>,
    cleanup_interval: Duration,
    entry_ttl: Duration,
    max_tracked_ips: usize,
    max_rps: u32,
    enabled: bool,
    trust_proxy: bool,
}

impl RateLimiter {
    pub fn new(max_rps: u32, enabled: bool, trust_proxy: bool) -> Self {
        Self {
            requests: Arc::new(DashMap::new()),
            last_cleanup_epoch_s: Arc::new(AtomicU64::new(0)),
            cleanup_interval: Duration::from_secs(60),
            entry_ttl: Duration::from_secs(300),
            max_tracked_ips: 100_000,
            max_rps,
            enabled,
            trust_proxy,
        }
    }

    pub fn check(&self, ip: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let now_epoch_s = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.maybe_cleanup(now_epoch_s);

        if !self.ensure_capacity(ip, now_epoch_s) {
            return false;
        }

        let mut entry = self.requests.entry(ip.to_string()).or_insert(RateLimitEntry {
            window_start_epoch_s: now_epoch_s,
            window_count: 0,
            last_seen_epoch_s: now_epoch_s,
        });

        let state = entry.value_mut();
        if state.window_start_epoch_s != now_epoch_s {
            state.window_start_epoch_s = now_epoch_s;
            state.window_count = 0;
        }
        state.window_count = state.window_count.saturating_add(1);
        state.last_seen_epoch_s = now_epoch_s;

        state.window_count <= self.max_rps
    }

    fn maybe_cleanup(&self, now_epoch_s: u64) {
        if now_epoch_s == 0 {
            return;
        }
        let last_cleanup = self.last_cleanup_epoch_s.load(Ordering::Relaxed);
        if last_cleanup != 0 && now_epoch_s.saturating_sub(last_cleanup) < self.cleanup_interval.as_secs() {
            return;
        }
        if self
            .last_cleanup_epoch_s
            .compare_exchange(last_cleanup, now_epoch_s, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        self.purge_stale_entries(now_epoch_s);
    }

    fn ensure_capacity(&self, ip: &str, now_epoch_s: u64) -> bool {
        if self.requests.contains_key(ip) || self.requests.len() < self.max_tracked_ips {
            return true;
        }
        self.purge_stale_entries(now_epoch_s);
        self.requests.contains_key(ip) || self.requests.len() < self.max_tracked_ips
    }

    fn purge_stale_entries(&self, now_epoch_s: u64) {
        let ttl = self.entry_ttl.as_secs();
        if now_epoch_s == 0 || ttl == 0 {
            return;
        }
        let stale: Vec<String> = self
            .requests
            .iter()
            .filter(|entry| now_epoch_s.saturating_sub(entry.value().last_seen_epoch_s) >= ttl)
            .map(|entry| entry.key().clone())
            .collect();
        for key in stale {
            self.requests.remove(&key);
        }
    }
}

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let ip = if state.rate_limiter.trust_proxy {
        request
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(',').next().unwrap_or("unknown").trim().to_string())
    } else {
        None
    }
    .or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip().to_string())
    })
    .unwrap_or_else(|| "unknown".to_string());

    if state.rate_limiter.check(&ip) {
        next.run(request).await
    } else {
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "status": "error",
                "reason": "rate limit exceeded",
                "retry_after": "1 second",
            })),
        )
            .into_response()
    }
}
