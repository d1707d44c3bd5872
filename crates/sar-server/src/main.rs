//! SAR fleet coordinator server - always-on backend for search-and-rescue
//! drone mission coordination.

mod ai_monitor;
mod api;
mod app_state;
mod backoff;
mod bus;
mod config;
mod emergency;
mod mission;
mod persistence;
mod spatial_checks;
mod state;
mod supervisor;
mod transport_sim;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::ai_monitor::AiMonitor;
use crate::api::auth::RateLimiter;
use crate::app_state::AppState;
use crate::bus::{BusConfig, FanOutBus};
use crate::config::Config;
use crate::emergency::EmergencyPipeline;
use crate::mission::MissionEngine;
use crate::state::{DroneRegistry, TelemetryCache};
use crate::transport_sim::{NullTransport, SimTransport};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("sar_server=debug".parse()?);
    let log_format = std::env::var("SAR_LOG_FORMAT").unwrap_or_default();
    if log_format.trim().eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Starting SAR fleet coordinator server...");

    let config = Config::from_env();
    let port = config.server_port;

    tracing::info!("Initializing database: {}", config.database_path);
    let db = persistence::init_database(&config.database_path, config.database_max_connections).await?;
    let persistence: Arc<dyn persistence::Persistence> = Arc::new(db);
    tracing::info!("Database initialized");

    let thresholds = config.thresholds.clone();
    let bus = Arc::new(FanOutBus::new(BusConfig::from(&thresholds)));
    let telemetry = Arc::new(TelemetryCache::new(bus.clone()));
    let registry = Arc::new(DroneRegistry::new(thresholds.clone()));

    let use_sim = std::env::var("SAR_SIM_TRANSPORT").map(|v| v == "1").unwrap_or(true);
    let transport: Arc<dyn sar_core::Transport> = if use_sim {
        Arc::new(SimTransport::new())
    } else {
        Arc::new(NullTransport)
    };

    let missions = Arc::new(MissionEngine::new(
        registry.clone(),
        telemetry.clone(),
        transport.clone(),
        bus.clone(),
        persistence.clone(),
        thresholds.clone(),
    ));

    for mission in persistence.load_active_missions().await.unwrap_or_default() {
        tracing::warn!(
            mission_id = %mission.spec.mission_id,
            "found active mission at startup; resubmitting is not automatic, see DESIGN.md"
        );
    }

    let emergency = Arc::new(EmergencyPipeline::new(
        transport.clone(),
        bus.clone(),
        missions.clone(),
        thresholds.clone(),
    ));

    let ai_monitor = Arc::new(AiMonitor::new(
        registry.clone(),
        missions.clone(),
        emergency.clone(),
        bus.clone(),
        persistence.clone(),
        thresholds.clone(),
        config.ai_autonomous_execute,
    ));

    let rate_limiter = RateLimiter::new(config.rate_limit_rps, config.rate_limit_enabled, config.rate_limit_trust_proxy);

    let state = AppState {
        telemetry,
        registry: registry.clone(),
        bus,
        missions,
        emergency,
        ai_monitor: ai_monitor.clone(),
        persistence,
        config: config.clone(),
        rate_limiter,
    };

    let (shutdown_tx, _) = broadcast::channel(1);

    supervisor::spawn_supervised_loop("registry-sweep", shutdown_tx.clone(), {
        let registry = registry.clone();
        move |shutdown| supervisor::run_registry_sweep(registry.clone(), shutdown)
    });

    supervisor::spawn_supervised_loop("ai-monitor", shutdown_tx.clone(), {
        let ai_monitor = ai_monitor.clone();
        move |shutdown| {
            let ai_monitor = ai_monitor.clone();
            async move { ai_monitor.run(shutdown).await }
        }
    });

    let app = api::routes()
        .route("/health", get(|| async { "OK" }))
        .with_state(state);

    let app = if config.allowed_origins.is_empty() {
        tracing::warn!("No CORS origins configured - CORS disabled (same-origin only)");
        app
    } else {
        let origins: Vec<HeaderValue> = config.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        app.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()))
        .await?;

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = sigterm.recv() => {},
            }
        }
        Err(err) => {
            tracing::warn!("Failed to install SIGTERM handler (CTRL-C only): {}", err);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}

#[cfg(not(unix))]
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
