//! API routes for the SAR fleet coordinator server.

pub mod auth;
pub mod error;
mod routes;
mod ws;

use axum::{routing::get, Router};

use crate::app_state::AppState;

pub fn routes() -> Router<AppState> {
    routes::create_router().route("/ws", get(ws::ws_handler))
}
