//! The `{status, reason?, detail?}` response envelope every client-initiated
//! action returns.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sar_core::CoreError;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

#[derive(Debug)]
pub struct ApiError {
    pub code: StatusCode,
    pub reason: String,
}

impl ApiError {
    pub fn new(code: StatusCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, reason)
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, reason)
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, reason)
    }

    /// Domain methods that fail with a plain `String` report "unknown ..."
    /// for a missing resource and anything else for a state conflict.
    pub fn from_domain_string(message: String) -> Self {
        if message.starts_with("unknown") {
            Self::not_found(message)
        } else {
            Self::conflict(message)
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(reason) => ApiError::new(StatusCode::BAD_REQUEST, reason),
            CoreError::Conflict(reason) => ApiError::new(StatusCode::CONFLICT, reason),
            CoreError::Timeout(reason) => ApiError::new(StatusCode::GATEWAY_TIMEOUT, reason),
            CoreError::Transport { drone_id, reason } => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("transport error dispatching to {drone_id}: {reason}"),
            ),
            CoreError::LostDrone(drone_id) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("drone {drone_id} is lost"),
            ),
            CoreError::Internal(reason) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, reason),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope {
            status: "error",
            reason: Some(self.reason),
            detail: None,
        };
        (self.code, Json(body)).into_response()
    }
}

pub fn ok_envelope() -> Json<Envelope> {
    Json(Envelope {
        status: "ok",
        reason: None,
        detail: None,
    })
}
