//! HTTP error mapping for orchestration failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::RelayError;
use serde::Serialize;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    RunFailed(String),
    GatewayTimeout(String),
    BadGateway(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        let detail = err.to_string();
        match err {
            RelayError::InvalidRequest(_) => AppError::BadRequest(detail),
            RelayError::RunFailed { .. } => AppError::RunFailed(detail),
            RelayError::RunTimeout { .. } => AppError::GatewayTimeout(detail),
            RelayError::Upstream(_) => AppError::BadGateway(detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::RunFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
