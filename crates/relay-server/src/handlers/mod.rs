//! HTTP route handlers for the relay.

pub mod chat;

use axum::Json;

use crate::dto::HealthResponse;

/// Liveness check; independent of the agent service.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
