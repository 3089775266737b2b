//! Data transfer objects for the HTTP surface.

use serde::{Deserialize, Serialize};

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response body for the chat endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Response body for the liveness check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}
