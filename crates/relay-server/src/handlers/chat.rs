//! Chat endpoint: one inbound message, one agent run, one reply.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::info;

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::AppError;
use crate::AppState;

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    info!(
        "chat request: {}...",
        req.message.get(..50).unwrap_or(&req.message)
    );

    let reply = state.orchestrator.run(&req.message).await?;
    Ok(Json(ChatResponse { reply }))
}
