use axum::{Json, extract::State};
use std::sync::Arc;

use super::{admit, complete};
use crate::error::GatewayError;
use crate::models::{ChatKind, ChatRequest, ChatResponse};
use crate::prompts::chat_prompt;
use crate::state::{AppState, GatedOperation};

pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, GatewayError> {
    if payload.kind == ChatKind::TrendExploration
        && payload.query.as_deref().is_none_or(|q| q.trim().is_empty())
    {
        return Err(GatewayError::BadRequest(
            "query is required for trend-exploration".to_string(),
        ));
    }

    admit(&state, GatedOperation::Chat)?;

    tracing::info!(
        kind = ?payload.kind,
        user_id = payload.user_id.as_deref().unwrap_or("-"),
        "processing chat request"
    );
    let content = complete(&state, GatedOperation::Chat, chat_prompt(&payload))
        .await?
        .unwrap_or_else(|| FALLBACK_REPLY.to_string());

    Ok(Json(ChatResponse { content }))
}
