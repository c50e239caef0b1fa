use axum::{Json, extract::State};
use serde_json::Value;
use std::sync::Arc;

use super::{admit, complete};
use crate::error::GatewayError;
use crate::gemini::extract_json_object;
use crate::models::TrendsRequest;
use crate::prompts::trends_prompt;
use crate::state::{AppState, GatedOperation};

// Ranked opportunities for a free-text market query
pub async fn trends_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TrendsRequest>,
) -> Result<Json<Value>, GatewayError> {
    if payload.query_text.trim().is_empty() {
        return Err(GatewayError::BadRequest("query_text is required".to_string()));
    }

    // key check precedes admission
    if !state.gemini.has_api_key() {
        return Err(GatewayError::MissingApiKey);
    }

    admit(&state, GatedOperation::Trends)?;

    tracing::info!(
        user_id = payload.user_id.as_deref().unwrap_or("-"),
        query = %payload.query_text,
        "processing trends query"
    );
    let text = complete(&state, GatedOperation::Trends, trends_prompt(&payload))
        .await?
        .ok_or(GatewayError::EmptyCompletion)?;

    let parsed = extract_json_object(&text)?;
    tracing::info!(
        opportunities = parsed["opportunities"].as_array().map_or(0, Vec::len),
        "parsed trends completion"
    );
    Ok(Json(parsed))
}
