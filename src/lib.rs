// Rate-limited gateway in front of the Gemini API

pub mod clock;
pub mod config;
pub mod error;
pub mod gemini;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod prompts;
pub mod rate_limit;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::handlers::{
    chat_handler, health_handler, limits_handler, metrics_handler, trends_handler,
};
use crate::state::AppState;

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/trends", post(trends_handler))
        .route("/api/limits/{operation}", get(limits_handler))
        .with_state(state)
}
