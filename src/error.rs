use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::rate_limit::Window;
use crate::state::GatedOperation;

// A request the admission controller turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub operation: GatedOperation,
    pub window: Option<Window>,
    pub message: String,
    // Epoch millis at which the denying window resets.
    pub reset_time: Option<u64>,
    pub retry_after_secs: u64,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{}", .0.message)]
    RateLimited(Denial),

    #[error("GEMINI_API_KEY not configured")]
    MissingApiKey,

    #[error("{0}")]
    BadRequest(String),

    #[error("unknown gated operation: {0}")]
    UnknownOperation(String),

    #[error("Request to Gemini API failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Gemini API error: {status}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Invalid response from Gemini API")]
    EmptyCompletion,

    #[error("No JSON found in Gemini response: {0}")]
    MalformedCompletion(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::UnknownOperation(_) => StatusCode::NOT_FOUND,
            GatewayError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Upstream(_)
            | GatewayError::UpstreamStatus { .. }
            | GatewayError::EmptyCompletion
            | GatewayError::MalformedCompletion(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            GatewayError::RateLimited(denial) => {
                let mut body = json!({
                    "error": denial.message,
                    "rateLimited": true,
                    "window": denial.window,
                    "resetTime": denial.reset_time,
                });
                if denial.operation == GatedOperation::Trends {
                    body["opportunities"] = json!([]);
                }
                let mut response = (status, Json(body)).into_response();
                response.headers_mut().insert(
                    header::RETRY_AFTER,
                    HeaderValue::from(denial.retry_after_secs),
                );
                response
            }
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}
