mod chat;
mod health;
mod limits;
mod metrics;
mod trends;

pub use chat::chat_handler;
pub use health::health_handler;
pub use limits::limits_handler;
pub use metrics::metrics_handler;
pub use trends::trends_handler;

use crate::error::{Denial, GatewayError};
use crate::metrics::{ADMITTED_TOTAL, DENIED_TOTAL, REQUEST_TOTAL, UPSTREAM_ERRORS};
use crate::state::{AppState, GatedOperation};

// Run the admission check for `op`. A denial comes back as an error so the
// handler returns before the backend is called.
fn admit(state: &AppState, op: GatedOperation) -> Result<(), GatewayError> {
    REQUEST_TOTAL.with_label_values(&[op.as_str()]).inc();

    let result = state.limiter(op).check_limit();
    if result.allowed {
        ADMITTED_TOTAL.with_label_values(&[op.as_str()]).inc();
        tracing::debug!(operation = %op, "request admitted");
        return Ok(());
    }

    let window = result.window;
    let window_label = window.map_or("unknown", |w| w.as_str());
    DENIED_TOTAL
        .with_label_values(&[op.as_str(), window_label])
        .inc();
    tracing::warn!(
        operation = %op,
        window = window_label,
        reset_time = ?result.reset_time,
        "rate limit exceeded"
    );

    Err(GatewayError::RateLimited(Denial {
        operation: op,
        window,
        message: result.error.unwrap_or_default(),
        reset_time: result.reset_time,
        retry_after_secs: result.retry_after_secs.unwrap_or_default(),
    }))
}

// Call the backend on behalf of an admitted request
async fn complete(
    state: &AppState,
    op: GatedOperation,
    prompt: String,
) -> Result<Option<String>, GatewayError> {
    match state.gemini.complete(prompt).await {
        Ok(text) => Ok(text),
        Err(e) => {
            UPSTREAM_ERRORS.with_label_values(&[op.as_str()]).inc();
            tracing::error!(operation = %op, error = %e, "Gemini call failed");
            Err(e)
        }
    }
}
