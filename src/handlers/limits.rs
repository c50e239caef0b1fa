use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;

use crate::error::GatewayError;
use crate::rate_limit::Remaining;
use crate::state::{AppState, GatedOperation};

// Requests left in each window for one operation. Does not consume quota.
pub async fn limits_handler(
    State(state): State<Arc<AppState>>,
    Path(operation): Path<String>,
) -> Result<Json<Remaining>, GatewayError> {
    let op: GatedOperation = operation
        .parse()
        .map_err(GatewayError::UnknownOperation)?;
    Ok(Json(state.limiter(op).remaining_requests()))
}
