use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::clock::Clock;
use crate::gemini::GeminiClient;
use crate::rate_limit::{LimiterConfig, RateLimiter};

// Operations that call the generative-AI backend. Each one is guarded by its
// own limiter; they do not share quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GatedOperation {
    Chat,
    Trends,
}

impl GatedOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatedOperation::Chat => "chat",
            GatedOperation::Trends => "trends",
        }
    }
}

impl fmt::Display for GatedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatedOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(GatedOperation::Chat),
            "trends" => Ok(GatedOperation::Trends),
            other => Err(other.to_string()),
        }
    }
}

// app's shared state
pub struct AppState {
    pub gemini: GeminiClient,
    pub limiter_config: LimiterConfig,
    clock: Arc<dyn Clock>,
    limiters: DashMap<GatedOperation, Arc<RateLimiter>>,
}

impl AppState {
    pub fn new(gemini: GeminiClient, limiter_config: LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            gemini,
            limiter_config,
            clock,
            limiters: DashMap::new(),
        }
    }

    // Limiter for `op`, created on first use.
    pub fn limiter(&self, op: GatedOperation) -> Arc<RateLimiter> {
        self.limiters
            .entry(op)
            .or_insert_with(|| {
                tracing::debug!(operation = %op, "creating rate limiter");
                Arc::new(RateLimiter::with_clock(
                    self.limiter_config,
                    Arc::clone(&self.clock),
                ))
            })
            .value()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::time::Duration;

    fn state() -> AppState {
        let gemini = GeminiClient::new(
            reqwest::Client::new(),
            "http://localhost:1",
            "test-model",
            None,
            Duration::from_secs(1),
        );
        AppState::new(
            gemini,
            LimiterConfig::default(),
            Arc::new(ManualClock::new(1_700_000_000_000)),
        )
    }

    #[test]
    fn same_operation_shares_one_limiter() {
        let state = state();
        let a = state.limiter(GatedOperation::Chat);
        let b = state.limiter(GatedOperation::Chat);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn operations_have_independent_quota() {
        let state = state();
        let chat = state.limiter(GatedOperation::Chat);
        for _ in 0..3 {
            assert!(chat.check_limit().allowed);
        }
        assert!(!chat.check_limit().allowed);
        assert!(state.limiter(GatedOperation::Trends).check_limit().allowed);
    }

    #[test]
    fn operation_names_round_trip() {
        assert_eq!("chat".parse(), Ok(GatedOperation::Chat));
        assert_eq!("trends".parse(), Ok(GatedOperation::Trends));
        assert!("recommendations".parse::<GatedOperation>().is_err());
    }
}
