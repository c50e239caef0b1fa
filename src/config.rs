use clap::Parser;

use crate::rate_limit::LimiterConfig;

// CLI argument structure, every flag also readable from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "gemini-gateway")]
#[command(about = "Rate-limited gateway in front of the Gemini API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "GATEWAY_PORT", default_value_t = 8080)]
    pub port: u16,

    // Base URL of the generative-AI backend
    #[arg(long, env = "GEMINI_URL", default_value = "https://generativelanguage.googleapis.com")]
    pub gemini_url: String,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash-exp")]
    pub gemini_model: String,

    // Requests fail with 500 until this is set
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    // Admitted requests per minute window, per gated operation
    #[arg(long, env = "MINUTE_LIMIT", default_value_t = 3)]
    pub minute_limit: u32,

    // Admitted requests per hour window, per gated operation
    #[arg(long, env = "HOUR_LIMIT", default_value_t = 10)]
    pub hour_limit: u32,

    #[arg(long, env = "MINUTE_WINDOW_MS", default_value_t = 60_000)]
    pub minute_window_ms: u64,

    #[arg(long, env = "HOUR_WINDOW_MS", default_value_t = 3_600_000)]
    pub hour_window_ms: u64,

    // Timeout for a single call to the backend
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 60)]
    pub upstream_timeout_secs: u64,
}

impl Args {
    pub fn limiter_config(&self) -> LimiterConfig {
        LimiterConfig {
            minute_limit: self.minute_limit,
            hour_limit: self.hour_limit,
            minute_window_ms: self.minute_window_ms,
            hour_window_ms: self.hour_window_ms,
        }
    }
}
