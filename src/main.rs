use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use gemini_gateway::build_app;
use gemini_gateway::clock::SystemClock;
use gemini_gateway::config::Args;
use gemini_gateway::gemini::GeminiClient;
use gemini_gateway::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let limiter_config = args.limiter_config();

    if limiter_config.minute_limit > limiter_config.hour_limit {
        tracing::warn!(
            minute_limit = limiter_config.minute_limit,
            hour_limit = limiter_config.hour_limit,
            "minute limit is above hour limit; the hour limit will always bind first"
        );
    }

    let gemini = GeminiClient::new(
        reqwest::Client::new(),
        &args.gemini_url,
        &args.gemini_model,
        args.gemini_api_key.clone(),
        Duration::from_secs(args.upstream_timeout_secs),
    );
    if !gemini.has_api_key() {
        tracing::warn!("GEMINI_API_KEY not set; admitted requests will fail");
    }

    let state = Arc::new(AppState::new(gemini, limiter_config, Arc::new(SystemClock)));
    let app = build_app(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(port = args.port, "gateway listening");
    tracing::info!(url = %args.gemini_url, model = %args.gemini_model, "forwarding to Gemini");
    tracing::info!(
        minute_limit = limiter_config.minute_limit,
        hour_limit = limiter_config.hour_limit,
        minute_window_ms = limiter_config.minute_window_ms,
        hour_window_ms = limiter_config.hour_window_ms,
        "rate limits per gated operation"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
