mod config;
mod errors;
mod llm_client;
mod optimizer;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::optimizer::rewrite::OPTIMIZER_MODEL;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("optimizer_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Prompt Optimizer Proxy v{}", env!("CARGO_PKG_VERSION"));

    // Single upstream client, shared read-only by all request handlers
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_project.clone(),
        config.openai_base_url.clone(),
    );
    info!("LLM client initialized (optimizer model: {OPTIMIZER_MODEL})");

    let state = AppState { llm };

    // CORS stays permissive: extension/background fetches, no cookies or
    // credentials involved.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
