mod config;
mod errors;
mod evaluation;
mod extract;
mod llm_client;
mod routes;
mod scoring;
mod sheets;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluation::session::SessionStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::sheets::SheetsAppender;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TrackRec API v{}", env!("CARGO_PKG_VERSION"));

    // The rubric is immutable for the lifetime of the process; startup
    // fails if the file is missing.
    let rubric = std::fs::read_to_string(&config.rubric_path)
        .with_context(|| format!("Failed to read rubric file '{}'", config.rubric_path))?;
    info!(
        "Rubric loaded from {} ({} chars)",
        config.rubric_path,
        rubric.chars().count()
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize the spreadsheet appender
    let sheet = Arc::new(SheetsAppender::new(
        config.spreadsheet_id.clone(),
        config.sheets_api_token.clone(),
    ));
    info!(
        "Sheets appender initialized (spreadsheet: {})",
        config.spreadsheet_id
    );

    // Build app state
    let state = AppState {
        llm,
        sheet,
        sessions: SessionStore::default(),
        rubric: Arc::new(rubric),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // internal tool behind the shared password

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
