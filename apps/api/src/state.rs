use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::session::SessionStore;
use crate::llm_client::LlmClient;
use crate::sheets::RowAppender;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Pluggable row sink. Production: Google Sheets; tests inject memory.
    pub sheet: Arc<dyn RowAppender>,
    pub sessions: SessionStore,
    /// Scoring rubric, loaded once at startup and sent verbatim as the
    /// rating collaborator's system instructions.
    pub rubric: Arc<String>,
    pub config: Config,
}
