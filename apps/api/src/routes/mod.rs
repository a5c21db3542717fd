pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session/unlock", post(handlers::handle_unlock))
        .route("/api/v1/session/:id", get(handlers::handle_status))
        .route(
            "/api/v1/session/:id/document",
            post(handlers::handle_document),
        )
        .route("/api/v1/session/:id/rate", post(handlers::handle_rate))
        .route("/api/v1/session/:id/submit", post(handlers::handle_submit))
        .route("/api/v1/session/:id", delete(handlers::handle_discard))
        .with_state(state)
}
