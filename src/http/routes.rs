use super::state::AppState;
use super::{handlers, ws};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Supported target languages
        .route("/languages", get(handlers::get_languages))
        // Streaming transcription/translation sessions
        .route("/ws/transcribe-translate", get(ws::ws_handler))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
