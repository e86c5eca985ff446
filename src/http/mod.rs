//! HTTP/WebSocket surface
//!
//! Thin outer shell around the session engine:
//! - GET /ws/transcribe-translate - streaming session (WebSocket)
//! - GET /languages - supported target languages
//! - GET /health - health check

mod handlers;
mod routes;
mod state;
mod ws;

pub use routes::create_router;
pub use state::AppState;
