use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::session::StreamSettings;

/// Shared application state for HTTP/WebSocket handlers
#[derive(Clone)]
pub struct AppState {
    /// Bounded worker pool shared by all sessions
    pub dispatcher: Arc<Dispatcher>,

    /// Session-engine tunables (threshold, supported targets)
    pub stream: StreamSettings,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, stream: StreamSettings) -> Self {
        Self { dispatcher, stream }
    }
}
