//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use trialmatch_chat::ConversationEngine;

/// Shared application state, cheap to clone across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// The conversation engine serving every session.
    pub engine: Arc<ConversationEngine>,
    /// Server start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: ConversationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            start_time: Instant::now(),
        }
    }
}
