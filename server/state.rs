use std::sync::Arc;
use ferrite_style::Stylizer;

/// Everything a handler needs.  Read-only after startup, so no lock.
pub struct ServerState {
    pub stylizer:       Stylizer,
    /// Requests announcing a larger body are refused with 413.
    pub max_body_bytes: usize,
}

impl ServerState {
    pub fn new(stylizer: Stylizer, max_body_bytes: usize) -> Self {
        ServerState { stylizer, max_body_bytes }
    }
}

/// Shared state type, an `Arc<ServerState>` passed to every handler.
pub type SharedState = Arc<ServerState>;
