// ABOUTME: Shared application state for the kvwatch HTTP server.
// ABOUTME: Bundles the storage backend with the change feed all handlers publish to.

use std::sync::Arc;

use kvwatch_core::{ChangeFeed, Storage};

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub changes: ChangeFeed,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create a new AppState around the given backend with a fresh change feed.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            changes: ChangeFeed::new(),
        }
    }
}
