// ABOUTME: HTTP server for kvwatch, providing the key-value API and long-poll change feed.
// ABOUTME: Uses Axum with shared storage and notifier state.

pub mod api;
pub mod app_state;
pub mod config;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use config::{ConfigError, KvwatchConfig, StorageBackend};
pub use routes::create_router;
