// ABOUTME: Route definitions for the kvwatch HTTP API.
// ABOUTME: Assembles the key-value and change-feed routes into a single Axum Router.

use axum::Router;
use axum::routing::get;

use crate::api;
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
/// The static `/health` and `/_changes` segments take precedence over the
/// `/{key}` capture, so those two names are reserved on the HTTP surface.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/_changes", get(api::changes::next_change))
        .route("/{key}", get(api::kv::get_key).post(api::kv::set_key))
        .with_state(state)
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
