// ABOUTME: Long-poll change-feed handler answering with the next write's notification.
// ABOUTME: Client disconnects drop the request future, which deregisters the waiter.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::app_state::SharedState;

/// GET /_changes - Hold the request open until the next write anywhere in
/// the service, then answer once with its notification string. No heartbeat
/// and no server-side deadline; any timeout comes from the transport.
pub async fn next_change(State(state): State<SharedState>) -> Response {
    let subscription = state.changes.subscribe();
    match subscription.wait().await {
        Some(change) => (StatusCode::OK, change).into_response(),
        // Only reachable if the feed side went away without resolving us.
        None => (StatusCode::INTERNAL_SERVER_ERROR, "change feed closed").into_response(),
    }
}
