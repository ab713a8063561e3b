// ABOUTME: Per-key HTTP handlers mediating between requests and the storage backend.
// ABOUTME: A successful set publishes the change to the feed after the write completes.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::app_state::SharedState;

/// GET /{key} - Return the raw value, or 404 with a literal `Not found` body.
pub async fn get_key(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Response {
    match state.storage.get(&key).await {
        Ok(Some(value)) => (StatusCode::OK, value).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("get of {} failed: {}", key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "storage failure").into_response()
        }
    }
}

/// POST /{key} - Store the raw request body as the value, then notify the
/// change feed. A failed write returns 500 and publishes nothing.
pub async fn set_key(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Response {
    match state.storage.set(&key, body.to_vec()).await {
        Ok(()) => {
            let notified = state.changes.publish(&key, &body);
            tracing::debug!(key = %key, bytes = body.len(), notified, "key set");
            StatusCode::OK.into_response()
        }
        Err(e) => {
            tracing::error!("set of {} failed: {}", key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "storage failure").into_response()
        }
    }
}
