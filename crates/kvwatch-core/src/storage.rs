// ABOUTME: Asynchronous key-value storage contract consumed by the server and backup job.
// ABOUTME: Backends implement get/set/get_all; the core holds no cached copy of any entry.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur inside a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An asynchronous key-value store. One value per key; values are opaque
/// byte sequences owned by the backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Look up a single key. `Ok(None)` means the key was never written.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Set a key to a value, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Snapshot the full mapping at one point in time.
    async fn get_all(&self) -> Result<BTreeMap<String, Vec<u8>>, StorageError>;
}
