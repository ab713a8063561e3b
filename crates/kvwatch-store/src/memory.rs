// ABOUTME: In-memory storage backend holding the full mapping behind an async RwLock.
// ABOUTME: The default backend; contents live for the process lifetime only.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use kvwatch_core::{Storage, StorageError};
use tokio::sync::RwLock;

/// Volatile key-value store. Reads share the lock; writes take it exclusively.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_all(&self) -> Result<BTreeMap<String, Vec<u8>>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
