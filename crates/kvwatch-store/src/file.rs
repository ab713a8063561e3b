// ABOUTME: File-backed storage backend that keeps the whole mapping in memory.
// ABOUTME: Hydrates from JSON at open and rewrites the file atomically after every set.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kvwatch_core::{Storage, StorageError};
use tokio::sync::RwLock;

/// Key-value store persisted as a single JSON file. The file always holds a
/// complete snapshot: writes go to a sibling tmp file, fsync, then rename.
/// Values are serialized as byte arrays so binary content round-trips exactly.
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl FileStorage {
    /// Open (or create) a file-backed store at the given path.
    /// Creates parent directories; a missing file means an empty mapping.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let contents = fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        })
    }

    /// Replace the on-disk snapshot with the given mapping.
    /// Called with the write lock held so the file tracks the map exactly.
    fn persist(&self, entries: &HashMap<String, Vec<u8>>) -> Result<(), StorageError> {
        let tmp_path = self.path.with_extension("tmp");
        let json = serde_json::to_string(entries)?;

        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    async fn get_all(&self) -> Result<BTreeMap<String, Vec<u8>>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
