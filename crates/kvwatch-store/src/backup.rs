// ABOUTME: Periodic full-dump backup job: snapshot the store, serialize, replace the file.
// ABOUTME: Failures are logged and swallowed so the schedule is never interrupted.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use kvwatch_core::{Storage, StorageError};
use thiserror::Error;

/// Internal failure taxonomy for one backup attempt. Never escapes this
/// module: the public entry point captures and logs it.
#[derive(Debug, Error)]
enum BackupError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read the full snapshot and replace the destination file with its JSON
/// encoding (keys to lossy-UTF-8 values). Tmp-write, fsync, rename: a
/// concurrent reader sees either the old or the new complete dump.
async fn write_dump(storage: &dyn Storage, dest: &Path) -> Result<(), BackupError> {
    let snapshot = storage.get_all().await?;
    let text: BTreeMap<String, String> = snapshot
        .iter()
        .map(|(k, v)| (k.clone(), String::from_utf8_lossy(v).into_owned()))
        .collect();
    let json = serde_json::to_string(&text)?;

    let tmp_path = dest.with_extension("tmp");
    let mut file = File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, dest)?;
    Ok(())
}

/// Run one backup. Any failure (storage read, serialization, unwritable
/// destination) is logged at warn level and swallowed; callers never see it
/// and the next scheduled run is unaffected.
pub async fn backup(storage: &dyn Storage, dest: &Path) {
    match write_dump(storage, dest).await {
        Ok(()) => tracing::debug!(dest = %dest.display(), "backup written"),
        Err(e) => tracing::warn!(dest = %dest.display(), "backup failed: {}", e),
    }
}

/// Start the repeating backup schedule: one backup immediately, then one
/// every `interval`, with the same storage and destination each time.
/// Runs until the returned handle is aborted or the runtime shuts down.
pub fn start_backup_loop(
    interval: Duration,
    storage: Arc<dyn Storage>,
    dest: PathBuf,
) -> tokio::task::JoinHandle<()> {
    tracing::info!(
        dest = %dest.display(),
        interval_secs = interval.as_secs(),
        "starting backup loop"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            // The first tick completes immediately, so the first backup
            // runs at start rather than one interval later.
            ticker.tick().await;
            backup(storage.as_ref(), &dest).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Storage stub that counts get_all calls, standing in for the real
    /// backend so the loop tests observe invocations without file content.
    struct CountingStorage {
        calls: AtomicUsize,
    }

    impl CountingStorage {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Storage for CountingStorage {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get_all(&self) -> Result<BTreeMap<String, Vec<u8>>, StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BTreeMap::from([("key".to_string(), b"value".to_vec())]))
        }
    }

    /// Storage stub whose snapshot always fails.
    struct BrokenStorage {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Storage for BrokenStorage {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), StorageError> {
            Ok(())
        }

        async fn get_all(&self) -> Result<BTreeMap<String, Vec<u8>>, StorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Io(std::io::Error::other("disk on fire")))
        }
    }

    /// Let spawned tasks run up to the next millisecond of virtual time.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test]
    async fn backup_writes_the_serialized_mapping() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dump.json");

        let store = MemoryStorage::new();
        store.set("key", b"value".to_vec()).await.unwrap();

        backup(&store, &dest).await;

        let contents = fs::read_to_string(&dest).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(
            parsed,
            BTreeMap::from([("key".to_string(), "value".to_string())])
        );
    }

    #[tokio::test]
    async fn backup_replaces_existing_file_content() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dump.json");
        fs::write(&dest, "stale content from a previous run").unwrap();

        let store = MemoryStorage::new();
        store.set("k", b"v".to_vec()).await.unwrap();

        backup(&store, &dest).await;

        let parsed: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(parsed, BTreeMap::from([("k".to_string(), "v".to_string())]));
    }

    #[tokio::test]
    async fn backup_swallows_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        // You can't rename a file over a directory.
        let dest = dir.path().join("is-a-directory");
        fs::create_dir(&dest).unwrap();

        let store = MemoryStorage::new();
        store.set("k", b"v".to_vec()).await.unwrap();

        // Must complete without panicking or surfacing the failure.
        backup(&store, &dest).await;
        assert!(dest.is_dir());
    }

    #[tokio::test]
    async fn backup_swallows_storage_failure() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dump.json");

        let store = BrokenStorage {
            calls: AtomicUsize::new(0),
        };
        backup(&store, &dest).await;
        assert!(!dest.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_fires_immediately_and_at_every_interval() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dump.json");

        let store = Arc::new(CountingStorage::new());
        let handle = start_backup_loop(
            Duration::from_secs(5),
            Arc::clone(&store) as Arc<dyn Storage>,
            dest,
        );

        settle().await;
        assert_eq!(store.calls(), 1, "first backup runs at t=0");

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(store.calls(), 2, "second backup runs at t=5");

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(store.calls(), 3, "third backup runs at t=10");

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn loop_keeps_ticking_after_failures() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dump.json");

        let store = Arc::new(BrokenStorage {
            calls: AtomicUsize::new(0),
        });
        let handle = start_backup_loop(
            Duration::from_secs(5),
            Arc::clone(&store) as Arc<dyn Storage>,
            dest,
        );

        settle().await;
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(
            store.calls.load(Ordering::SeqCst),
            2,
            "schedule continues after a failed backup"
        );

        handle.abort();
    }
}
