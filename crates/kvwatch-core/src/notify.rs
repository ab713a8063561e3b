// ABOUTME: Change notifier holding the waiters for the next key-value write.
// ABOUTME: Publish swaps the whole waiter set out atomically and resolves every detached waiter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// Waiters registered for the next write, keyed by registration id.
/// The id counter survives publishes so later subscriptions never collide.
#[derive(Default)]
struct WaiterSet {
    next_id: u64,
    pending: HashMap<u64, oneshot::Sender<String>>,
}

/// Fan-out notifier for key-value writes. Each waiter receives at most one
/// notification; a publish resolves every waiter registered at that moment
/// and leaves later subscriptions untouched. Cloning shares the waiter set.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    waiters: Arc<Mutex<WaiterSet>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self) -> MutexGuard<'_, WaiterSet> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a waiter for the next write. The returned subscription
    /// deregisters itself on drop if it has not already been resolved.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = oneshot::channel();
        let id = {
            let mut set = self.set();
            let id = set.next_id;
            set.next_id += 1;
            set.pending.insert(id, tx);
            id
        };
        tracing::debug!(id, "change waiter registered");
        Subscription {
            waiters: Arc::clone(&self.waiters),
            id,
            rx,
        }
    }

    /// Resolve every currently-registered waiter with the notification for
    /// this write and reset the set. The swap happens under the lock;
    /// the sends happen after it is released, so a slow or gone receiver
    /// never blocks the publisher and concurrent subscribers land in the
    /// fresh set. Returns the number of waiters notified.
    pub fn publish(&self, key: &str, value: &[u8]) -> usize {
        let detached = std::mem::take(&mut self.set().pending);
        let change = format!(
            "\"{}\" has been set to \"{}\"",
            key,
            String::from_utf8_lossy(value)
        );

        let count = detached.len();
        for (_, tx) in detached {
            // Receiver may already be gone (client disconnected between the
            // swap and the send); that is a normal cancellation.
            let _ = tx.send(change.clone());
        }
        tracing::debug!(key, count, "change published");
        count
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.set().pending.len()
    }
}

/// A registered, not-yet-resolved waiter for the next write.
/// Held by one open long-poll request; dropping it cancels the registration.
pub struct Subscription {
    waiters: Arc<Mutex<WaiterSet>>,
    id: u64,
    rx: oneshot::Receiver<String>,
}

impl Subscription {
    /// Wait for the next write and return its notification.
    /// Returns `None` only if the feed vanished without resolving us.
    pub async fn wait(mut self) -> Option<String> {
        (&mut self.rx).await.ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut set = self
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Absent when a publish already resolved this waiter; removing an
        // absent id is the idempotent no-op cancellation.
        if set.pending.remove(&self.id).is_some() {
            tracing::debug!(id = self.id, "change waiter cancelled");
        }
    }
}
