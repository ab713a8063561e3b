// ABOUTME: Core library for kvwatch, containing the storage contract and change notifier.
// ABOUTME: This crate defines the shared types used across all kvwatch components.

pub mod notify;
pub mod storage;

pub use notify::{ChangeFeed, Subscription};
pub use storage::{Storage, StorageError};
