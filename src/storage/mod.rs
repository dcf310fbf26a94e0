//! Persistent key-value storage
//!
//! The store is the only durable medium the application writes to. It holds the
//! favorites list and the timestamped catalog and detail caches. Every operation
//! is infallible from the caller's point of view: read failures degrade to "absent"
//! and write failures degrade to a no-op, with the underlying error logged.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde_json::Value;
use thiserror::Error;

/// Errors raised by a storage medium
///
/// These never escape the store; they are logged and swallowed at the trait boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the medium failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored content is not valid JSON, or a value could not be encoded
    #[error("malformed stored content: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The medium refused a write because it is full
    #[error("quota exceeded writing '{key}' ({needed} bytes, {available} available)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
}

/// A durable, synchronous, string-keyed store of JSON values
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Returns the value stored under `key`
    ///
    /// Missing keys and malformed content both yield `None`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, replacing any previous value
    ///
    /// Never fails the caller; a rejected write is logged.
    fn set(&self, key: &str, value: &Value);

    /// Removes `key` if present
    fn remove(&self, key: &str);

    /// Lists every stored key starting with `prefix`, sorted
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}

/// Logs a storage failure as a non-fatal diagnostic
pub(crate) fn report(operation: &str, key: &str, error: &StorageError) {
    tracing::warn!(operation, key, %error, "storage operation failed");
}
