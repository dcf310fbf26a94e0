//! Timestamped cache layered over the key-value store
//!
//! Provides a `TimestampedCache` that wraps stored values with the time they were
//! written and only hands them back while they are younger than the validity window.

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

use crate::storage::KeyValueStore;

/// How long a cache entry stays valid (24 hours)
pub const VALIDITY_WINDOW_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Wrapper stored in the key-value store for every cached value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The cached value
    pub value: T,
    /// When the value was written, in milliseconds since the Unix epoch
    pub written_at_epoch_millis: i64,
}

impl<T> CacheEntry<T> {
    /// Whether the entry is still inside the validity window at `now_millis`
    pub fn is_valid_at(&self, now_millis: i64) -> bool {
        now_millis - self.written_at_epoch_millis < VALIDITY_WINDOW_MILLIS
    }
}

/// Reads and writes cached values with a 24-hour expiry
///
/// Expired entries are ignored on read rather than evicted; the next successful
/// write for the same key replaces them.
#[derive(Debug, Clone)]
pub struct TimestampedCache {
    store: Arc<dyn KeyValueStore>,
}

impl TimestampedCache {
    /// Creates a cache over the given store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the value under `key` if present and not expired
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, now_millis())
    }

    /// Like [`get`](Self::get), evaluated at an explicit clock reading
    pub fn get_at<T: DeserializeOwned>(&self, key: &str, now_millis: i64) -> Option<T> {
        let entry = self.read_entry::<T>(key)?;
        if entry.is_valid_at(now_millis) {
            Some(entry.value)
        } else {
            tracing::debug!(key, "cache entry expired");
            None
        }
    }

    /// Stores `value` under `key` stamped with the current time
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        self.set_at(key, value, now_millis());
    }

    /// Like [`set`](Self::set), stamped with an explicit clock reading
    pub fn set_at<T: Serialize>(&self, key: &str, value: &T, now_millis: i64) {
        let entry = CacheEntry {
            value,
            written_at_epoch_millis: now_millis,
        };
        match serde_json::to_value(&entry) {
            Ok(json) => self.store.set(key, &json),
            Err(error) => tracing::warn!(key, %error, "could not encode cache entry"),
        }
    }

    /// Reads the raw entry under `key` regardless of age
    ///
    /// Returns `None` if the key is missing or the stored JSON does not have the
    /// entry shape.
    pub fn read_entry<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let json = self.store.get(key)?;
        serde_json::from_value(json)
            .map_err(|error| tracing::warn!(key, %error, "malformed cache entry"))
            .ok()
    }

    /// Removes every entry whose key starts with `prefix`, returning how many were removed
    pub fn clear_prefix(&self, prefix: &str) -> usize {
        let keys = self.store.keys_with_prefix(prefix);
        for key in &keys {
            self.store.remove(key);
        }
        tracing::info!(prefix, removed = keys.len(), "cleared cache entries");
        keys.len()
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
