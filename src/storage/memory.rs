//! In-memory key-value store
//!
//! Used for `--ephemeral` sessions and in tests. Values are held as serialized text,
//! the same way the filesystem medium holds them, so malformed content and size
//! limits behave identically.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{report, KeyValueStore, StorageError};

/// Non-durable store backed by a map of serialized values
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    /// Maximum total bytes of stored text, if limited
    quota: Option<usize>,
}

impl MemoryStore {
    /// Creates an empty, unlimited store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects writes past `quota` bytes of stored text
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    /// Writes raw text into the medium, bypassing serialization
    pub fn insert_raw(&self, key: &str, raw: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), raw.into());
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn try_set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        let Ok(mut entries) = self.entries.lock() else {
            return Ok(());
        };

        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let available = quota.saturating_sub(used);
            if json.len() > available {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed: json.len(),
                    available,
                });
            }
        }

        entries.insert(key.to_string(), json);
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let raw = self.entries.lock().ok()?.get(key).cloned()?;
        serde_json::from_str(&raw)
            .map_err(|e| report("get", key, &StorageError::Malformed(e)))
            .ok()
    }

    fn set(&self, key: &str, value: &Value) {
        if let Err(e) = self.try_set(key, value) {
            report("set", key, &e);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .keys()
                    .filter(|key| key.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
