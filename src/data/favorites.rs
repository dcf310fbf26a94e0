//! User favorites persisted under a single store key

use serde_json::Value;
use std::sync::Arc;

use super::FavoriteEntry;
use crate::storage::KeyValueStore;

/// Store key holding the favorites array
pub const FAVORITES_KEY: &str = "favorites";

/// Ordered set of favorites keyed by uid
///
/// Every mutation writes the full collection back to the store.
#[derive(Debug, Clone)]
pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<FavoriteEntry>,
}

impl Favorites {
    /// Loads favorites from the store
    ///
    /// An absent or non-array value yields an empty collection. Entries that fail
    /// to parse are skipped, and duplicate uids keep their first occurrence.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.get(FAVORITES_KEY) {
            Some(Value::Array(raw)) => parse_entries(raw),
            Some(other) => {
                tracing::warn!(kind = value_kind(&other), "stored favorites are not an array");
                Vec::new()
            }
            None => Vec::new(),
        };

        tracing::debug!(count = entries.len(), "loaded favorites");
        Self { store, entries }
    }

    /// Adds the entry if its uid is absent, otherwise removes the existing entry
    ///
    /// Returns true if the entry is a favorite afterwards.
    pub fn toggle(&mut self, entry: FavoriteEntry) -> bool {
        let added = match self.entries.iter().position(|e| e.uid == entry.uid) {
            Some(index) => {
                self.entries.remove(index);
                false
            }
            None => {
                self.entries.push(entry);
                true
            }
        };
        self.persist();
        added
    }

    /// Whether any favorite has this uid
    pub fn is_favorite(&self, uid: &str) -> bool {
        self.entries.iter().any(|e| e.uid == uid)
    }

    /// Favorites in insertion order
    pub fn list(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        match serde_json::to_value(&self.entries) {
            Ok(value) => self.store.set(FAVORITES_KEY, &value),
            Err(e) => tracing::warn!(error = %e, "failed to encode favorites"),
        }
    }
}

fn parse_entries(raw: Vec<Value>) -> Vec<FavoriteEntry> {
    let mut entries: Vec<FavoriteEntry> = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value::<FavoriteEntry>(value) {
            Ok(entry) if entries.iter().any(|e| e.uid == entry.uid) => {
                tracing::debug!(uid = %entry.uid, "dropping duplicate favorite");
            }
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable favorite"),
        }
    }
    entries
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
