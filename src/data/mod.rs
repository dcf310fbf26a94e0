//! Core data models for the holocron catalog
//!
//! This module contains the records fetched from the Star Wars API, the favorites
//! entry type, and the components that fetch, cache, and resolve them.

pub mod catalog;
pub mod category;
pub mod details;
pub mod favorites;
pub mod fetcher;

pub use catalog::{Catalog, CatalogEvent, CatalogHandle, CatalogLoader, LOAD_FAILED_MESSAGE};
pub use category::{CategoryKind, CategorySchema, FieldSpec};
pub use details::DetailResolver;
pub use favorites::Favorites;
pub use fetcher::{FetchError, RetryPolicy, RetryingFetcher, Shape, DEFAULT_API_BASE};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Summary record returned by a category listing
///
/// `uid` is only unique within its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub uid: String,
    pub name: String,
    pub url: String,
}

/// Full attribute set for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub uid: String,
    pub category: CategoryKind,
    pub properties: BTreeMap<String, String>,
}

impl DetailRecord {
    /// Builds a record from the `result.properties` object of a detail response
    ///
    /// Non-string values are flattened to text: arrays are joined with `", "`,
    /// `null` becomes an empty string, anything else uses its JSON rendering.
    pub fn from_properties(uid: &str, category: CategoryKind, properties: &Map<String, Value>) -> Self {
        let properties = properties
            .iter()
            .map(|(key, value)| (key.clone(), property_text(value)))
            .collect();
        Self {
            uid: uid.to_string(),
            category,
            properties,
        }
    }

    /// Returns a property value by key
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// The item's display name, if the record carries one
    pub fn name(&self) -> Option<&str> {
        self.property("name")
    }
}

fn property_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(property_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// One item the user marked as a favorite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub uid: String,
    pub name: String,
    pub category: CategoryKind,
}

impl FavoriteEntry {
    /// Creates a favorite from a catalog listing entry
    pub fn from_item(item: &CatalogItem, category: CategoryKind) -> Self {
        Self {
            uid: item.uid.clone(),
            name: item.name.clone(),
            category,
        }
    }
}

/// Cache key shared by the in-memory and persisted detail caches: `{category}_{id}`
pub fn detail_key(category: CategoryKind, uid: &str) -> String {
    format!("{}_{}", category.path_segment(), uid)
}
