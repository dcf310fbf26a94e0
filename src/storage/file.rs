//! Filesystem-backed key-value store
//!
//! Each key is a JSON file in a single directory (`~/.local/share/holocron/store/`
//! on Linux). Keys are percent-encoded into file names so that namespaced keys like
//! `catalog:people` map to portable names.

use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{report, KeyValueStore, StorageError};

const FILE_EXTENSION: &str = "json";

/// Stores JSON values as one file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding the store files
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at a custom directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory the store writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", urlencoding::encode(key), FILE_EXTENSION))
    }

    fn try_get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let content = match fs::read_to_string(self.path_for(key)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn try_set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(value)?;
        fs::write(self.path_for(key), json)?;
        Ok(())
    }

    fn try_remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn try_keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(key) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| urlencoding::decode(stem).ok())
            {
                keys.push(key.into_owned());
            }
        }
        Ok(keys)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.try_get(key).unwrap_or_else(|e| {
            report("get", key, &e);
            None
        })
    }

    fn set(&self, key: &str, value: &Value) {
        if let Err(e) = self.try_set(key, value) {
            report("set", key, &e);
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            report("remove", key, &e);
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys = self.try_keys().unwrap_or_else(|e| {
            report("list", prefix, &e);
            Vec::new()
        });
        keys.retain(|key| key.starts_with(prefix));
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path().join("store"));
        (store, temp_dir)
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let (store, _temp_dir) = create_test_store();
        let value = json!({"name": "Luke Skywalker", "uid": "1"});

        store.set("favorites", &value);

        assert_eq!(store.get("favorites"), Some(value));
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.get("nothing-here").is_none());
    }

    #[test]
    fn test_get_malformed_content_is_none() {
        let (store, _temp_dir) = create_test_store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path_for("favorites"), "{not json").unwrap();

        assert!(store.get("favorites").is_none());
    }

    #[test]
    fn test_set_into_unwritable_location_does_not_panic() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the store directory should be
        let blocker = temp_dir.path().join("blocked");
        fs::write(&blocker, "").unwrap();
        let store = FileStore::with_dir(blocker);

        store.set("favorites", &json!([]));

        assert!(store.get("favorites").is_none());
    }

    #[test]
    fn test_namespaced_key_maps_to_escaped_file_name() {
        let (store, _temp_dir) = create_test_store();
        store.set("catalog:people", &json!([]));

        assert!(store.dir().join("catalog%3Apeople.json").exists());
    }

    #[test]
    fn test_keys_with_prefix_lists_matching_keys() {
        let (store, _temp_dir) = create_test_store();
        store.set("details:people_1", &json!(1));
        store.set("details:planets_3", &json!(3));
        store.set("catalog:people", &json!([]));
        store.set("favorites", &json!([]));

        assert_eq!(
            store.keys_with_prefix("details:"),
            vec!["details:people_1".to_string(), "details:planets_3".to_string()]
        );
    }

    #[test]
    fn test_keys_with_prefix_on_missing_directory_is_empty() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.keys_with_prefix("").is_empty());
    }

    #[test]
    fn test_remove_deletes_key() {
        let (store, _temp_dir) = create_test_store();
        store.set("catalog:vehicles", &json!([]));

        store.remove("catalog:vehicles");
        store.remove("catalog:vehicles");

        assert!(store.get("catalog:vehicles").is_none());
    }

    #[test]
    fn test_key_encoding_is_reversible() {
        let (store, _temp_dir) = create_test_store();
        for key in ["favorites", "catalog:people", "details:people_1", "a b/c%d"] {
            store.set(key, &json!(key));
        }

        for key in ["favorites", "catalog:people", "details:people_1", "a b/c%d"] {
            assert_eq!(store.get(key), Some(json!(key)));
        }
        assert_eq!(store.keys_with_prefix("a b"), vec!["a b/c%d".to_string()]);
    }

    #[test]
    fn test_foreign_files_are_not_listed() {
        let (store, _temp_dir) = create_test_store();
        store.set("favorites", &json!([]));
        fs::write(store.dir().join("notes.txt"), "hello").unwrap();

        assert_eq!(store.keys_with_prefix(""), vec!["favorites".to_string()]);
    }
}
