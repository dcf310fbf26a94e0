//! Detail resolution with an in-memory cache and a persisted mirror

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{detail_key, CategoryKind, DetailRecord, FetchError, RetryingFetcher};
use crate::cache::TimestampedCache;

/// Prefix of persisted detail entries
const PERSISTED_PREFIX: &str = "details:";

/// Resolves full detail records, caching successes
///
/// Clones share the same in-memory cache.
#[derive(Debug, Clone)]
pub struct DetailResolver {
    fetcher: RetryingFetcher,
    cache: TimestampedCache,
    memory: Arc<Mutex<HashMap<String, DetailRecord>>>,
}

impl DetailResolver {
    pub fn new(fetcher: RetryingFetcher, cache: TimestampedCache) -> Self {
        Self {
            fetcher,
            cache,
            memory: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Loads still-valid persisted records into memory, returning how many were restored
    pub fn restore_persisted(&self) -> usize {
        let keys = self.cache.store().keys_with_prefix(PERSISTED_PREFIX);
        let mut restored = 0;

        for persisted_key in keys {
            let Some(key) = persisted_key.strip_prefix(PERSISTED_PREFIX) else {
                continue;
            };
            if let Some(record) = self.cache.get::<DetailRecord>(&persisted_key) {
                self.remember(key.to_string(), record);
                restored += 1;
            }
        }

        if restored > 0 {
            tracing::info!(restored, "restored persisted detail records");
        }
        restored
    }

    /// Returns the record from memory if present
    pub fn cached(&self, category: CategoryKind, uid: &str) -> Option<DetailRecord> {
        let key = detail_key(category, uid);
        let memory = self.memory.lock().ok()?;
        memory.get(&key).cloned()
    }

    /// Returns the full record for an item
    ///
    /// A memory hit never touches the network. On success the record is stored in
    /// memory and mirrored to the persistent cache; on failure nothing is written.
    pub async fn get_details(&self, category: CategoryKind, uid: &str) -> Result<DetailRecord, FetchError> {
        if let Some(record) = self.cached(category, uid) {
            tracing::debug!(%category, uid, "detail cache hit");
            return Ok(record);
        }

        let record = self.fetcher.fetch_detail(category, uid).await?;

        let key = detail_key(category, uid);
        self.cache.set(&format!("{}{}", PERSISTED_PREFIX, key), &record);
        self.remember(key, record.clone());

        Ok(record)
    }

    fn remember(&self, key: String, record: DetailRecord) {
        match self.memory.lock() {
            Ok(mut memory) => {
                memory.insert(key, record);
            }
            Err(_) => tracing::warn!(key = %key, "detail cache lock poisoned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{now_millis, VALIDITY_WINDOW_MILLIS};
    use crate::data::RetryPolicy;
    use crate::storage::{KeyValueStore, MemoryStore};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_resolver(server: &MockServer) -> (DetailResolver, Arc<MemoryStore>) {
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff_step: Duration::from_millis(10),
        };
        let fetcher = RetryingFetcher::new(server.uri(), policy).unwrap();
        let store = Arc::new(MemoryStore::new());
        let cache = TimestampedCache::new(store.clone());
        (DetailResolver::new(fetcher, cache), store)
    }

    fn luke_body() -> serde_json::Value {
        json!({
            "result": {
                "properties": {
                    "name": "Luke Skywalker",
                    "gender": "male",
                    "height": "172"
                }
            }
        })
    }

    #[tokio::test]
    async fn test_second_call_served_from_memory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(luke_body()))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/people/1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let (resolver, _store) = create_resolver(&server);

        let first = resolver.get_details(CategoryKind::People, "1").await.unwrap();
        let second = resolver.get_details(CategoryKind::People, "1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.name(), Some("Luke Skywalker"));
        assert_eq!(second.category, CategoryKind::People);
    }

    #[tokio::test]
    async fn test_success_mirrors_to_persistent_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(luke_body()))
            .mount(&server)
            .await;

        let (resolver, store) = create_resolver(&server);
        resolver.get_details(CategoryKind::People, "1").await.unwrap();

        let persisted = store.get("details:people_1").expect("mirror written");
        assert_eq!(persisted["value"]["properties"]["gender"], "male");
        assert!(persisted["writtenAtEpochMillis"].is_i64());
    }

    #[tokio::test]
    async fn test_not_found_exhausts_and_caches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/planets/99"))
            .respond_with(ResponseTemplate::new(404))
            .expect(3)
            .mount(&server)
            .await;

        let (resolver, store) = create_resolver(&server);
        let err = resolver
            .get_details(CategoryKind::Planets, "99")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { status: Some(404), .. }));
        assert!(resolver.cached(CategoryKind::Planets, "99").is_none());
        assert!(store.get("details:planets_99").is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_same_uid_in_other_category_is_distinct() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(luke_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/planets/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"properties": {"name": "Tatooine", "climate": "arid"}}
            })))
            .mount(&server)
            .await;

        let (resolver, _store) = create_resolver(&server);
        let person = resolver.get_details(CategoryKind::People, "1").await.unwrap();
        let planet = resolver.get_details(CategoryKind::Planets, "1").await.unwrap();

        assert_eq!(person.name(), Some("Luke Skywalker"));
        assert_eq!(planet.property("climate"), Some("arid"));
    }

    #[tokio::test]
    async fn test_clones_share_memory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(luke_body()))
            .expect(1)
            .mount(&server)
            .await;

        let (resolver, _store) = create_resolver(&server);
        let clone = resolver.clone();
        clone.get_details(CategoryKind::People, "1").await.unwrap();

        assert!(resolver.cached(CategoryKind::People, "1").is_some());
    }

    #[tokio::test]
    async fn test_restore_persisted_skips_expired_and_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let (resolver, store) = create_resolver(&server);
        let cache = TimestampedCache::new(store.clone());
        let record = DetailRecord::from_properties(
            "2",
            CategoryKind::Vehicles,
            json!({"name": "Sand Crawler"}).as_object().unwrap(),
        );
        cache.set("details:vehicles_2", &record);
        cache.set_at(
            "details:vehicles_3",
            &record,
            now_millis() - VALIDITY_WINDOW_MILLIS - 1,
        );
        store.insert_raw("details:vehicles_4", "{broken");

        assert_eq!(resolver.restore_persisted(), 1);

        let restored = resolver.get_details(CategoryKind::Vehicles, "2").await.unwrap();
        assert_eq!(restored.name(), Some("Sand Crawler"));
        assert!(resolver.cached(CategoryKind::Vehicles, "3").is_none());
        assert!(resolver.cached(CategoryKind::Vehicles, "4").is_none());
    }
}
