//! Catalog loading and the category read model
//!
//! [`CatalogLoader`] fetches the three category listings as independent tokio tasks
//! and reports each outcome over a channel, so the UI can show every section as
//! soon as its own data arrives. [`Catalog`] is the read model those events are
//! applied to.

use std::time::Duration;
use tokio::sync::mpsc;

use super::{CatalogItem, CategoryKind, FetchError, RetryingFetcher};
use crate::cache::TimestampedCache;

/// Message shown when any category fails to load
pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load data. The Force is not strong with this connection.";

/// Default delay between the first attempts of consecutive categories
const DEFAULT_STAGGER_STEP: Duration = Duration::from_millis(1000);

/// Outcome messages sent from the load tasks
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    /// A category's listing is available
    Loaded {
        category: CategoryKind,
        items: Vec<CatalogItem>,
        from_cache: bool,
    },
    /// A category exhausted its retries
    Failed {
        category: CategoryKind,
        error: FetchError,
    },
    /// All three categories have settled
    Settled,
}

/// Read model of the three category listings plus load status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub people: Vec<CatalogItem>,
    pub vehicles: Vec<CatalogItem>,
    pub planets: Vec<CatalogItem>,
    /// True from the start of a load until every category has settled
    pub loading: bool,
    /// User-facing message set when any category fails
    pub error: Option<String>,
    /// Categories whose load has not settled yet, indexed by `CategoryKind::index`
    pending: [bool; 3],
}

impl Catalog {
    /// Creates an empty catalog that is not loading
    pub fn new() -> Self {
        Self::default()
    }

    /// Items of one category
    pub fn items(&self, category: CategoryKind) -> &[CatalogItem] {
        match category {
            CategoryKind::People => &self.people,
            CategoryKind::Vehicles => &self.vehicles,
            CategoryKind::Planets => &self.planets,
        }
    }

    fn slot_mut(&mut self, category: CategoryKind) -> &mut Vec<CatalogItem> {
        match category {
            CategoryKind::People => &mut self.people,
            CategoryKind::Vehicles => &mut self.vehicles,
            CategoryKind::Planets => &mut self.planets,
        }
    }

    /// Whether a category is still waiting on its load
    pub fn is_pending(&self, category: CategoryKind) -> bool {
        self.pending[category.index()]
    }

    /// Marks the start of a load: everything pending, error cleared
    ///
    /// Slots keep their current items until replaced.
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
        self.pending = [true; 3];
    }

    /// Applies one load event
    pub fn apply(&mut self, event: CatalogEvent) {
        match event {
            CatalogEvent::Loaded {
                category, items, ..
            } => {
                *self.slot_mut(category) = items;
                self.pending[category.index()] = false;
            }
            CatalogEvent::Failed { category, .. } => {
                self.pending[category.index()] = false;
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
            CatalogEvent::Settled => {
                self.pending = [false; 3];
                self.loading = false;
            }
        }
    }
}

/// Receiving end of a running catalog load
pub struct CatalogHandle {
    receiver: mpsc::Receiver<CatalogEvent>,
}

impl CatalogHandle {
    /// Returns the next pending event without blocking
    pub fn try_recv(&mut self) -> Option<CatalogEvent> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next event; `None` once the load has finished and all
    /// events were consumed
    pub async fn recv(&mut self) -> Option<CatalogEvent> {
        self.receiver.recv().await
    }
}

/// Loads category listings through the timestamped cache and the fetcher
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    fetcher: RetryingFetcher,
    cache: TimestampedCache,
    stagger_step: Duration,
}

impl CatalogLoader {
    /// Creates a loader with the default 1000ms stagger step
    pub fn new(fetcher: RetryingFetcher, cache: TimestampedCache) -> Self {
        Self {
            fetcher,
            cache,
            stagger_step: DEFAULT_STAGGER_STEP,
        }
    }

    /// Overrides the stagger step
    pub fn with_stagger_step(mut self, stagger_step: Duration) -> Self {
        self.stagger_step = stagger_step;
        self
    }

    /// Delay before a category's first network attempt on the initial load
    ///
    /// People start immediately, vehicles one step later, planets two steps later.
    pub fn stagger_for(&self, category: CategoryKind) -> Duration {
        self.stagger_step * category.index() as u32
    }

    /// Loads one category
    ///
    /// A fresh cache entry is returned immediately without any delay or network
    /// access. Otherwise waits `delay`, fetches, and writes the result through to
    /// the cache.
    pub async fn load_category(&self, category: CategoryKind, delay: Duration) -> CatalogEvent {
        let key = category.catalog_key();

        if let Some(items) = self.cache.get::<Vec<CatalogItem>>(&key) {
            tracing::info!(%category, count = items.len(), "loaded category from cache");
            return CatalogEvent::Loaded {
                category,
                items,
                from_cache: true,
            };
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.fetcher.fetch_listing(category).await {
            Ok(items) => {
                tracing::info!(%category, count = items.len(), "loaded category from network");
                self.cache.set(&key, &items);
                CatalogEvent::Loaded {
                    category,
                    items,
                    from_cache: false,
                }
            }
            Err(error) => {
                tracing::warn!(%category, %error, "category load failed");
                CatalogEvent::Failed { category, error }
            }
        }
    }

    /// Starts the initial load with staggered first attempts
    pub fn spawn(&self) -> CatalogHandle {
        self.spawn_with(true)
    }

    /// Starts a reload; first attempts are not staggered
    pub fn spawn_reload(&self) -> CatalogHandle {
        self.spawn_with(false)
    }

    fn spawn_with(&self, staggered: bool) -> CatalogHandle {
        let (tx, rx) = mpsc::channel(8);

        let tasks: Vec<_> = CategoryKind::ALL
            .into_iter()
            .map(|category| {
                let loader = self.clone();
                let tx = tx.clone();
                let delay = if staggered {
                    self.stagger_for(category)
                } else {
                    Duration::ZERO
                };
                tokio::spawn(async move {
                    let event = loader.load_category(category, delay).await;
                    let _ = tx.send(event).await;
                })
            })
            .collect();

        tokio::spawn(async move {
            futures::future::join_all(tasks).await;
            let _ = tx.send(CatalogEvent::Settled).await;
        });

        CatalogHandle { receiver: rx }
    }

    /// Runs the initial load to completion, applying every event to `catalog`
    pub async fn load_all(&self, catalog: &mut Catalog) {
        catalog.begin_load();
        let mut handle = self.spawn();
        while let Some(event) = handle.recv().await {
            let settled = event == CatalogEvent::Settled;
            catalog.apply(event);
            if settled {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::now_millis;
    use crate::data::RetryPolicy;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Instant;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(uid: &str, name: &str) -> CatalogItem {
        CatalogItem {
            uid: uid.to_string(),
            name: name.to_string(),
            url: format!("https://www.swapi.tech/api/people/{}", uid),
        }
    }

    fn create_loader(server: &MockServer, stagger: Duration) -> (CatalogLoader, TimestampedCache) {
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff_step: Duration::from_millis(10),
        };
        let fetcher = RetryingFetcher::new(server.uri(), policy).unwrap();
        let cache = TimestampedCache::new(Arc::new(MemoryStore::new()));
        let loader = CatalogLoader::new(fetcher, cache.clone()).with_stagger_step(stagger);
        (loader, cache)
    }

    async fn mount_listing(server: &MockServer, segment: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", segment)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_new_catalog_is_empty_and_idle() {
        let catalog = Catalog::new();
        assert!(!catalog.loading);
        assert!(catalog.error.is_none());
        for category in CategoryKind::ALL {
            assert!(catalog.items(category).is_empty());
            assert!(!catalog.is_pending(category));
        }
    }

    #[test]
    fn test_apply_sequence_tracks_pending_and_loading() {
        let mut catalog = Catalog::new();
        catalog.begin_load();
        assert!(catalog.loading);
        assert!(catalog.is_pending(CategoryKind::Planets));

        catalog.apply(CatalogEvent::Loaded {
            category: CategoryKind::Planets,
            items: vec![item("1", "Tatooine")],
            from_cache: false,
        });
        assert!(!catalog.is_pending(CategoryKind::Planets));
        assert!(catalog.is_pending(CategoryKind::People));
        assert!(catalog.loading);

        catalog.apply(CatalogEvent::Settled);
        assert!(!catalog.loading);
        assert_eq!(catalog.planets.len(), 1);
    }

    #[test]
    fn test_failure_keeps_previous_slot_contents() {
        let mut catalog = Catalog::new();
        catalog.people = vec![item("1", "Luke Skywalker")];
        catalog.begin_load();

        catalog.apply(CatalogEvent::Failed {
            category: CategoryKind::People,
            error: FetchError::Transport {
                path: "people".to_string(),
                status: Some(429),
                reason: "HTTP 429".to_string(),
            },
        });

        assert_eq!(catalog.people.len(), 1);
        assert_eq!(catalog.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
    }

    #[test]
    fn test_begin_load_clears_previous_error() {
        let mut catalog = Catalog::new();
        catalog.error = Some(LOAD_FAILED_MESSAGE.to_string());
        catalog.begin_load();
        assert!(catalog.error.is_none());
    }

    #[tokio::test]
    async fn test_stagger_offsets() {
        let server = MockServer::start().await;
        let (loader, _cache) = create_loader(&server, Duration::from_millis(1000));
        assert_eq!(loader.stagger_for(CategoryKind::People), Duration::ZERO);
        assert_eq!(loader.stagger_for(CategoryKind::Vehicles), Duration::from_millis(1000));
        assert_eq!(loader.stagger_for(CategoryKind::Planets), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_partial_failure_populates_people_only() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            "people",
            json!({"results": [{"uid": "1", "name": "Luke Skywalker", "url": "u"}]}),
        )
        .await;
        for segment in ["vehicles", "planets"] {
            Mock::given(method("GET"))
                .and(path(format!("/{}", segment)))
                .respond_with(ResponseTemplate::new(503))
                .expect(3)
                .mount(&server)
                .await;
        }

        let (loader, _cache) = create_loader(&server, Duration::from_millis(10));
        let mut catalog = Catalog::new();
        loader.load_all(&mut catalog).await;

        assert_eq!(catalog.people.len(), 1);
        assert!(catalog.vehicles.is_empty());
        assert!(catalog.planets.is_empty());
        assert!(catalog.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(!catalog.loading);
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let (loader, cache) = create_loader(&server, Duration::from_secs(5));
        for category in CategoryKind::ALL {
            cache.set(&category.catalog_key(), &vec![item("1", category.title())]);
        }

        let started = Instant::now();
        let mut catalog = Catalog::new();
        loader.load_all(&mut catalog).await;

        // Cache hits are never staggered
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(catalog.people[0].name, "Characters");
        assert_eq!(catalog.vehicles[0].name, "Vehicles");
        assert_eq!(catalog.planets[0].name, "Planets");
        assert!(catalog.error.is_none());
    }

    #[tokio::test]
    async fn test_expired_cache_refetches_and_writes_through() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            "people",
            json!({"results": [{"uid": "4", "name": "Darth Vader", "url": "u"}]}),
        )
        .await;

        let (loader, cache) = create_loader(&server, Duration::ZERO);
        let two_days_ago = now_millis() - 2 * crate::cache::VALIDITY_WINDOW_MILLIS;
        cache.set_at(
            &CategoryKind::People.catalog_key(),
            &vec![item("1", "Stale")],
            two_days_ago,
        );

        let event = loader.load_category(CategoryKind::People, Duration::ZERO).await;

        match event {
            CatalogEvent::Loaded { items, from_cache, .. } => {
                assert!(!from_cache);
                assert_eq!(items[0].name, "Darth Vader");
            }
            other => panic!("Expected Loaded, got {:?}", other),
        }
        let cached: Vec<CatalogItem> = cache.get(&CategoryKind::People.catalog_key()).unwrap();
        assert_eq!(cached[0].name, "Darth Vader");
    }

    #[tokio::test]
    async fn test_failed_load_writes_nothing_to_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/planets"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (loader, cache) = create_loader(&server, Duration::ZERO);
        let event = loader.load_category(CategoryKind::Planets, Duration::ZERO).await;

        assert!(matches!(event, CatalogEvent::Failed { category: CategoryKind::Planets, .. }));
        assert!(cache
            .get::<Vec<CatalogItem>>(&CategoryKind::Planets.catalog_key())
            .is_none());
    }

    #[tokio::test]
    async fn test_staggered_categories_arrive_in_order() {
        let server = MockServer::start().await;
        for segment in ["people", "vehicles", "planets"] {
            mount_listing(
                &server,
                segment,
                json!({"results": [{"uid": "1", "name": segment, "url": "u"}]}),
            )
            .await;
        }

        let (loader, _cache) = create_loader(&server, Duration::from_millis(150));
        let mut handle = loader.spawn();

        let mut order = Vec::new();
        while let Some(event) = handle.recv().await {
            match event {
                CatalogEvent::Loaded { category, .. } => order.push(category),
                CatalogEvent::Settled => break,
                CatalogEvent::Failed { .. } => panic!("no category should fail"),
            }
        }

        assert_eq!(order, CategoryKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_settled_is_last_event() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (loader, _cache) = create_loader(&server, Duration::ZERO);
        let mut handle = loader.spawn_reload();

        let mut events = Vec::new();
        while let Some(event) = handle.recv().await {
            events.push(event);
        }

        assert_eq!(events.len(), 4);
        assert_eq!(events.last(), Some(&CatalogEvent::Settled));
    }
}
