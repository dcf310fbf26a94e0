//! Application state management for holocron
//!
//! This module contains the main application state, handling keyboard input,
//! applying catalog and detail results, and state transitions between views.

use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cache::TimestampedCache;
use crate::cli::AppConfig;
use crate::data::{
    detail_key, Catalog, CatalogEvent, CatalogHandle, CatalogItem, CatalogLoader, CategoryKind,
    DetailRecord, DetailResolver, FavoriteEntry, Favorites, FetchError, RetryingFetcher,
};
use crate::storage::KeyValueStore;

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// The three category sections
    Home,
    /// Full record for one item
    Details { category: CategoryKind, uid: String },
}

/// What is known about one item's detail record
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    /// A request is queued or in flight
    Loading,
    /// The record resolved
    Ready(DetailRecord),
    /// The request failed after all attempts
    Unavailable(FetchError),
}

/// Result of a background detail request
#[derive(Debug)]
struct DetailOutcome {
    category: CategoryKind,
    uid: String,
    result: Result<DetailRecord, FetchError>,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Category listings and load status
    pub catalog: Catalog,
    /// The user's favorites
    pub favorites: Favorites,
    /// Category section that receives navigation keys on the home view
    pub focused: CategoryKind,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a catalog reload has been requested
    pub reload_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag to show the favorites overlay
    pub show_favorites: bool,
    /// Selected row in the favorites overlay
    pub favorites_cursor: usize,
    /// Selected index per category, indexed by `CategoryKind::index`
    selected: [usize; 3],
    /// Detail views keyed by `{category}_{id}`
    details: HashMap<String, DetailView>,
    /// Requests waiting to be spawned by [`poll`](Self::poll)
    pending: Vec<(CategoryKind, String)>,
    /// Running detail tasks keyed by `{category}_{id}`
    in_flight: HashMap<String, JoinHandle<()>>,
    loader: CatalogLoader,
    resolver: DetailResolver,
    catalog_handle: Option<CatalogHandle>,
    outcome_tx: mpsc::UnboundedSender<DetailOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<DetailOutcome>,
}

impl App {
    /// Creates an App from explicit services
    pub fn with_services(loader: CatalogLoader, resolver: DetailResolver, favorites: Favorites) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::Home,
            catalog: Catalog::new(),
            favorites,
            focused: CategoryKind::People,
            should_quit: false,
            reload_requested: false,
            show_help: false,
            show_favorites: false,
            favorites_cursor: 0,
            selected: [0; 3],
            details: HashMap::new(),
            pending: Vec::new(),
            in_flight: HashMap::new(),
            loader,
            resolver,
            catalog_handle: None,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Builds the store, fetcher, caches, and favorites described by `config`
    ///
    /// Persisted detail records that are still valid are restored into memory.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let store: Arc<dyn KeyValueStore> = config.open_store();
        let cache = TimestampedCache::new(store.clone());

        if config.clear_cache {
            cache.clear_prefix("catalog:");
            cache.clear_prefix("details:");
        }

        let fetcher = RetryingFetcher::new(config.api_base.clone(), config.retry)?;
        let loader = CatalogLoader::new(fetcher.clone(), cache.clone());
        let resolver = DetailResolver::new(fetcher, cache);
        resolver.restore_persisted();
        let favorites = Favorites::load(store);

        Ok(Self::with_services(loader, resolver, favorites))
    }

    /// Starts the initial catalog load
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_loading(&mut self) {
        self.catalog.begin_load();
        self.catalog_handle = Some(self.loader.spawn());
    }

    /// Applies finished background work and dispatches queued requests
    ///
    /// Called once per event-loop tick from within a tokio runtime.
    pub fn poll(&mut self) {
        if self.reload_requested {
            self.reload_requested = false;
            if !self.catalog.loading {
                tracing::info!("reloading catalog");
                self.catalog.begin_load();
                self.catalog_handle = Some(self.loader.spawn_reload());
            }
        }

        self.drain_catalog_events();
        self.drain_detail_outcomes();

        if self.state == AppState::Home {
            self.request_selected();
        }
        self.dispatch_pending();
    }

    fn drain_catalog_events(&mut self) {
        let Some(handle) = self.catalog_handle.as_mut() else {
            return;
        };

        let mut settled = false;
        while let Some(event) = handle.try_recv() {
            settled |= event == CatalogEvent::Settled;
            self.catalog.apply(event);
        }

        if settled {
            self.catalog_handle = None;
            self.clamp_selection();
        }
    }

    fn drain_detail_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            let key = detail_key(outcome.category, &outcome.uid);
            self.in_flight.remove(&key);
            let view = match outcome.result {
                Ok(record) => DetailView::Ready(record),
                Err(error) => {
                    tracing::warn!(key = %key, %error, "details unavailable");
                    DetailView::Unavailable(error)
                }
            };
            self.details.insert(key, view);
        }
    }

    fn dispatch_pending(&mut self) {
        for (category, uid) in std::mem::take(&mut self.pending) {
            let key = detail_key(category, &uid);
            if self.in_flight.contains_key(&key) {
                continue;
            }

            let resolver = self.resolver.clone();
            let tx = self.outcome_tx.clone();
            let handle = tokio::spawn(async move {
                let result = resolver.get_details(category, &uid).await;
                let _ = tx.send(DetailOutcome {
                    category,
                    uid,
                    result,
                });
            });
            self.in_flight.insert(key, handle);
        }
    }

    /// Queues a detail request unless one is already known or running
    ///
    /// With `retry`, a previous failure is discarded and requested again.
    pub fn request_details(&mut self, category: CategoryKind, uid: &str, retry: bool) {
        let key = detail_key(category, uid);
        if self.in_flight.contains_key(&key)
            || self.pending.iter().any(|(c, u)| *c == category && u == uid)
        {
            return;
        }

        match self.details.get(&key) {
            Some(DetailView::Ready(_)) | Some(DetailView::Loading) => return,
            Some(DetailView::Unavailable(_)) if !retry => return,
            _ => {}
        }

        if let Some(record) = self.resolver.cached(category, uid) {
            self.details.insert(key, DetailView::Ready(record));
            return;
        }

        self.details.insert(key, DetailView::Loading);
        self.pending.push((category, uid.to_string()));
    }

    fn request_selected(&mut self) {
        if let Some(item) = self.selected_item() {
            let uid = item.uid.clone();
            self.request_details(self.focused, &uid, false);
        }
    }

    /// Requests queued but not yet spawned
    pub fn pending_requests(&self) -> &[(CategoryKind, String)] {
        &self.pending
    }

    /// Number of detail tasks currently running
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// What is known about an item's details
    pub fn detail_view(&self, category: CategoryKind, uid: &str) -> Option<&DetailView> {
        self.details.get(&detail_key(category, uid))
    }

    /// Selected index within a category
    pub fn selected_index(&self, category: CategoryKind) -> usize {
        self.selected[category.index()]
    }

    /// The selected item of the focused category, if any
    pub fn selected_item(&self) -> Option<&CatalogItem> {
        self.catalog
            .items(self.focused)
            .get(self.selected[self.focused.index()])
    }

    /// Finds a listed item by category and uid
    pub fn find_item(&self, category: CategoryKind, uid: &str) -> Option<&CatalogItem> {
        self.catalog.items(category).iter().find(|item| item.uid == uid)
    }

    /// Display name of an item, from its listing entry or resolved record
    pub fn item_name(&self, category: CategoryKind, uid: &str) -> Option<String> {
        if let Some(item) = self.find_item(category, uid) {
            return Some(item.name.clone());
        }
        match self.detail_view(category, uid) {
            Some(DetailView::Ready(record)) => record.name().map(str::to_string),
            _ => None,
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application (`Esc` also quits from the home view)
    /// - `Left`/`h`, `Right`/`l`, `Tab`: Move focus between category sections
    /// - `Up`/`k`, `Down`/`j`: Move selection within the focused section
    /// - `Enter`: Open details for the selected item
    /// - `f`: Toggle favorite for the selected or displayed item
    /// - `v`: Show the favorites overlay
    /// - `r`: Reload the catalog (home) or retry details (details view)
    /// - `?`: Show help
    /// - `Esc`/`Backspace` (in Details): Go back to the home view
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        if self.show_favorites {
            self.handle_favorites_key(key_event);
            return;
        }

        match self.state.clone() {
            AppState::Home => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                    self.focused = self.focused.previous();
                }
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                    self.focused = self.focused.next();
                }
                KeyCode::Enter => {
                    if let Some(item) = self.selected_item() {
                        let uid = item.uid.clone();
                        self.open_details(self.focused, uid);
                    }
                }
                KeyCode::Char('f') => {
                    if let Some(item) = self.selected_item() {
                        let entry = FavoriteEntry::from_item(item, self.focused);
                        self.favorites.toggle(entry);
                    }
                }
                KeyCode::Char('r') => {
                    self.reload_requested = true;
                }
                KeyCode::Char('v') => {
                    self.open_favorites();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::Details { category, uid } => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc | KeyCode::Backspace => {
                    self.state = AppState::Home;
                }
                KeyCode::Char('f') => {
                    let name = self.item_name(category, &uid).unwrap_or_else(|| uid.clone());
                    self.favorites.toggle(FavoriteEntry {
                        uid: uid.clone(),
                        name,
                        category,
                    });
                }
                KeyCode::Char('r') => {
                    self.request_details(category, &uid, true);
                }
                KeyCode::Char('v') => {
                    self.open_favorites();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    fn handle_favorites_key(&mut self, key_event: KeyEvent) {
        let count = self.favorites.len();
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('v') | KeyCode::Char('q') => {
                self.show_favorites = false;
            }
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.favorites_cursor = (self.favorites_cursor + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.favorites_cursor = (self.favorites_cursor + 1) % count;
            }
            KeyCode::Enter => {
                if let Some(entry) = self.favorites.list().get(self.favorites_cursor).cloned() {
                    self.show_favorites = false;
                    self.open_details(entry.category, entry.uid);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(entry) = self.favorites.list().get(self.favorites_cursor).cloned() {
                    self.favorites.toggle(entry);
                    self.favorites_cursor = self
                        .favorites_cursor
                        .min(self.favorites.len().saturating_sub(1));
                }
            }
            _ => {}
        }
    }

    fn open_favorites(&mut self) {
        self.show_favorites = true;
        self.favorites_cursor = 0;
    }

    /// Switches to the details view and requests the record
    pub fn open_details(&mut self, category: CategoryKind, uid: String) {
        self.request_details(category, &uid, true);
        self.state = AppState::Details { category, uid };
    }

    /// Moves the selection up in the focused section, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.catalog.items(self.focused).len();
        if count == 0 {
            return;
        }
        let index = &mut self.selected[self.focused.index()];
        *index = if *index == 0 { count - 1 } else { *index - 1 };
    }

    /// Moves the selection down in the focused section, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.catalog.items(self.focused).len();
        if count == 0 {
            return;
        }
        let index = &mut self.selected[self.focused.index()];
        *index = (*index + 1) % count;
    }

    /// Keeps every selection inside its (possibly shorter) reloaded listing
    fn clamp_selection(&mut self) {
        for category in CategoryKind::ALL {
            let count = self.catalog.items(category).len();
            let index = &mut self.selected[category.index()];
            *index = (*index).min(count.saturating_sub(1));
        }
    }

    #[cfg(test)]
    pub(crate) fn set_detail_view_for_test(&mut self, category: CategoryKind, uid: &str, view: DetailView) {
        self.details.insert(detail_key(category, uid), view);
    }

    /// Aborts running detail tasks
    pub fn shutdown(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
    }
}
