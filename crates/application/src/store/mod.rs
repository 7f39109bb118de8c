//! Catalog store.
//!
//! The store owns the in-memory catalog state and is the only place it is
//! mutated. Actions call the gateway and persistence ports, apply their
//! results in the synchronous continuation after each suspension point, and
//! notify subscribers with a snapshot after every transition.
//!
//! Callers must serialize `load_page`/`search_by_query`/`reset_search`: the
//! store does not queue them, and a replace at offset 0 can race an append.

mod subscription;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use pokedex_domain::{
    CapturedEntry, CatalogConfig, CatalogState, CollectionStats, Entry, EntryId, EntryLookup,
    EntryStub, LoadStatus,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StoreResult};
use crate::ports::{CatalogGateway, Clock, StatePersistence};

pub use subscription::Subscription;
use subscription::SubscriberRegistry;

/// Summary of a completed page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    /// Number of stubs the list endpoint returned.
    pub requested: usize,
    /// Number of entries whose detail fetch succeeded.
    pub loaded: usize,
    /// Reference to the next page, if the remote has one.
    pub next: Option<String>,
}

impl LoadedPage {
    /// Returns true if the remote reports more pages.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// How a search was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query was blank; the first page was reloaded.
    Browse(LoadedPage),
    /// The in-memory page had this many matches.
    LocalMatches(usize),
    /// No local match; the remote resolved the query to this entry.
    RemoteMatch(EntryId),
    /// Nothing matched locally or remotely.
    NoMatch,
}

/// The stateful core of the catalog client.
///
/// Constructed once by the application's composition root and shared by
/// reference. Generic over its ports so tests can substitute them.
pub struct CatalogStore<G, P, C> {
    gateway: Arc<G>,
    persistence: Arc<P>,
    clock: Arc<C>,
    default_page_limit: u32,
    state: Arc<RwLock<CatalogState>>,
    subscribers: Arc<SubscriberRegistry>,
    write_gate: Arc<tokio::sync::Mutex<()>>,
    pending_writes: Mutex<Vec<JoinHandle<()>>>,
}

impl<G, P, C> CatalogStore<G, P, C>
where
    G: CatalogGateway,
    P: StatePersistence + 'static,
    C: Clock,
{
    /// Creates a store with empty collections and an idle status.
    pub fn new(gateway: Arc<G>, persistence: Arc<P>, clock: Arc<C>, config: &CatalogConfig) -> Self {
        Self {
            gateway,
            persistence,
            clock,
            default_page_limit: config.default_page_limit,
            state: Arc::new(RwLock::new(CatalogState::new())),
            subscribers: Arc::new(SubscriberRegistry::default()),
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
            pending_writes: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of the full current state.
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.state.read().clone()
    }

    /// Entries currently materialized from pagination or search.
    #[must_use]
    pub fn catalog_page(&self) -> Vec<Entry> {
        self.state.read().catalog_page.clone()
    }

    /// Captured entries in capture order.
    #[must_use]
    pub fn captured(&self) -> Vec<CapturedEntry> {
        self.state.read().captured.clone()
    }

    /// Favorite ids in insertion order.
    #[must_use]
    pub fn favorites(&self) -> Vec<EntryId> {
        self.state.read().favorites.clone()
    }

    /// Current load status.
    #[must_use]
    pub fn load_status(&self) -> LoadStatus {
        self.state.read().load_status.clone()
    }

    /// Current search filter; empty in browse mode.
    #[must_use]
    pub fn search_query(&self) -> String {
        self.state.read().search_query.clone()
    }

    /// Returns true if an entry with `id` is captured.
    #[must_use]
    pub fn is_captured(&self, id: EntryId) -> bool {
        self.state.read().is_captured(id)
    }

    /// Returns true if `id` is a favorite.
    #[must_use]
    pub fn is_favorite(&self, id: EntryId) -> bool {
        self.state.read().is_favorite(id)
    }

    /// Statistics over the captured collection.
    #[must_use]
    pub fn collection_stats(&self) -> CollectionStats {
        CollectionStats::from_captured(&self.state.read().captured)
    }

    /// Page size used by initialize, reset and blank searches.
    #[must_use]
    pub const fn default_page_limit(&self) -> u32 {
        self.default_page_limit
    }

    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Registers a listener called with a snapshot after every transition.
    ///
    /// Listeners run synchronously on the task that performed the
    /// transition, after the state lock is released.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CatalogState) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(Arc::new(listener))
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Loads one page and merges it into the catalog page.
    ///
    /// Offset 0 replaces the page; any other offset appends without
    /// de-duplication. Detail fetches run concurrently and an entry whose
    /// detail fails is dropped from the result.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the list call itself fails; the status is
    /// then `Error`.
    pub async fn load_page(&self, limit: u32, offset: u32) -> StoreResult<LoadedPage> {
        self.apply(|state| state.load_status = LoadStatus::Loading);

        let page = match self.gateway.list_page(limit, offset).await {
            Ok(page) => page,
            Err(err) => {
                warn!(limit, offset, error = %err, "failed to load catalog page");
                let message = err.to_string();
                self.apply(|state| state.load_status = LoadStatus::error(message));
                return Err(err.into());
            }
        };

        let entries = self.fetch_details(&page.results).await;
        let loaded = LoadedPage {
            requested: page.results.len(),
            loaded: entries.len(),
            next: page.next,
        };
        debug!(limit, offset, loaded = loaded.loaded, requested = loaded.requested, "page loaded");

        self.apply(|state| {
            if offset == 0 {
                state.catalog_page = entries;
            } else {
                state.catalog_page.extend(entries);
            }
            state.load_status = LoadStatus::Idle;
        });

        Ok(loaded)
    }

    /// Fetches details for `stubs` concurrently, keeping stub order.
    async fn fetch_details(&self, stubs: &[EntryStub]) -> Vec<Entry> {
        let fetches = stubs.iter().map(|stub| async move {
            match self.gateway.get_detail(&stub.lookup()).await {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(name = %stub.name, error = %err, "dropping entry from page");
                    None
                }
            }
        });
        join_all(fetches).await.into_iter().flatten().collect()
    }

    /// Filters the catalog by name.
    ///
    /// A blank query returns to browse mode and reloads the first page.
    /// Otherwise the in-memory page is filtered case-insensitively; if
    /// nothing matches, a single remote lookup by exact name is tried. A
    /// failed lookup leaves an empty page and an `Idle` status.
    ///
    /// # Errors
    ///
    /// Only a blank query can fail, with the error of the page reload.
    pub async fn search_by_query(&self, query: &str) -> StoreResult<SearchOutcome> {
        let needle = query.trim();
        if needle.is_empty() {
            self.apply(|state| state.search_query.clear());
            let page = self.load_page(self.default_page_limit, 0).await?;
            return Ok(SearchOutcome::Browse(page));
        }

        let lookup = EntryLookup::parse(needle)?;
        let local_matches = self.apply(|state| {
            state.search_query = query.to_string();
            let matches: Vec<Entry> = state
                .catalog_page
                .iter()
                .filter(|entry| entry.name_matches(needle))
                .cloned()
                .collect();
            let count = matches.len();
            if count > 0 {
                state.catalog_page = matches;
            } else {
                state.load_status = LoadStatus::Loading;
            }
            count
        });
        if local_matches > 0 {
            debug!(query = needle, matches = local_matches, "search resolved locally");
            return Ok(SearchOutcome::LocalMatches(local_matches));
        }

        match self.gateway.get_detail(&lookup).await {
            Ok(entry) => {
                let id = entry.id;
                debug!(query = needle, %id, "search resolved remotely");
                self.apply(|state| {
                    state.catalog_page = vec![entry];
                    state.load_status = LoadStatus::Idle;
                });
                Ok(SearchOutcome::RemoteMatch(id))
            }
            Err(err) => {
                if err.is_not_found() {
                    debug!(query = needle, "no entry matches search");
                } else {
                    warn!(query = needle, error = %err, "remote search lookup failed");
                }
                self.apply(|state| {
                    state.catalog_page.clear();
                    state.load_status = LoadStatus::Idle;
                });
                Ok(SearchOutcome::NoMatch)
            }
        }
    }

    /// Leaves search mode and reloads the first page.
    ///
    /// # Errors
    ///
    /// Returns the error of the page reload.
    pub async fn reset_search(&self) -> StoreResult<LoadedPage> {
        self.apply(|state| state.search_query.clear());
        self.load_page(self.default_page_limit, 0).await
    }

    /// Adds an entry to the captured collection and persists the pair.
    ///
    /// Returns `Ok(false)` without touching anything if the id is already
    /// captured; the original capture time is kept.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting fails. The entry stays
    /// captured in memory.
    pub async fn capture(&self, entry: Entry) -> StoreResult<bool> {
        let id = entry.id;
        let captured_at = self.clock.now();
        let inserted = self.apply_if(|state| {
            if state.is_captured(id) {
                return false;
            }
            state.captured.push(CapturedEntry::new(entry, captured_at));
            true
        });
        if !inserted {
            debug!(%id, "entry already captured");
            return Ok(false);
        }

        info!(%id, "entry captured");
        self.persist().await?;
        Ok(true)
    }

    /// Removes an entry from the captured collection and persists the pair.
    ///
    /// Returns `Ok(false)` if nothing with `id` was captured.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting fails. The entry stays
    /// released in memory.
    pub async fn release(&self, id: EntryId) -> StoreResult<bool> {
        let removed = self.apply_if(|state| {
            let before = state.captured.len();
            state.captured.retain(|captured| captured.id() != id);
            state.captured.len() != before
        });
        if !removed {
            debug!(%id, "release of entry that is not captured");
            return Ok(false);
        }

        info!(%id, "entry released");
        self.persist().await?;
        Ok(true)
    }

    /// Flips favorite membership of `id` and returns the new membership.
    ///
    /// Persistence runs in the background on the current tokio runtime;
    /// failures are logged, never returned. Use [`CatalogStore::settle`] to
    /// wait for it.
    pub fn toggle_favorite(&self, id: EntryId) -> bool {
        let is_favorite = self.apply(|state| {
            if let Some(position) = state.favorites.iter().position(|f| *f == id) {
                state.favorites.remove(position);
                false
            } else {
                state.favorites.push(id);
                true
            }
        });
        debug!(%id, is_favorite, "favorite toggled");
        self.persist_in_background();
        is_favorite
    }

    /// Loads the first page and hydrates persisted state concurrently.
    ///
    /// Never fails: errors from either side are logged and the store keeps
    /// whatever state it reached.
    pub async fn initialize(&self) {
        let (page, ()) = tokio::join!(self.load_page(self.default_page_limit, 0), self.hydrate());
        if let Err(err) = page {
            warn!(error = %err, "initial page load failed");
        }
    }

    /// Merges persisted state into memory.
    ///
    /// Holds the write gate for the whole read-merge-write cycle, so writes
    /// from actions that land meanwhile queue behind it and carry the merged
    /// pair. If memory already held items the stored pair lacks, the merged
    /// pair is written back.
    async fn hydrate(&self) {
        let _guard = self.write_gate.lock().await;
        let Some(persisted) = self.persistence.read_state().await else {
            debug!("no persisted state, starting empty");
            return;
        };
        info!(
            captured = persisted.captured.len(),
            favorites = persisted.favorites.len(),
            "restored persisted state"
        );

        let merged = self.apply(|state| {
            state.hydrate(persisted.clone());
            state.persisted()
        });
        if merged == persisted {
            return;
        }

        debug!(
            captured = merged.captured.len(),
            favorites = merged.favorites.len(),
            "writing back state changed during hydration"
        );
        if let Err(err) = self.persistence.write_state(&merged).await {
            warn!(error = %err, "failed to write back hydrated state");
        }
    }

    /// Resets an `Error` status to `Idle`; no-op otherwise.
    pub fn clear_error(&self) {
        self.apply_if(|state| {
            if state.load_status.is_error() {
                state.load_status = LoadStatus::Idle;
                true
            } else {
                false
            }
        });
    }

    /// Waits for background favorite writes started so far.
    pub async fn settle(&self) {
        let pending = std::mem::take(&mut *self.pending_writes.lock());
        for handle in pending {
            if let Err(err) = handle.await {
                warn!(error = %err, "background state write did not complete");
            }
        }
    }

    /// Applies a transition and notifies subscribers.
    fn apply<R>(&self, transition: impl FnOnce(&mut CatalogState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.state.write();
            let result = transition(&mut state);
            (result, state.clone())
        };
        self.subscribers.notify(&snapshot);
        result
    }

    /// Applies a transition that may be a no-op; notifies only on change.
    fn apply_if(&self, transition: impl FnOnce(&mut CatalogState) -> bool) -> bool {
        let snapshot = {
            let mut state = self.state.write();
            if !transition(&mut state) {
                return false;
            }
            state.clone()
        };
        self.subscribers.notify(&snapshot);
        true
    }

    async fn persist(&self) -> Result<(), StorageError> {
        persist_latest(&*self.persistence, &self.state, &self.write_gate)
            .await
            .inspect_err(|err| warn!(error = %err, "failed to persist catalog state"))
    }

    fn persist_in_background(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime available, favorite change not persisted");
            return;
        };

        let persistence = Arc::clone(&self.persistence);
        let state = Arc::clone(&self.state);
        let gate = Arc::clone(&self.write_gate);
        let handle = runtime.spawn(async move {
            if let Err(err) = persist_latest(&*persistence, &state, &gate).await {
                warn!(error = %err, "failed to persist favorites");
            }
        });

        let mut pending = self.pending_writes.lock();
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }
}

/// Writes the current captured/favorite pair.
///
/// The snapshot is taken after acquiring the write gate, so the last write
/// to land always carries the latest in-memory pair.
async fn persist_latest<P: StatePersistence>(
    persistence: &P,
    state: &RwLock<CatalogState>,
    gate: &tokio::sync::Mutex<()>,
) -> Result<(), StorageError> {
    let _guard = gate.lock().await;
    let persisted = state.read().persisted();
    persistence.write_state(&persisted).await
}
