#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use pokedex_domain::{
    CatalogConfig, CatalogState, Entry, EntryId, EntryLookup, EntryStub, ListPage, LoadStatus,
    PersistedState,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::error::{GatewayError, StorageError, StoreError};
use crate::ports::{CatalogGateway, Clock, StatePersistence};

/// In-memory stand-in for the remote catalog.
#[derive(Default)]
struct MockGateway {
    entries: BTreeMap<u32, Entry>,
    failing_ids: HashSet<u32>,
    delays_ms: BTreeMap<u32, u64>,
    list_fails: AtomicBool,
    detail_calls: AtomicUsize,
}

impl MockGateway {
    fn with_entries(count: u32) -> Self {
        let entries = (1..=count)
            .map(|id| (id, Entry::new(id, format!("entry-{id}")).with_type("normal")))
            .collect();
        Self {
            entries,
            ..Self::default()
        }
    }

    fn with_named(entries: &[(u32, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(id, name)| (*id, Entry::new(*id, *name)))
                .collect(),
            ..Self::default()
        }
    }

    fn failing(mut self, id: u32) -> Self {
        self.failing_ids.insert(id);
        self
    }

    fn delayed(mut self, id: u32, ms: u64) -> Self {
        self.delays_ms.insert(id, ms);
        self
    }
}

impl CatalogGateway for MockGateway {
    async fn list_page(&self, limit: u32, offset: u32) -> Result<ListPage, GatewayError> {
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(GatewayError::Network("connection refused".to_string()));
        }
        let results: Vec<EntryStub> = self
            .entries
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|e| EntryStub::new(&e.name, format!("https://catalog.test/pokemon/{}/", e.id)))
            .collect();
        let next = (offset as usize + results.len() < self.entries.len())
            .then(|| format!("https://catalog.test/pokemon?offset={}", offset + limit));
        Ok(ListPage { results, next })
    }

    async fn get_detail(&self, lookup: &EntryLookup) -> Result<Entry, GatewayError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let found = match lookup {
            EntryLookup::Id(id) => self.entries.get(&id.get()).cloned(),
            EntryLookup::Name(name) => self.entries.values().find(|e| &e.name == name).cloned(),
        };
        let Some(entry) = found else {
            return Err(GatewayError::NotFound(lookup.to_string()));
        };
        if let Some(ms) = self.delays_ms.get(&entry.id.get()) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        if self.failing_ids.contains(&entry.id.get()) {
            return Err(GatewayError::Network("HTTP 500".to_string()));
        }
        Ok(entry)
    }

    async fn get_random_detail(&self) -> Result<Entry, GatewayError> {
        self.entries
            .values()
            .next()
            .cloned()
            .ok_or_else(|| GatewayError::NotFound("empty catalog".to_string()))
    }
}

/// Records every write; optionally fails them.
#[derive(Default)]
struct MockPersistence {
    stored: Option<PersistedState>,
    writes: Mutex<Vec<PersistedState>>,
    fail_writes: AtomicBool,
}

impl MockPersistence {
    fn with_stored(stored: PersistedState) -> Self {
        Self {
            stored: Some(stored),
            ..Self::default()
        }
    }

    fn last_write(&self) -> Option<PersistedState> {
        self.writes.lock().last().cloned()
    }

    fn write_count(&self) -> usize {
        self.writes.lock().len()
    }
}

impl StatePersistence for MockPersistence {
    async fn write_state(&self, state: &PersistedState) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("disk full".to_string()));
        }
        self.writes.lock().push(state.clone());
        Ok(())
    }

    async fn read_state(&self) -> Option<PersistedState> {
        self.stored.clone()
    }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

type TestStore = CatalogStore<MockGateway, MockPersistence, FixedClock>;

fn store_with(gateway: MockGateway, persistence: MockPersistence) -> TestStore {
    CatalogStore::new(
        Arc::new(gateway),
        Arc::new(persistence),
        Arc::new(FixedClock(fixed_time())),
        &CatalogConfig::default(),
    )
}

fn store(gateway: MockGateway) -> TestStore {
    store_with(gateway, MockPersistence::default())
}

fn page_ids(store: &TestStore) -> Vec<u32> {
    store.catalog_page().iter().map(|e| e.id.get()).collect()
}

fn pikachu() -> Entry {
    Entry::new(25, "pikachu").with_type("electric")
}

#[tokio::test]
async fn capture_then_release() {
    let store = store(MockGateway::default());

    assert!(store.capture(pikachu()).await.unwrap());
    assert!(store.is_captured(EntryId(25)));
    assert_eq!(store.captured()[0].captured_at, fixed_time());

    assert!(store.release(EntryId(25)).await.unwrap());
    assert!(!store.is_captured(EntryId(25)));
}

#[tokio::test]
async fn capture_twice_is_a_no_op() {
    let store = store(MockGateway::default());

    assert!(store.capture(pikachu()).await.unwrap());
    assert!(!store.capture(pikachu()).await.unwrap());
    assert_eq!(store.captured().len(), 1);
    assert_eq!(store.persistence.write_count(), 1);
}

#[tokio::test]
async fn release_of_unknown_id_reports_false() {
    let store = store(MockGateway::default());
    assert!(!store.release(EntryId(99)).await.unwrap());
    assert_eq!(store.persistence.write_count(), 0);
}

#[tokio::test]
async fn capture_persists_full_pair() {
    let store = store(MockGateway::default());
    store.toggle_favorite(EntryId(4));
    store.settle().await;

    store.capture(pikachu()).await.unwrap();

    let written = store.persistence.last_write().unwrap();
    assert_eq!(written.favorites, vec![EntryId(4)]);
    assert_eq!(written.captured.len(), 1);
    assert_eq!(written.captured[0].id(), EntryId(25));
}

#[tokio::test]
async fn failed_persist_keeps_in_memory_capture() {
    let persistence = MockPersistence::default();
    persistence.fail_writes.store(true, Ordering::SeqCst);
    let store = store_with(MockGateway::default(), persistence);

    let result = store.capture(pikachu()).await;
    assert!(matches!(result, Err(StoreError::Storage(_))));
    assert!(store.is_captured(EntryId(25)));

    let result = store.release(EntryId(25)).await;
    assert!(matches!(result, Err(StoreError::Storage(_))));
    assert!(!store.is_captured(EntryId(25)));
}

#[tokio::test]
async fn toggle_favorite_flips_and_persists() {
    let store = store(MockGateway::default());

    assert!(store.toggle_favorite(EntryId(7)));
    assert!(store.is_favorite(EntryId(7)));
    store.settle().await;
    assert_eq!(store.persistence.last_write().unwrap().favorites, vec![EntryId(7)]);

    assert!(!store.toggle_favorite(EntryId(7)));
    assert!(!store.is_favorite(EntryId(7)));
    store.settle().await;
    assert!(store.persistence.last_write().unwrap().favorites.is_empty());
}

#[tokio::test]
async fn favorite_write_failure_is_not_surfaced() {
    let persistence = MockPersistence::default();
    persistence.fail_writes.store(true, Ordering::SeqCst);
    let store = store_with(MockGateway::default(), persistence);

    assert!(store.toggle_favorite(EntryId(1)));
    store.settle().await;
    assert!(store.is_favorite(EntryId(1)));
}

#[test]
fn toggle_favorite_without_runtime_still_updates_memory() {
    let store = store(MockGateway::default());
    assert!(store.toggle_favorite(EntryId(3)));
    assert!(store.is_favorite(EntryId(3)));
}

#[tokio::test]
async fn load_page_fills_catalog() {
    let store = store(MockGateway::with_entries(40));

    let loaded = store.load_page(20, 0).await.unwrap();

    assert_eq!(loaded.requested, 20);
    assert_eq!(loaded.loaded, 20);
    assert!(loaded.has_more());
    assert_eq!(store.catalog_page().len(), 20);
    assert_eq!(store.load_status(), LoadStatus::Idle);
}

#[tokio::test]
async fn load_page_at_zero_replaces_and_later_offsets_append() {
    let store = store(MockGateway::with_entries(30));

    store.load_page(10, 0).await.unwrap();
    store.load_page(10, 10).await.unwrap();
    assert_eq!(page_ids(&store), (1..=20).collect::<Vec<_>>());

    store.load_page(5, 0).await.unwrap();
    assert_eq!(page_ids(&store), (1..=5).collect::<Vec<_>>());
}

#[tokio::test]
async fn append_does_not_deduplicate_repeated_offsets() {
    let store = store(MockGateway::with_entries(10));

    store.load_page(5, 0).await.unwrap();
    store.load_page(5, 3).await.unwrap();

    assert_eq!(page_ids(&store), vec![1, 2, 3, 4, 5, 4, 5, 6, 7, 8]);
}

#[tokio::test]
async fn failing_detail_shrinks_page_without_error() {
    let store = store(MockGateway::with_entries(5).failing(3));

    let loaded = store.load_page(5, 0).await.unwrap();

    assert_eq!(loaded.requested, 5);
    assert_eq!(loaded.loaded, 4);
    assert_eq!(page_ids(&store), vec![1, 2, 4, 5]);
    assert_eq!(store.load_status(), LoadStatus::Idle);
}

#[tokio::test]
async fn page_order_follows_stubs_not_completion() {
    let gateway = MockGateway::with_entries(4)
        .delayed(1, 40)
        .delayed(2, 30)
        .delayed(3, 20)
        .delayed(4, 10);
    let store = store(gateway);

    store.load_page(4, 0).await.unwrap();

    assert_eq!(page_ids(&store), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn list_failure_sets_error_status() {
    let gateway = MockGateway::with_entries(5);
    gateway.list_fails.store(true, Ordering::SeqCst);
    let store = store(gateway);

    let result = store.load_page(20, 0).await;

    assert!(matches!(result, Err(StoreError::Gateway(GatewayError::Network(_)))));
    let status = store.load_status();
    assert!(status.is_error());
    assert!(status.error_message().unwrap().contains("connection refused"));

    store.clear_error();
    assert_eq!(store.load_status(), LoadStatus::Idle);
}

#[tokio::test]
async fn load_page_clears_previous_error() {
    let gateway = MockGateway::with_entries(3);
    gateway.list_fails.store(true, Ordering::SeqCst);
    let store = store(gateway);
    let _ = store.load_page(3, 0).await;
    assert!(store.load_status().is_error());

    store.gateway.list_fails.store(false, Ordering::SeqCst);
    store.load_page(3, 0).await.unwrap();
    assert_eq!(store.load_status(), LoadStatus::Idle);
}

#[tokio::test]
async fn clear_error_is_a_no_op_when_not_in_error() {
    let store = store(MockGateway::default());
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    let _subscription = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.clear_error();

    assert_eq!(store.load_status(), LoadStatus::Idle);
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_filters_current_page_locally() {
    let gateway = MockGateway::with_named(&[
        (1, "bulbasaur"),
        (25, "pikachu"),
        (26, "raichu"),
        (172, "pichu"),
    ]);
    let store = store(gateway);
    store.load_page(10, 0).await.unwrap();
    let calls_before = store.gateway.detail_calls.load(Ordering::SeqCst);

    let outcome = store.search_by_query("CHU").await.unwrap();

    assert_eq!(outcome, SearchOutcome::LocalMatches(3));
    assert_eq!(page_ids(&store), vec![25, 26, 172]);
    assert_eq!(store.search_query(), "CHU");
    assert_eq!(store.gateway.detail_calls.load(Ordering::SeqCst), calls_before);
}

#[tokio::test]
async fn search_falls_back_to_remote_lookup() {
    let store = store(MockGateway::with_named(&[(25, "pikachu")]));

    let outcome = store.search_by_query("Pikachu").await.unwrap();

    assert_eq!(outcome, SearchOutcome::RemoteMatch(EntryId(25)));
    assert_eq!(store.catalog_page(), vec![Entry::new(25, "pikachu")]);
    assert_eq!(store.load_status(), LoadStatus::Idle);
}

#[tokio::test]
async fn search_without_any_match_empties_page_and_stays_idle() {
    let store = store(MockGateway::with_entries(3));
    store.load_page(3, 0).await.unwrap();

    let outcome = store.search_by_query("nonexistent-name").await.unwrap();

    assert_eq!(outcome, SearchOutcome::NoMatch);
    assert!(store.catalog_page().is_empty());
    assert_eq!(store.load_status(), LoadStatus::Idle);
    assert_eq!(store.search_query(), "nonexistent-name");
}

#[tokio::test]
async fn remote_search_network_failure_is_not_an_error_status() {
    let store = store(MockGateway::with_named(&[(25, "pikachu")]).failing(25));

    let outcome = store.search_by_query("pikachu").await.unwrap();

    assert_eq!(outcome, SearchOutcome::NoMatch);
    assert!(store.catalog_page().is_empty());
    assert_eq!(store.load_status(), LoadStatus::Idle);
}

#[tokio::test]
async fn blank_search_returns_to_browse_mode() {
    let store = store(MockGateway::with_entries(30));
    store.load_page(20, 0).await.unwrap();
    store.search_by_query("entry-1").await.unwrap();
    assert!(store.snapshot().is_searching());

    let outcome = store.search_by_query("   ").await.unwrap();

    assert!(matches!(outcome, SearchOutcome::Browse(_)));
    assert_eq!(store.search_query(), "");
    assert_eq!(page_ids(&store), (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn search_then_reset_matches_plain_first_page_load() {
    let searched = store(MockGateway::with_entries(30));
    searched.search_by_query("x").await.unwrap();
    searched.reset_search().await.unwrap();

    let plain = store(MockGateway::with_entries(30));
    plain.load_page(plain.default_page_limit(), 0).await.unwrap();

    assert_eq!(searched.catalog_page(), plain.catalog_page());
    assert_eq!(searched.search_query(), plain.search_query());
    assert_eq!(searched.load_status(), plain.load_status());
}

#[tokio::test]
async fn initialize_loads_page_and_hydrates() {
    let persisted = PersistedState {
        captured: vec![pokedex_domain::CapturedEntry::new(pikachu(), fixed_time())],
        favorites: vec![EntryId(1)],
    };
    let store = store_with(
        MockGateway::with_entries(25),
        MockPersistence::with_stored(persisted),
    );

    store.initialize().await;

    assert_eq!(store.catalog_page().len(), 20);
    assert!(store.is_captured(EntryId(25)));
    assert!(store.is_favorite(EntryId(1)));
    assert_eq!(store.load_status(), LoadStatus::Idle);
}

#[tokio::test]
async fn initialize_swallows_failures() {
    let gateway = MockGateway::with_entries(5);
    gateway.list_fails.store(true, Ordering::SeqCst);
    let store = store(gateway);

    store.initialize().await;

    assert!(store.catalog_page().is_empty());
    assert!(store.captured().is_empty());
    assert!(store.favorites().is_empty());
    assert!(store.load_status().is_error());
}

/// Single-slot storage whose reads return the value seen when the read began.
struct SlowSlotPersistence {
    slot: Mutex<Option<PersistedState>>,
    read_delay: Duration,
}

impl StatePersistence for SlowSlotPersistence {
    async fn write_state(&self, state: &PersistedState) -> Result<(), StorageError> {
        *self.slot.lock() = Some(state.clone());
        Ok(())
    }

    async fn read_state(&self) -> Option<PersistedState> {
        let seen = self.slot.lock().clone();
        tokio::time::sleep(self.read_delay).await;
        seen
    }
}

#[tokio::test]
async fn actions_during_hydration_keep_stored_items() {
    let stored = PersistedState {
        captured: vec![pokedex_domain::CapturedEntry::new(
            Entry::new(1, "entry-1"),
            fixed_time(),
        )],
        favorites: vec![EntryId(1)],
    };
    let persistence = Arc::new(SlowSlotPersistence {
        slot: Mutex::new(Some(stored)),
        read_delay: Duration::from_millis(50),
    });
    let store = CatalogStore::new(
        Arc::new(MockGateway::with_entries(3)),
        Arc::clone(&persistence),
        Arc::new(FixedClock(fixed_time())),
        &CatalogConfig::default(),
    );

    tokio::join!(store.initialize(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.capture(pikachu()).await.unwrap();
        store.toggle_favorite(EntryId(7));
    });
    store.settle().await;

    let memory = store.snapshot().persisted();
    let disk = persistence.slot.lock().clone().unwrap();
    assert_eq!(
        memory.captured.iter().map(|c| c.id().get()).collect::<Vec<_>>(),
        vec![1, 25]
    );
    assert_eq!(memory.favorites, vec![EntryId(1), EntryId(7)]);
    assert_eq!(disk, memory);
}

#[tokio::test]
async fn hydration_without_concurrent_changes_does_not_write() {
    let persisted = PersistedState {
        captured: vec![pokedex_domain::CapturedEntry::new(pikachu(), fixed_time())],
        favorites: Vec::new(),
    };
    let store = store_with(
        MockGateway::with_entries(3),
        MockPersistence::with_stored(persisted),
    );

    store.initialize().await;

    assert_eq!(store.persistence.write_count(), 0);
}

#[tokio::test]
async fn subscribers_see_every_transition_until_unsubscribed() {
    let store = store(MockGateway::with_entries(3));
    let seen: Arc<Mutex<Vec<LoadStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = store.subscribe(move |state: &CatalogState| {
        sink.lock().push(state.load_status.clone());
    });
    assert_eq!(store.subscriber_count(), 1);

    store.load_page(3, 0).await.unwrap();
    assert_eq!(*seen.lock(), vec![LoadStatus::Loading, LoadStatus::Idle]);

    subscription.unsubscribe();
    store.load_page(3, 0).await.unwrap();
    assert_eq!(seen.lock().len(), 2);
    assert_eq!(store.subscriber_count(), 0);
}

#[tokio::test]
async fn subscriber_snapshot_reflects_capture() {
    let store = store(MockGateway::default());
    let captured_counts: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured_counts);
    let _subscription = store.subscribe(move |state: &CatalogState| {
        sink.lock().push(state.captured.len());
    });

    store.capture(pikachu()).await.unwrap();
    store.capture(pikachu()).await.unwrap();

    assert_eq!(*captured_counts.lock(), vec![1]);
}

#[tokio::test]
async fn collection_stats_follow_captures() {
    let store = store(MockGateway::default());
    store.capture(pikachu()).await.unwrap();
    store
        .capture(Entry::new(4, "charmander").with_type("fire"))
        .await
        .unwrap();

    let stats = store.collection_stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.types, vec!["electric", "fire"]);
    assert_eq!(stats.last_captured.unwrap().id(), EntryId(4));
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn captured_ids_stay_unique(ids in prop::collection::vec(1u32..8, 0..30)) {
        let store = store(MockGateway::default());
        block_on(async {
            for id in &ids {
                let _ = store.capture(Entry::new(*id, format!("entry-{id}"))).await;
            }
        });

        let captured: Vec<u32> = store.captured().iter().map(|c| c.id().get()).collect();
        let unique: HashSet<u32> = captured.iter().copied().collect();
        let expected: HashSet<u32> = ids.iter().copied().collect();
        prop_assert_eq!(captured.len(), unique.len());
        prop_assert_eq!(unique, expected);
    }

    #[test]
    fn favorite_toggle_twice_restores_membership(
        initial in prop::collection::vec(1u32..20, 0..10),
        id in 1u32..20,
    ) {
        let store = store(MockGateway::default());
        block_on(async {
            for existing in &initial {
                if !store.is_favorite(EntryId(*existing)) {
                    store.toggle_favorite(EntryId(*existing));
                }
            }
            let before = store.favorites();

            store.toggle_favorite(EntryId(id));
            store.toggle_favorite(EntryId(id));
            store.settle().await;

            let after = store.favorites();
            let before_set: HashSet<EntryId> = before.into_iter().collect();
            let after_set: HashSet<EntryId> = after.into_iter().collect();
            assert_eq!(before_set, after_set);
        });
    }
}
