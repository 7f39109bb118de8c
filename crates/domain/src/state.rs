//! Catalog state types.
//!
//! This module defines the in-memory state the catalog store exposes to
//! presentation layers, plus the persisted subset that survives restarts.

use serde::{Deserialize, Serialize};

use crate::captured::CapturedEntry;
use crate::entry::{Entry, EntryId};

/// Load status of the catalog page.
///
/// Exactly one is active at a time:
/// - `Idle`: nothing in flight
/// - `Loading`: a page load or remote search is in flight
/// - `Error`: the last page load failed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    /// Nothing in flight.
    #[default]
    Idle,

    /// A load is in progress.
    Loading,

    /// The last load failed.
    Error {
        /// Human-readable error message.
        message: String,
    },
}

impl LoadStatus {
    /// Creates an Error status.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns true if the status is Idle.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if a load is in progress.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if the last load failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns the error message if in Error state.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Full in-memory catalog state.
///
/// Only `captured` and `favorites` are persisted; everything else starts
/// empty on every process start.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogState {
    /// Entries currently materialized from pagination or search.
    pub catalog_page: Vec<Entry>,
    /// Captured entries in capture order. Ids are unique.
    pub captured: Vec<CapturedEntry>,
    /// Favorite ids in insertion order. Ids are unique.
    pub favorites: Vec<EntryId>,
    /// Current load status.
    pub load_status: LoadStatus,
    /// Current search filter; empty means browse mode.
    pub search_query: String,
}

impl CatalogState {
    /// Creates a fresh empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if an entry with `id` is captured.
    #[must_use]
    pub fn is_captured(&self, id: EntryId) -> bool {
        self.captured.iter().any(|c| c.id() == id)
    }

    /// Returns true if `id` is a favorite.
    #[must_use]
    pub fn is_favorite(&self, id: EntryId) -> bool {
        self.favorites.contains(&id)
    }

    /// Returns true while in search mode.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        !self.search_query.is_empty()
    }

    /// Projects the persisted subset out of the full state.
    #[must_use]
    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            captured: self.captured.clone(),
            favorites: self.favorites.clone(),
        }
    }

    /// Merges a persisted subset back into this state.
    ///
    /// Persisted items come first, followed by any in-memory items whose id
    /// was not persisted. Repeated ids are dropped so the uniqueness
    /// invariants hold even for hand-edited storage.
    pub fn hydrate(&mut self, persisted: PersistedState) {
        let in_memory_captured = std::mem::take(&mut self.captured);
        let mut captured: Vec<CapturedEntry> =
            Vec::with_capacity(persisted.captured.len() + in_memory_captured.len());
        for entry in persisted.captured.into_iter().chain(in_memory_captured) {
            if !captured.iter().any(|c| c.id() == entry.id()) {
                captured.push(entry);
            }
        }

        let in_memory_favorites = std::mem::take(&mut self.favorites);
        let mut favorites: Vec<EntryId> =
            Vec::with_capacity(persisted.favorites.len() + in_memory_favorites.len());
        for id in persisted.favorites.into_iter().chain(in_memory_favorites) {
            if !favorites.contains(&id) {
                favorites.push(id);
            }
        }

        self.captured = captured;
        self.favorites = favorites;
    }

    /// Builds a fresh state hydrated from a persisted subset.
    #[must_use]
    pub fn hydrated(persisted: PersistedState) -> Self {
        let mut state = Self::new();
        state.hydrate(persisted);
        state
    }
}

/// The subset of catalog state written to durable storage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Captured entries.
    #[serde(rename = "capturedPokemon", default)]
    pub captured: Vec<CapturedEntry>,
    /// Favorite ids.
    #[serde(default)]
    pub favorites: Vec<EntryId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn load_status_helpers() {
        assert!(LoadStatus::default().is_idle());
        assert!(LoadStatus::Loading.is_loading());
        let error = LoadStatus::error("boom");
        assert!(error.is_error());
        assert_eq!(error.error_message(), Some("boom"));
    }

    #[test]
    fn load_status_serializes_tagged() {
        let json = serde_json::to_string(&LoadStatus::error("offline")).unwrap();
        assert_eq!(json, r#"{"status":"error","message":"offline"}"#);
    }

    #[test]
    fn projection_keeps_only_persisted_fields() {
        let mut state = CatalogState::new();
        state.catalog_page.push(Entry::new(1, "bulbasaur"));
        state.captured.push(CapturedEntry::new(Entry::new(25, "pikachu"), Utc::now()));
        state.favorites.push(EntryId(4));
        state.search_query = "bulb".to_string();
        state.load_status = LoadStatus::Loading;

        let persisted = state.persisted();
        assert_eq!(persisted.captured.len(), 1);
        assert_eq!(persisted.favorites, vec![EntryId(4)]);

        let restored = CatalogState::hydrated(persisted);
        assert!(restored.catalog_page.is_empty());
        assert!(restored.search_query.is_empty());
        assert!(restored.load_status.is_idle());
        assert!(restored.is_captured(EntryId(25)));
        assert!(restored.is_favorite(EntryId(4)));
    }

    #[test]
    fn hydrate_drops_repeated_ids() {
        let now = Utc::now();
        let persisted = PersistedState {
            captured: vec![
                CapturedEntry::new(Entry::new(25, "pikachu"), now),
                CapturedEntry::new(Entry::new(25, "pikachu"), now),
            ],
            favorites: vec![EntryId(1), EntryId(1), EntryId(2)],
        };

        let state = CatalogState::hydrated(persisted);
        assert_eq!(state.captured.len(), 1);
        assert_eq!(state.favorites, vec![EntryId(1), EntryId(2)]);
    }

    #[test]
    fn hydrate_keeps_in_memory_items_after_persisted_ones() {
        let now = Utc::now();
        let mut state = CatalogState::new();
        state.captured.push(CapturedEntry::new(Entry::new(4, "charmander"), now));
        state.favorites.push(EntryId(9));

        state.hydrate(PersistedState {
            captured: vec![CapturedEntry::new(Entry::new(1, "bulbasaur"), now)],
            favorites: vec![EntryId(9), EntryId(3)],
        });

        let ids: Vec<EntryId> = state.captured.iter().map(CapturedEntry::id).collect();
        assert_eq!(ids, vec![EntryId(1), EntryId(4)]);
        assert_eq!(state.favorites, vec![EntryId(9), EntryId(3)]);
    }

    #[test]
    fn persisted_layout_uses_original_keys() {
        let persisted = PersistedState {
            captured: Vec::new(),
            favorites: vec![EntryId(7)],
        };
        let json = serde_json::to_value(&persisted).unwrap();
        assert!(json.get("capturedPokemon").is_some());
        assert_eq!(json["favorites"], serde_json::json!([7]));
    }
}
