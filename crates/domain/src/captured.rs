//! Captured entries and collection statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntryId};

/// An entry the user has captured, stamped with the capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedEntry {
    /// The captured entry.
    #[serde(flatten)]
    pub entry: Entry,
    /// When the entry was captured.
    pub captured_at: DateTime<Utc>,
}

impl CapturedEntry {
    /// Wraps an entry with its capture time.
    #[must_use]
    pub const fn new(entry: Entry, captured_at: DateTime<Utc>) -> Self {
        Self { entry, captured_at }
    }

    /// Returns the id of the captured entry.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.entry.id
    }
}

/// Summary of the captured collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionStats {
    /// Number of captured entries.
    pub total: usize,
    /// Distinct type names, in order of first appearance.
    pub types: Vec<String>,
    /// Most recently appended capture.
    pub last_captured: Option<CapturedEntry>,
}

impl CollectionStats {
    /// Computes statistics over captured entries in capture order.
    #[must_use]
    pub fn from_captured(captured: &[CapturedEntry]) -> Self {
        let mut types: Vec<String> = Vec::new();
        for name in captured.iter().flat_map(|c| c.entry.type_names()) {
            if !types.iter().any(|t| t == name) {
                types.push(name.to_string());
            }
        }

        Self {
            total: captured.len(),
            types,
            last_captured: captured.last().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn captured_entry_serializes_flat_with_captured_at() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let captured = CapturedEntry::new(Entry::new(25, "pikachu"), at);

        let json = serde_json::to_value(&captured).unwrap();
        assert_eq!(json["id"], 25);
        assert_eq!(json["name"], "pikachu");
        assert_eq!(json["capturedAt"], "2024-05-01T10:00:00Z");
    }

    #[test]
    fn stats_collect_distinct_types_in_order() {
        let now = Utc::now();
        let captured = vec![
            CapturedEntry::new(Entry::new(1, "bulbasaur").with_type("grass").with_type("poison"), now),
            CapturedEntry::new(Entry::new(43, "oddish").with_type("grass").with_type("poison"), now),
            CapturedEntry::new(Entry::new(25, "pikachu").with_type("electric"), now),
        ];

        let stats = CollectionStats::from_captured(&captured);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.types, vec!["grass", "poison", "electric"]);
        assert_eq!(stats.last_captured.map(|c| c.id()), Some(EntryId(25)));
    }

    #[test]
    fn stats_of_empty_collection() {
        assert_eq!(CollectionStats::from_captured(&[]), CollectionStats::default());
    }
}
