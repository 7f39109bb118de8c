//! Catalog entry model.
//!
//! An [`Entry`] is the typed form of a remote catalog record. The gateway
//! converts wire payloads into these types once; nothing past that boundary
//! touches untyped JSON except the opaque sprite bag.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Server-assigned identifier of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl EntryId {
    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntryId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl FromStr for EntryId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| DomainError::InvalidEntryId(s.to_string()))
    }
}

/// Key used to fetch a single entry from the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryLookup {
    /// Lookup by numeric id.
    Id(EntryId),
    /// Lookup by exact, lowercase name.
    Name(String),
}

impl EntryLookup {
    /// Builds a lookup from free text.
    ///
    /// Numeric input becomes an id lookup; anything else becomes a
    /// lowercase name lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidLookup`] when the input is blank.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidLookup("lookup key is empty".to_string()));
        }
        Ok(trimmed
            .parse::<EntryId>()
            .map_or_else(|_| Self::Name(trimmed.to_lowercase()), Self::Id))
    }

    /// Returns the path segment used for the detail endpoint.
    #[must_use]
    pub fn as_path_segment(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Name(name) => name.clone(),
        }
    }
}

impl fmt::Display for EntryLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_path_segment())
    }
}

impl From<EntryId> for EntryLookup {
    fn from(id: EntryId) -> Self {
        Self::Id(id)
    }
}

/// A category tag attached to an entry, in slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryType {
    /// Display slot (1-based).
    pub slot: u8,
    /// Type name, e.g. `electric`.
    pub name: String,
}

/// A base stat of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    /// Stat name, e.g. `special-attack`.
    pub stat_name: String,
    /// Base value.
    pub base_value: u32,
    /// Effort value yield.
    #[serde(default)]
    pub effort: u32,
}

impl Stat {
    /// Returns a human readable stat label.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.stat_name.as_str() {
            "hp" => "HP".to_string(),
            "attack" => "Attack".to_string(),
            "defense" => "Defense".to_string(),
            "special-attack" => "Sp. Attack".to_string(),
            "special-defense" => "Sp. Defense".to_string(),
            "speed" => "Speed".to_string(),
            other => capitalize(other),
        }
    }
}

/// An ability an entry can have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    /// Ability name.
    pub name: String,
    /// Whether this is a hidden ability.
    #[serde(default)]
    pub is_hidden: bool,
    /// Display slot.
    #[serde(default)]
    pub slot: u8,
}

/// Opaque bag of image references, kept exactly as the remote sent it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sprites(pub BTreeMap<String, serde_json::Value>);

impl Sprites {
    /// Returns the default front image URL if present.
    #[must_use]
    pub fn front_default(&self) -> Option<&str> {
        self.0.get("front_default").and_then(serde_json::Value::as_str)
    }
}

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable server-assigned id.
    pub id: EntryId,
    /// Unique name.
    pub name: String,
    /// Image references.
    #[serde(default)]
    pub sprites: Sprites,
    /// Category tags in slot order.
    #[serde(default)]
    pub types: Vec<EntryType>,
    /// Height in decimetres.
    #[serde(default)]
    pub height: u32,
    /// Weight in hectograms.
    #[serde(default)]
    pub weight: u32,
    /// Base stats in remote order.
    #[serde(default)]
    pub stats: Vec<Stat>,
    /// Abilities in slot order.
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

impl Entry {
    /// Creates an entry with only an id and a name.
    pub fn new(id: impl Into<EntryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sprites: Sprites::default(),
            types: Vec::new(),
            height: 0,
            weight: 0,
            stats: Vec::new(),
            abilities: Vec::new(),
        }
    }

    /// Adds a type tag in the next slot.
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>) -> Self {
        let slot = u8::try_from(self.types.len() + 1).unwrap_or(u8::MAX);
        self.types.push(EntryType {
            slot,
            name: name.into(),
        });
        self
    }

    /// Adds a base stat.
    #[must_use]
    pub fn with_stat(mut self, name: impl Into<String>, base_value: u32) -> Self {
        self.stats.push(Stat {
            stat_name: name.into(),
            base_value,
            effort: 0,
        });
        self
    }

    /// Returns true if the name contains `needle`, ignoring case.
    #[must_use]
    pub fn name_matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Returns the type names in slot order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.name.as_str())
    }

    /// Sum of all base stats.
    #[must_use]
    pub fn base_stat_total(&self) -> u32 {
        self.stats.iter().map(|s| s.base_value).sum()
    }

    /// Zero-padded catalog number, e.g. `#025`.
    #[must_use]
    pub fn display_number(&self) -> String {
        format!("#{:03}", self.id.0)
    }

    /// Name with the first letter upper-cased.
    #[must_use]
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }

    /// Height in metres.
    #[must_use]
    pub fn height_meters(&self) -> f64 {
        f64::from(self.height) / 10.0
    }

    /// Weight in kilograms.
    #[must_use]
    pub fn weight_kilograms(&self) -> f64 {
        f64::from(self.weight) / 10.0
    }
}

/// Approximate maximum base stat total used to scale capture difficulty.
const MAX_BASE_STAT_TOTAL: f64 = 600.0;

/// Capture probability for an entry, as a whole percent in `30..=70`.
///
/// Stronger entries are harder to capture: the rate starts at 70% and
/// drops with the base stat total, never below 30%.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn capture_rate(entry: &Entry) -> u8 {
    let difficulty = f64::from(entry.base_stat_total()) / MAX_BASE_STAT_TOTAL;
    let rate = 0.4f64.mul_add(-difficulty, 0.7).max(0.3);
    (rate * 100.0).round() as u8
}

/// A list endpoint result item: a name plus a reference to its detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStub {
    /// Entry name.
    pub name: String,
    /// Detail reference (URL) for this entry.
    pub detail_ref: String,
}

impl EntryStub {
    /// Creates a new stub.
    pub fn new(name: impl Into<String>, detail_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail_ref: detail_ref.into(),
        }
    }

    /// Returns the lookup key for this stub's detail.
    ///
    /// Uses the trailing numeric path segment of the detail reference when
    /// there is one, and the name otherwise.
    #[must_use]
    pub fn lookup(&self) -> EntryLookup {
        self.detail_ref
            .split('/')
            .rfind(|segment| !segment.is_empty())
            .and_then(|segment| segment.parse::<EntryId>().ok())
            .map_or_else(|| EntryLookup::Name(self.name.to_lowercase()), EntryLookup::Id)
    }
}

/// One page of the remote list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListPage {
    /// Stubs in server order.
    pub results: Vec<EntryStub>,
    /// Reference to the next page, if any.
    pub next: Option<String>,
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
