//! Pokedex Domain - Core catalog types
//!
//! This crate defines the domain model for the Pokedex catalog client.
//! All types here are pure Rust with no I/O dependencies.

pub mod captured;
pub mod config;
pub mod entry;
pub mod error;
pub mod state;

pub use captured::{CapturedEntry, CollectionStats};
pub use config::CatalogConfig;
pub use entry::{
    Ability, Entry, EntryId, EntryLookup, EntryStub, EntryType, ListPage, Sprites, Stat,
    capture_rate,
};
pub use error::{DomainError, DomainResult};
pub use state::{CatalogState, LoadStatus, PersistedState};
