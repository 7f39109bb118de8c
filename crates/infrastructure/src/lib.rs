//! Pokedex Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the composition root.

pub mod adapters;
pub mod bootstrap;
pub mod persistence;
pub mod serialization;

pub use adapters::{HttpCatalogGateway, SystemClock};
pub use bootstrap::{BootstrapError, DefaultCatalogStore, build_default_store, build_store};
pub use persistence::{FileKeyValueStore, InMemoryKeyValueStore, JsonStatePersistence};
pub use serialization::{SerializationError, from_json, to_json_stable};
