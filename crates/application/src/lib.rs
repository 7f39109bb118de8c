//! Pokedex Application - Catalog store, ports and use cases
//!
//! This crate defines the application layer with:
//! - Port traits for the remote catalog, durable storage and time
//! - The catalog store that owns and synchronizes client state
//! - Use case orchestration on top of the store
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod store;
pub mod use_cases;

pub use error::{GatewayError, StorageError, StoreError, StoreResult};
pub use ports::{CatalogGateway, Clock, KeyValueStore, StatePersistence};
pub use store::{CatalogStore, LoadedPage, SearchOutcome, Subscription};
pub use use_cases::{CaptureAttempt, EncounterUseCase, WildEncounter, roll_capture};
