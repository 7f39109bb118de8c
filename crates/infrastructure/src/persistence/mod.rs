//! Durable storage adapters.

mod file_store;
mod memory_store;
mod state_persistence;

pub use file_store::FileKeyValueStore;
pub use memory_store::InMemoryKeyValueStore;
pub use state_persistence::JsonStatePersistence;
