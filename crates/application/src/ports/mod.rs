//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the catalog store and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod catalog_gateway;
mod clock;
mod storage;

pub use catalog_gateway::CatalogGateway;
pub use clock::Clock;
pub use storage::{KeyValueStore, StatePersistence};
