//! Composition root helpers.
//!
//! Wires the production adapters into a [`CatalogStore`]. Applications call
//! one of these once at startup and share the returned store.

use std::sync::Arc;

use pokedex_application::{CatalogStore, GatewayError, KeyValueStore, StorageError};
use pokedex_domain::{CatalogConfig, DomainError};
use thiserror::Error;
use tracing::info;

use crate::adapters::{HttpCatalogGateway, SystemClock};
use crate::persistence::{FileKeyValueStore, JsonStatePersistence};

/// Store type wired with HTTP, file storage and the system clock.
pub type DefaultCatalogStore =
    CatalogStore<HttpCatalogGateway, JsonStatePersistence<FileKeyValueStore>, SystemClock>;

/// Errors raised while assembling the store.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] DomainError),

    /// The HTTP gateway could not be created.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// No storage location is available.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Builds a store over the HTTP gateway and the given key-value store.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the HTTP client
/// cannot be created.
pub fn build_store<K: KeyValueStore + 'static>(
    config: &CatalogConfig,
    storage: K,
) -> Result<CatalogStore<HttpCatalogGateway, JsonStatePersistence<K>, SystemClock>, BootstrapError>
{
    config.validate()?;
    let gateway = HttpCatalogGateway::new(config)?;
    let persistence = JsonStatePersistence::from_config(storage, config);
    info!(
        api = %gateway.base_url(),
        storage_key = %config.storage_key,
        "catalog store assembled"
    );

    Ok(CatalogStore::new(
        Arc::new(gateway),
        Arc::new(persistence),
        Arc::new(SystemClock::new()),
        config,
    ))
}

/// Builds a store persisting to the platform data directory.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client cannot
/// be created, or the platform has no data directory.
pub fn build_default_store(config: &CatalogConfig) -> Result<DefaultCatalogStore, BootstrapError> {
    build_store(config, FileKeyValueStore::in_data_dir()?)
}
