//! JSON persistence adapter over a key-value store.

use pokedex_application::{KeyValueStore, StatePersistence, StorageError};
use pokedex_domain::{CatalogConfig, PersistedState};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::serialization::{from_json, to_json_stable};

/// Serializes values to JSON and stores them under namespaced keys.
///
/// Reads fail soft: a missing, unreadable or corrupt value is reported as
/// absent and logged, so a first run or a damaged file never blocks startup.
#[derive(Debug)]
pub struct JsonStatePersistence<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> JsonStatePersistence<K> {
    /// Creates an adapter that keeps catalog state under `key`.
    pub fn new(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Creates an adapter using the configured storage key.
    pub fn from_config(store: K, config: &CatalogConfig) -> Self {
        Self::new(store, config.storage_key.clone())
    }

    /// The key catalog state is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying key-value store.
    #[must_use]
    pub const fn store(&self) -> &K {
        &self.store
    }

    /// Serializes `value` and writes it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub async fn write_value<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let json = to_json_stable(value)?;
        self.store.write(key, &json).await
    }

    /// Reads and decodes the value under `key`, or `None` if that fails.
    pub async fn read_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.read(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no stored value");
                return None;
            }
            Err(err) => {
                warn!(key, error = %err, "failed to read stored value");
                return None;
            }
        };

        match from_json(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "ignoring undecodable stored value");
                None
            }
        }
    }
}

impl<K: KeyValueStore> StatePersistence for JsonStatePersistence<K> {
    async fn write_state(&self, state: &PersistedState) -> Result<(), StorageError> {
        self.write_value(&self.key, state).await
    }

    async fn read_state(&self) -> Option<PersistedState> {
        self.read_value(&self.key).await
    }
}
