//! Storage ports

use std::future::Future;

use pokedex_domain::PersistedState;

use crate::error::StorageError;

/// Port for the durable key-value substrate.
///
/// Writes are atomic per key; there are no cross-key transactions.
pub trait KeyValueStore: Send + Sync {
    /// Reads the raw value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn read(&self, key: &str)
    -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Replaces the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written.
    fn write(&self, key: &str, value: &str)
    -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Port for saving and restoring the persisted catalog subset.
pub trait StatePersistence: Send + Sync {
    /// Writes the full captured/favorite pair.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    fn write_state(
        &self,
        state: &PersistedState,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Reads the persisted pair.
    ///
    /// Fails soft: missing, unreadable or corrupt state is reported as
    /// `None`.
    fn read_state(&self) -> impl Future<Output = Option<PersistedState>> + Send;
}
