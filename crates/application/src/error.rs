//! Application error types

use pokedex_domain::DomainError;
use thiserror::Error;

/// Failures reported by the remote catalog gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Transport failure or a non-success response.
    #[error("network error: {0}")]
    Network(String),

    /// The remote reports no such entry.
    #[error("not found: {0}")]
    NotFound(String),
}

impl GatewayError {
    /// Returns true if the remote reported a missing entry.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Failures reported by durable storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Reading or writing the underlying medium failed.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// The value could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(String),

    /// The storage backend is not available.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by catalog store actions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Persisting the captured/favorite pair failed.
    ///
    /// The in-memory mutation has already been applied.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type alias for store actions.
pub type StoreResult<T> = Result<T, StoreError>;
