//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An entry lookup key is empty or malformed.
    #[error("invalid entry lookup: {0}")]
    InvalidLookup(String),

    /// An entry identifier is out of the valid range.
    #[error("invalid entry id: {0}")]
    InvalidEntryId(String),

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
