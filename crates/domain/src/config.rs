//! Catalog client configuration.
//!
//! All values default to the constants the client ships with. Embedding
//! applications may override them programmatically or load them from a
//! JSON document; nothing is read from the environment.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Base URL of the remote catalog API.
pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Storage key holding the persisted state.
pub const DEFAULT_STORAGE_KEY: &str = "pokemon-storage";

/// Page size used by initialize, reset and empty searches.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Highest entry id drawn by the random encounter.
pub const DEFAULT_MAX_ENTRY_ID: u32 = 1010;

/// Per-request timeout applied by the HTTP transport.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Configuration shared by the gateway, persistence and store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the remote catalog API.
    pub api_base_url: String,
    /// Namespaced storage key for the persisted state.
    pub storage_key: String,
    /// Default page size.
    pub default_page_limit: u32,
    /// Upper bound (inclusive) of the random id draw.
    pub max_entry_id: u32,
    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_entry_id: DEFAULT_MAX_ENTRY_ID,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl CatalogConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Overrides the storage key.
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Overrides the default page size.
    #[must_use]
    pub const fn with_default_page_limit(mut self, limit: u32) -> Self {
        self.default_page_limit = limit;
        self
    }

    /// Overrides the random draw upper bound.
    #[must_use]
    pub const fn with_max_entry_id(mut self, max: u32) -> Self {
        self.max_entry_id = max;
        self
    }

    /// Overrides the request timeout.
    #[must_use]
    pub const fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(DomainError::InvalidConfig(format!(
                "api_base_url must start with http:// or https://: {}",
                self.api_base_url
            )));
        }
        if self.storage_key.trim().is_empty() {
            return Err(DomainError::InvalidConfig(
                "storage_key must not be empty".to_string(),
            ));
        }
        if self.default_page_limit == 0 {
            return Err(DomainError::InvalidConfig(
                "default_page_limit must be positive".to_string(),
            ));
        }
        if self.max_entry_id == 0 {
            return Err(DomainError::InvalidConfig(
                "max_entry_id must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
