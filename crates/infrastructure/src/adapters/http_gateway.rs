//! Catalog gateway implementation using reqwest.
//!
//! This adapter implements the `CatalogGateway` port against the remote
//! JSON API. It decodes wire payloads into domain types and maps every
//! failure to a `GatewayError`; it never caches or retries.

use std::time::Duration;

use pokedex_application::{CatalogGateway, GatewayError};
use pokedex_domain::{CatalogConfig, Entry, EntryId, EntryLookup, ListPage};
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::api_types::{ApiEntry, ApiListResponse};

/// HTTP gateway to the remote catalog.
#[derive(Debug, Clone)]
pub struct HttpCatalogGateway {
    client: Client,
    base_url: Url,
    max_entry_id: u32,
}

impl HttpCatalogGateway {
    /// Creates a gateway from configuration.
    ///
    /// The transport applies `request_timeout_ms` to every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// created.
    pub fn new(config: &CatalogConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Self::with_client(client, config)
    }

    /// Creates a gateway with a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_client(client: Client, config: &CatalogConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            GatewayError::Network(format!("invalid base URL {}: {e}", config.api_base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Network(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }

        Ok(Self {
            client,
            base_url,
            max_entry_id: config.max_entry_id.max(1),
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}/{segments...}`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, url: Url) -> Result<Response, GatewayError> {
        debug!(%url, "GET");
        self.client.get(url).send().await.map_err(Self::map_error)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let url = response.url().clone();
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Network(format!("invalid response body from {url}: {e}")))
    }

    /// Maps reqwest errors to `GatewayError::Network`.
    fn map_error(error: reqwest::Error) -> GatewayError {
        let target = error
            .url()
            .map_or_else(|| "unknown URL".to_string(), ToString::to_string);

        if error.is_timeout() {
            return GatewayError::Network(format!("request to {target} timed out"));
        }
        if error.is_connect() {
            return GatewayError::Network(format!("could not connect to {target}: {error}"));
        }
        GatewayError::Network(error.to_string())
    }
}

/// Draws an id uniformly from `1..=max`.
pub(crate) fn draw_entry_id<R: Rng>(max: u32, rng: &mut R) -> EntryId {
    EntryId(rng.random_range(1..=max.max(1)))
}

impl CatalogGateway for HttpCatalogGateway {
    async fn list_page(&self, limit: u32, offset: u32) -> Result<ListPage, GatewayError> {
        let mut url = self.endpoint(&["pokemon"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let response = self.send(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Network(format!(
                "list request failed with HTTP {status}"
            )));
        }

        let page: ApiListResponse = Self::decode(response).await?;
        Ok(page.into())
    }

    async fn get_detail(&self, lookup: &EntryLookup) -> Result<Entry, GatewayError> {
        let segment = lookup.as_path_segment();
        let url = self.endpoint(&["pokemon", &segment]);

        let response = self.send(url).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(segment));
        }
        if !status.is_success() {
            return Err(GatewayError::Network(format!(
                "detail request for {segment} failed with HTTP {status}"
            )));
        }

        let entry: ApiEntry = Self::decode(response).await?;
        Ok(entry.into())
    }

    async fn get_random_detail(&self) -> Result<Entry, GatewayError> {
        let id = draw_entry_id(self.max_entry_id, &mut rand::rng());
        self.get_detail(&EntryLookup::Id(id)).await
    }
}
