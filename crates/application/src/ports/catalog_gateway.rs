//! Remote catalog port

use std::future::Future;

use pokedex_domain::{Entry, EntryLookup, ListPage};

use crate::error::GatewayError;

/// Port for the read-only remote catalog.
///
/// Implementations are stateless: no caching, no retries. Every failure is
/// reported as a [`GatewayError`].
pub trait CatalogGateway: Send + Sync {
    /// Fetches one page of entry stubs.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Network`] on transport failure or a
    /// non-success response.
    fn list_page(
        &self,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<ListPage, GatewayError>> + Send;

    /// Fetches the full detail of one entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the remote has no such entry,
    /// and [`GatewayError::Network`] for any other failure.
    fn get_detail(
        &self,
        lookup: &EntryLookup,
    ) -> impl Future<Output = Result<Entry, GatewayError>> + Send;

    /// Fetches an entry drawn uniformly from the known id range.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogGateway::get_detail`].
    fn get_random_detail(&self) -> impl Future<Output = Result<Entry, GatewayError>> + Send;
}
