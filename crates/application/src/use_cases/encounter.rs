//! Random encounter use case.
//!
//! Draws a random entry from the remote catalog and lets the user try to
//! capture it. Unlike page loads, a failed draw is a hard error here.

use std::sync::Arc;

use pokedex_domain::{Entry, capture_rate};
use rand::Rng;
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::ports::{CatalogGateway, Clock, StatePersistence};
use crate::store::CatalogStore;

/// A drawn entry together with its capture odds.
#[derive(Debug, Clone, PartialEq)]
pub struct WildEncounter {
    /// The drawn entry.
    pub entry: Entry,
    /// Capture probability in whole percent.
    pub capture_rate: u8,
    /// Whether the entry was already captured when drawn.
    pub already_captured: bool,
}

/// Result of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureAttempt {
    /// The roll succeeded and the entry was captured.
    Caught,
    /// The roll failed.
    Escaped,
    /// The entry was captured before; nothing was rolled.
    AlreadyCaptured,
}

/// Rolls a capture with `rate` percent odds.
pub fn roll_capture<R: Rng>(rate: u8, rng: &mut R) -> bool {
    rng.random_range(0..100u8) < rate
}

/// Use case for random encounters.
///
/// # Example
///
/// ```ignore
/// let encounters = EncounterUseCase::new(Arc::clone(&store));
/// let wild = encounters.encounter().await?;
/// let outcome = encounters.attempt_capture(&wild, &mut rand::rng()).await?;
/// ```
pub struct EncounterUseCase<G, P, C> {
    store: Arc<CatalogStore<G, P, C>>,
}

impl<G, P, C> EncounterUseCase<G, P, C>
where
    G: CatalogGateway,
    P: StatePersistence + 'static,
    C: Clock,
{
    /// Creates the use case over a shared store.
    pub fn new(store: Arc<CatalogStore<G, P, C>>) -> Self {
        Self { store }
    }

    /// Draws a random entry.
    ///
    /// # Errors
    ///
    /// Returns the gateway error, including `NotFound`.
    pub async fn encounter(&self) -> StoreResult<WildEncounter> {
        let entry = self.store.gateway().get_random_detail().await?;
        let encounter = WildEncounter {
            capture_rate: capture_rate(&entry),
            already_captured: self.store.is_captured(entry.id),
            entry,
        };
        debug!(
            id = %encounter.entry.id,
            rate = encounter.capture_rate,
            "wild entry appeared"
        );
        Ok(encounter)
    }

    /// Rolls against the encounter's capture rate and captures on success.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the capture could not be persisted; the
    /// entry is captured in memory regardless.
    pub async fn attempt_capture<R: Rng>(
        &self,
        encounter: &WildEncounter,
        rng: &mut R,
    ) -> StoreResult<CaptureAttempt> {
        if self.store.is_captured(encounter.entry.id) {
            return Ok(CaptureAttempt::AlreadyCaptured);
        }
        if !roll_capture(encounter.capture_rate, rng) {
            info!(id = %encounter.entry.id, "entry escaped");
            return Ok(CaptureAttempt::Escaped);
        }

        if self.store.capture(encounter.entry.clone()).await? {
            Ok(CaptureAttempt::Caught)
        } else {
            Ok(CaptureAttempt::AlreadyCaptured)
        }
    }
}
