//! Use cases built on top of the catalog store.

mod encounter;

pub use encounter::{CaptureAttempt, EncounterUseCase, WildEncounter, roll_capture};
