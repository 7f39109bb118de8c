//! Wall-clock source for capture timestamps.

use chrono::{DateTime, SubsecRound, Utc};
use pokedex_application::Clock;

/// Fractional digits kept in a capture stamp.
const STAMP_PRECISION: u16 = 3;

/// Reads the system time, truncated to whole milliseconds.
///
/// Stamps persist as `capturedAt` strings such as `2024-05-01T12:00:00.123Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(STAMP_PRECISION)
    }
}
