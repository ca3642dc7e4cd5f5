//! Session clock - elapsed time against a correctable start instant.

use chrono::{DateTime, TimeDelta, Utc};

/// Corrections at or below this magnitude (seconds) are treated as clock
/// noise and do not warrant shifting stored tags.
pub const CORRECTION_NOISE_SECONDS: i64 = 2;

/// Supplies elapsed time since a session start instant.
///
/// The start instant can be retroactively corrected, which changes the
/// wall-clock meaning of every offset already stored; callers apply the
/// returned delta to the store themselves (the clock never touches it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    start: DateTime<Utc>,
}

impl SessionClock {
    /// Creates a clock anchored at the given instant.
    #[must_use]
    pub const fn started_at(start: DateTime<Utc>) -> Self {
        Self { start }
    }

    /// Creates a clock anchored at the current instant.
    #[must_use]
    pub fn started_now() -> Self {
        Self::started_at(Utc::now())
    }

    /// Returns the start instant.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Elapsed time since the start instant.
    #[must_use]
    pub fn elapsed(&self) -> TimeDelta {
        self.elapsed_at(Utc::now())
    }

    /// Elapsed time as of `now`; injectable variant for tests.
    #[must_use]
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.start
    }

    /// Replaces the start instant, returning the signed whole-second
    /// delta that must be applied to existing offsets so their
    /// wall-clock meaning stays consistent.
    ///
    /// Correcting to an earlier start means every stored tag actually
    /// happened later into the session, hence a positive delta.
    pub fn correct_start(&mut self, new_start: DateTime<Utc>) -> i64 {
        let delta = (self.start - new_start).num_seconds();
        self.start = new_start;
        delta
    }
}
