//! Tag keys - second offsets with a total order.

use std::fmt;

use chrono::TimeDelta;

use crate::timecode;

/// Identity of a stored tag: elapsed whole seconds from session start.
///
/// Ordering, equality, and hashing are all defined solely by the offset,
/// so two keys with equal offsets are interchangeable as map keys. The
/// display string is derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagKey {
    offset_seconds: i64,
}

impl TagKey {
    /// Creates a key at the given seconds offset.
    #[must_use]
    pub const fn from_seconds(offset_seconds: i64) -> Self {
        Self { offset_seconds }
    }

    /// Creates a key from an elapsed duration, truncated toward zero to
    /// whole seconds.
    #[must_use]
    pub const fn from_duration(elapsed: TimeDelta) -> Self {
        Self {
            offset_seconds: elapsed.num_seconds(),
        }
    }

    /// Returns the seconds offset.
    #[must_use]
    pub const fn offset_seconds(self) -> i64 {
        self.offset_seconds
    }

    /// Returns a key shifted by `delta` seconds, saturating at the i64
    /// boundaries.
    #[must_use]
    pub const fn shifted_by(self, delta: i64) -> Self {
        Self {
            offset_seconds: self.offset_seconds.saturating_add(delta),
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", timecode::format_offset(self.offset_seconds))
    }
}
