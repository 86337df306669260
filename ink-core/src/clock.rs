//! Boot-relative to wall-clock timestamp alignment.
//!
//! Platform input frames carry timestamps relative to device boot (a monotonic
//! clock). Ink consumers expect absolute wall-clock milliseconds. The offset
//! between the two is sampled once and reused for every event, so drift between
//! the clocks over a long session is accepted as error.

use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed offset converting boot-relative event times into wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventClock {
    offset_ms: i64,
}

impl EventClock {
    /// Create a clock from simultaneous readings of both clocks.
    #[must_use]
    pub const fn new(wall_now_ms: i64, uptime_now_ms: i64) -> Self {
        Self {
            offset_ms: wall_now_ms - uptime_now_ms,
        }
    }

    /// Create a clock with a precomputed offset.
    #[must_use]
    pub const fn from_offset(offset_ms: i64) -> Self {
        Self { offset_ms }
    }

    /// Sample the wall clock now and pair it with the caller's uptime reading.
    ///
    /// `uptime_now_ms` must come from the same monotonic source that stamps
    /// the incoming frames.
    #[must_use]
    pub fn capture(uptime_now_ms: i64) -> Self {
        Self::new(wall_clock_ms(), uptime_now_ms)
    }

    /// The fixed offset in milliseconds.
    #[must_use]
    pub const fn offset_ms(&self) -> i64 {
        self.offset_ms
    }

    /// Translate a boot-relative event time into absolute wall-clock time.
    #[must_use]
    pub const fn absolute(&self, raw_event_time_ms: i64) -> i64 {
        self.offset_ms + raw_event_time_ms
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// A clock set before the epoch reads as zero.
#[must_use]
pub fn wall_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}
