//! Clock sources for self-timed updates
//!
//! Counters that measure their own elapsed time read a `Clock` instead of
//! calling `Instant::now()` directly, so tests can drive time by hand.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

/// A source of monotonic nanosecond readings.
///
/// Readings are only compared with each other; the origin is arbitrary.
/// Implementations are not trusted to be strictly monotonic, callers clamp
/// negative deltas.
pub trait Clock {
    fn now_nanos(&self) -> i64;
}

/// `Instant`-backed clock, anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_nanos(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }
}

/// Hand-driven clock for tests and replays.
///
/// Clones share the same reading, so a test can keep one handle and move
/// another into the counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the reading forward
    pub fn advance(&self, by: Duration) {
        let nanos = i64::try_from(by.as_nanos()).unwrap_or(i64::MAX);
        // The closure always returns Some, so the update cannot fail
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(nanos))
            });
    }

    /// Set the reading to an absolute value (may go backwards)
    pub fn set_nanos(&self, nanos: i64) {
        self.now.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
