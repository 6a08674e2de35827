//! Nanosecond conversions shared by counters and timers

use std::time::Duration;

use crate::error::TimingError;

const NANOS_PER_MILLI: i64 = 1_000_000;

pub(crate) fn millis_to_nanos(millis: i64) -> Result<i64, TimingError> {
    millis
        .checked_mul(NANOS_PER_MILLI)
        .ok_or(TimingError::Overflow)
}

pub(crate) fn duration_to_nanos(duration: Duration) -> Result<i64, TimingError> {
    i64::try_from(duration.as_nanos()).map_err(|_| TimingError::Overflow)
}

/// Only called with values already known to be non-negative.
pub(crate) fn nanos_to_duration(nanos: i64) -> Duration {
    Duration::from_nanos(nanos.max(0) as u64)
}
