//! Random sources for randomized timer targets

use crate::error::TimingError;

/// Supplies raw 64-bit random values.
pub trait RandomSource {
    fn next_u64(&mut self) -> Result<u64, TimingError>;
}

/// Operating system entropy via `getrandom`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_u64(&mut self) -> Result<u64, TimingError> {
        Ok(getrandom::u64()?)
    }
}

/// Replays a fixed list of values, wrapping around at the end.
///
/// Used to make randomized targets deterministic in tests.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<u64>,
    next: usize,
}

impl SequenceRandom {
    pub fn new(values: Vec<u64>) -> Self {
        Self { values, next: 0 }
    }
}

impl RandomSource for SequenceRandom {
    fn next_u64(&mut self) -> Result<u64, TimingError> {
        if self.values.is_empty() {
            return Ok(0);
        }
        let value = self.values[self.next % self.values.len()];
        self.next = (self.next + 1) % self.values.len();
        Ok(value)
    }
}

/// Draw uniformly from `[lower, upper)`.
///
/// Caller guarantees `0 <= lower < upper`. Uses a widening multiply instead
/// of a modulo; any remaining bias is below `span / 2^64`.
pub(crate) fn draw_in_range(
    source: &mut dyn RandomSource,
    lower: i64,
    upper: i64,
) -> Result<i64, TimingError> {
    debug_assert!(0 <= lower && lower < upper);
    let span = (upper - lower) as u64;
    let raw = source.next_u64()?;
    let offset = ((u128::from(raw) * u128::from(span)) >> 64) as u64;
    Ok(lower + offset as i64)
}
