//! Action rate counting
//!
//! - **RateCounter**: publishes how many actions happened in the last fully
//!   elapsed time frame, splitting actions that straddle a frame boundary
//!   in proportion to time.

mod counter;

#[cfg(test)]
mod counter_tests;

pub use counter::RateCounter;
