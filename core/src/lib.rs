//! Action-rate counters and target timers driven by caller-supplied time.
//!
//! - [`RateCounter`] publishes how many actions happened in the last full
//!   time frame (frames per second, spawns per minute, ...)
//! - [`TargetTimer`] reports when accumulated time reaches a fixed or random
//!   target
//! - [`ObservableTargetTimer`] additionally re-arms itself and notifies
//!   observers every time the target is reached
//!
//! All of them are single threaded and updated by the caller; none of them
//! spawns threads or sleeps.

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod random;
pub mod rate;
pub mod timers;

mod units;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{TimingConfig, load_config};
pub use error::{ConfigError, TimingError};
pub use random::{OsRandom, RandomSource, SequenceRandom};
pub use rate::RateCounter;
pub use timers::{
    ObservableTargetTimer, ObserverSet, TargetObserver, TargetSpec, TargetTimer, TimerCompletion,
    TimerManager,
};
