//! Target timer that notifies observers and re-arms itself
//!
//! Where a plain `TargetTimer` leaves it to the owner to notice the target
//! and reset, an `ObservableTargetTimer` does both on every completion:
//!
//! 1. carry the overshoot into the next cycle
//! 2. re-arm the target from the last target settings (random re-draws)
//! 3. notify observers, which may change the target
//!
//! Re-arming happens before notification, so an observer's target change is
//! not undone. With several observers a later one can still override an
//! earlier one's change.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TimingError;
use crate::random::{OsRandom, RandomSource};
use crate::units::{duration_to_nanos, millis_to_nanos};

use super::observer::{ObserverSet, TargetObserver};
use super::target::{TargetSpec, TargetTimer};

#[derive(Debug)]
pub struct ObservableTargetTimer {
    timer: TargetTimer,
    /// Last requested target settings, used to re-arm
    spec: TargetSpec,
    observers: Arc<ObserverSet<dyn TargetObserver>>,
}

impl ObservableTargetTimer {
    pub fn new(target: Duration) -> Result<Self, TimingError> {
        Self::from_spec(TargetSpec::fixed(target)?)
    }

    pub fn from_nanos(target_nanos: i64) -> Result<Self, TimingError> {
        Self::from_spec(TargetSpec::Fixed(target_nanos))
    }

    pub fn random(range: Range<Duration>) -> Result<Self, TimingError> {
        Self::from_spec(TargetSpec::random(range)?)
    }

    pub fn from_spec(spec: TargetSpec) -> Result<Self, TimingError> {
        Self::with_random_source(spec, OsRandom)
    }

    pub fn with_random_source(
        spec: TargetSpec,
        source: impl RandomSource + Send + 'static,
    ) -> Result<Self, TimingError> {
        Ok(Self {
            timer: TargetTimer::with_random_source(spec, source)?,
            spec,
            observers: Arc::new(ObserverSet::new()),
        })
    }

    // ─── Observers ──────────────────────────────────────────────────────────

    pub fn add_observer(&self, observer: Arc<dyn TargetObserver>) -> Result<(), TimingError> {
        self.observers.add(observer)?;
        tracing::debug!(observers = self.observers.len(), "target observer added");
        Ok(())
    }

    pub fn remove_observer(&self, observer: &Arc<dyn TargetObserver>) -> Result<(), TimingError> {
        self.observers.remove(observer)?;
        tracing::debug!(observers = self.observers.len(), "target observer removed");
        Ok(())
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Shared handle to the observer set.
    ///
    /// Lets other threads register or remove observers while the owning
    /// thread keeps driving the timer.
    pub fn observers(&self) -> Arc<ObserverSet<dyn TargetObserver>> {
        Arc::clone(&self.observers)
    }

    // ─── Targets (recorded for re-arming) ───────────────────────────────────

    pub fn set_target_nanos(&mut self, target_nanos: i64) -> Result<(), TimingError> {
        self.apply_spec(TargetSpec::Fixed(target_nanos))
    }

    pub fn set_target_millis(&mut self, target_millis: i64) -> Result<(), TimingError> {
        self.set_target_nanos(millis_to_nanos(target_millis)?)
    }

    pub fn set_target(&mut self, target: Duration) -> Result<(), TimingError> {
        self.apply_spec(TargetSpec::fixed(target)?)
    }

    pub fn set_target_random_nanos(&mut self, lower: i64, upper: i64) -> Result<(), TimingError> {
        self.apply_spec(TargetSpec::Random { lower, upper })
    }

    pub fn set_target_random_millis(&mut self, lower: i64, upper: i64) -> Result<(), TimingError> {
        self.set_target_random_nanos(millis_to_nanos(lower)?, millis_to_nanos(upper)?)
    }

    pub fn set_target_random(&mut self, range: Range<Duration>) -> Result<(), TimingError> {
        self.apply_spec(TargetSpec::random(range)?)
    }

    /// Set the target from `spec` and remember it for later re-arms
    pub fn apply_spec(&mut self, spec: TargetSpec) -> Result<(), TimingError> {
        self.timer.apply_spec(&spec)?;
        self.spec = spec;
        Ok(())
    }

    // ─── Elapsed time ───────────────────────────────────────────────────────

    /// Add elapsed time, running one completion per target reached.
    ///
    /// Returns how many times the target was reached during this call.
    pub fn add_elapsed_nanos(&mut self, elapsed_nanos: i64) -> Result<u32, TimingError> {
        self.timer.add_elapsed_nanos(elapsed_nanos)?;
        self.run_completions()
    }

    pub fn add_elapsed_millis(&mut self, elapsed_millis: i64) -> Result<u32, TimingError> {
        self.add_elapsed_nanos(millis_to_nanos(elapsed_millis)?)
    }

    pub fn add_elapsed(&mut self, elapsed: Duration) -> Result<u32, TimingError> {
        self.add_elapsed_nanos(duration_to_nanos(elapsed)?)
    }

    pub fn reset_elapsed(&mut self) {
        self.timer.reset_elapsed();
    }

    pub fn reset_elapsed_past_target(&mut self) -> Result<(), TimingError> {
        self.timer.reset_elapsed_past_target()
    }

    /// Each pass is checked against whatever target is in effect after the
    /// previous notification, so a single large update can complete several
    /// cycles. A zero target completes once per call.
    ///
    /// If the re-arm draw fails the timer stays finished and the next update
    /// retries the completion.
    fn run_completions(&mut self) -> Result<u32, TimingError> {
        let mut completions = 0;

        while self.timer.is_finished() {
            let consumed = self.timer.target_nanos();
            self.timer.rearm_past_target(&self.spec)?;
            completions += 1;

            tracing::debug!(
                carried_ns = self.timer.elapsed_nanos(),
                next_target_ns = self.timer.target_nanos(),
                "target reached"
            );

            for observer in self.observers.snapshot() {
                observer.target_passed(self);
            }

            if consumed == 0 {
                break;
            }
        }

        Ok(completions)
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    pub fn is_finished(&self) -> bool {
        self.timer.is_finished()
    }

    pub fn target(&self) -> Duration {
        self.timer.target()
    }

    pub fn target_nanos(&self) -> i64 {
        self.timer.target_nanos()
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    pub fn elapsed_nanos(&self) -> i64 {
        self.timer.elapsed_nanos()
    }

    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    /// Target settings used for the next re-arm
    pub fn spec(&self) -> TargetSpec {
        self.spec
    }
}
