//! Target timers (elapsed time against a target duration)
//!
//! A `TargetTimer` does not run on its own. The owner adds elapsed time and
//! asks whether the target has been reached. Targets are either fixed or
//! drawn once, uniformly, from a range at the moment they are set.
//!
//! # States
//!
//! - **Armed**: accumulated time is below the target
//! - **Reached**: accumulated time meets or exceeds the target
//!
//! Nothing moves a timer back to Armed except resetting the elapsed time
//! (or changing the target).

use std::fmt;
use std::ops::Range;
use std::time::Duration;

use crate::error::TimingError;
use crate::random::{OsRandom, RandomSource, draw_in_range};
use crate::units::{duration_to_nanos, millis_to_nanos, nanos_to_duration};

/// How a target was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    /// Target of exactly this many nanoseconds
    Fixed(i64),

    /// Target drawn from `[lower, upper)` nanoseconds
    Random { lower: i64, upper: i64 },
}

impl TargetSpec {
    pub fn fixed(target: Duration) -> Result<Self, TimingError> {
        Ok(TargetSpec::Fixed(duration_to_nanos(target)?))
    }

    pub fn random(range: Range<Duration>) -> Result<Self, TimingError> {
        let spec = TargetSpec::Random {
            lower: duration_to_nanos(range.start)?,
            upper: duration_to_nanos(range.end)?,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the spec the same way the setters would
    pub fn validate(&self) -> Result<(), TimingError> {
        match *self {
            TargetSpec::Fixed(nanos) if nanos < 0 => Err(TimingError::NegativeTarget(nanos)),
            TargetSpec::Fixed(_) => Ok(()),
            TargetSpec::Random { lower, upper } => validate_range(lower, upper),
        }
    }
}

fn validate_range(lower: i64, upper: i64) -> Result<(), TimingError> {
    let reason = if lower < 0 {
        "inclusive lower bound must be zero or greater"
    } else if upper < 1 {
        "exclusive upper bound must be one or greater"
    } else if upper <= lower {
        "exclusive upper bound must be greater than inclusive lower bound"
    } else {
        return Ok(());
    };
    Err(TimingError::InvalidRandomRange { lower, upper, reason })
}

/// Accumulates elapsed time against a target
pub struct TargetTimer {
    target_nanos: i64,
    total_elapsed_nanos: i64,
    /// Always `total_elapsed_nanos >= target_nanos`
    finished: bool,
    random: Box<dyn RandomSource + Send>,
}

impl TargetTimer {
    /// Create a timer with a fixed target
    pub fn new(target: Duration) -> Result<Self, TimingError> {
        Self::from_spec(TargetSpec::fixed(target)?)
    }

    pub fn from_nanos(target_nanos: i64) -> Result<Self, TimingError> {
        Self::from_spec(TargetSpec::Fixed(target_nanos))
    }

    /// Create a timer with a target drawn from `range`
    pub fn random(range: Range<Duration>) -> Result<Self, TimingError> {
        Self::from_spec(TargetSpec::random(range)?)
    }

    pub fn from_spec(spec: TargetSpec) -> Result<Self, TimingError> {
        Self::with_random_source(spec, OsRandom)
    }

    /// Create a timer drawing random targets from `source`
    pub fn with_random_source(
        spec: TargetSpec,
        source: impl RandomSource + Send + 'static,
    ) -> Result<Self, TimingError> {
        let mut timer = Self {
            target_nanos: 0,
            total_elapsed_nanos: 0,
            finished: true,
            random: Box::new(source),
        };
        timer.apply_spec(&spec)?;
        Ok(timer)
    }

    // ─── Targets ────────────────────────────────────────────────────────────

    pub fn set_target_nanos(&mut self, target_nanos: i64) -> Result<(), TimingError> {
        if target_nanos < 0 {
            return Err(TimingError::NegativeTarget(target_nanos));
        }
        self.target_nanos = target_nanos;
        self.update_finished();
        Ok(())
    }

    pub fn set_target_millis(&mut self, target_millis: i64) -> Result<(), TimingError> {
        self.set_target_nanos(millis_to_nanos(target_millis)?)
    }

    pub fn set_target(&mut self, target: Duration) -> Result<(), TimingError> {
        self.set_target_nanos(duration_to_nanos(target)?)
    }

    /// Draw a new target from `[lower, upper)` nanoseconds.
    ///
    /// The draw happens once, here.
    pub fn set_target_random_nanos(&mut self, lower: i64, upper: i64) -> Result<(), TimingError> {
        validate_range(lower, upper)?;
        let target = draw_in_range(self.random.as_mut(), lower, upper)?;
        self.set_target_nanos(target)
    }

    pub fn set_target_random_millis(&mut self, lower: i64, upper: i64) -> Result<(), TimingError> {
        self.set_target_random_nanos(millis_to_nanos(lower)?, millis_to_nanos(upper)?)
    }

    pub fn set_target_random(&mut self, range: Range<Duration>) -> Result<(), TimingError> {
        self.set_target_random_nanos(duration_to_nanos(range.start)?, duration_to_nanos(range.end)?)
    }

    /// Set the target as described by `spec` (random specs draw anew)
    pub fn apply_spec(&mut self, spec: &TargetSpec) -> Result<(), TimingError> {
        match *spec {
            TargetSpec::Fixed(nanos) => self.set_target_nanos(nanos),
            TargetSpec::Random { lower, upper } => self.set_target_random_nanos(lower, upper),
        }
    }

    fn resolve_spec(&mut self, spec: &TargetSpec) -> Result<i64, TimingError> {
        spec.validate()?;
        match *spec {
            TargetSpec::Fixed(nanos) => Ok(nanos),
            TargetSpec::Random { lower, upper } => draw_in_range(self.random.as_mut(), lower, upper),
        }
    }

    // ─── Elapsed time ───────────────────────────────────────────────────────

    pub fn add_elapsed_nanos(&mut self, elapsed_nanos: i64) -> Result<(), TimingError> {
        if elapsed_nanos < 0 {
            return Err(TimingError::NegativeElapsed(elapsed_nanos));
        }
        self.total_elapsed_nanos = self
            .total_elapsed_nanos
            .checked_add(elapsed_nanos)
            .ok_or(TimingError::Overflow)?;
        self.update_finished();
        Ok(())
    }

    pub fn add_elapsed_millis(&mut self, elapsed_millis: i64) -> Result<(), TimingError> {
        self.add_elapsed_nanos(millis_to_nanos(elapsed_millis)?)
    }

    pub fn add_elapsed(&mut self, elapsed: Duration) -> Result<(), TimingError> {
        self.add_elapsed_nanos(duration_to_nanos(elapsed)?)
    }

    pub fn reset_elapsed(&mut self) {
        self.total_elapsed_nanos = 0;
        self.update_finished();
    }

    /// Start the next cycle with the time that went past the target.
    ///
    /// Keeps successive cycles aligned with real elapsed time instead of
    /// dropping the overshoot.
    pub fn reset_elapsed_past_target(&mut self) -> Result<(), TimingError> {
        if self.total_elapsed_nanos < self.target_nanos {
            return Err(TimingError::TargetNotReached {
                elapsed: self.total_elapsed_nanos,
                target: self.target_nanos,
            });
        }
        self.total_elapsed_nanos -= self.target_nanos;
        self.update_finished();
        Ok(())
    }

    /// Carry the overshoot into a new cycle whose target comes from `spec`.
    ///
    /// The next target is resolved before anything changes, so a failed
    /// draw leaves the timer finished with its elapsed time intact.
    pub(crate) fn rearm_past_target(&mut self, spec: &TargetSpec) -> Result<(), TimingError> {
        if self.total_elapsed_nanos < self.target_nanos {
            return Err(TimingError::TargetNotReached {
                elapsed: self.total_elapsed_nanos,
                target: self.target_nanos,
            });
        }
        let next_target = self.resolve_spec(spec)?;

        self.total_elapsed_nanos -= self.target_nanos;
        self.target_nanos = next_target;
        self.update_finished();
        Ok(())
    }

    fn update_finished(&mut self) {
        self.finished = self.total_elapsed_nanos >= self.target_nanos;
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn target(&self) -> Duration {
        nanos_to_duration(self.target_nanos)
    }

    pub fn target_nanos(&self) -> i64 {
        self.target_nanos
    }

    pub fn elapsed(&self) -> Duration {
        nanos_to_duration(self.total_elapsed_nanos)
    }

    pub fn elapsed_nanos(&self) -> i64 {
        self.total_elapsed_nanos
    }

    /// Time left until the target, zero once reached
    pub fn remaining(&self) -> Duration {
        nanos_to_duration(self.target_nanos - self.total_elapsed_nanos)
    }
}

impl fmt::Debug for TargetTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetTimer")
            .field("target_nanos", &self.target_nanos)
            .field("total_elapsed_nanos", &self.total_elapsed_nanos)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
