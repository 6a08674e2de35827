//! Actions-per-time-frame counter
//!
//! A `RateCounter` buckets actions into fixed-length frames and publishes the
//! count of the last *fully elapsed* frame. It never reports the frame that is
//! still accumulating, so readers always see a settled number.
//!
//! The counter does not observe anything itself: callers report how many
//! actions happened and how much time passed since the previous report.
//! When a report crosses a frame boundary its actions are split between the
//! frames in proportion to the time that fell into each one.
//!
//! # Example
//!
//! With a 1000 ms frame, reporting 1000 actions over 500 ms after 600 ms had
//! already elapsed publishes 800 (the 400 ms before the boundary) and starts
//! the next frame with 200.

use std::time::Duration;

use crate::clock::{Clock, MonotonicClock};
use crate::error::TimingError;
use crate::units::{duration_to_nanos, millis_to_nanos, nanos_to_duration};

/// Counts actions per fixed time frame.
///
/// Not thread safe; the owner drives every update.
#[derive(Debug, Clone)]
pub struct RateCounter<C: Clock = MonotonicClock> {
    frame_nanos: i64,

    /// Actions accumulated in the open frame
    count_in_current_frame: f64,

    /// Published value: actions in the last closed frame
    count_in_last_frame: f64,

    /// Time spent in the open frame; `None` until the first update
    elapsed_in_frame: Option<i64>,

    /// Clock reading matching the last update, advanced by each update's
    /// elapsed time rather than re-sampled
    last_update_clock: i64,

    clock: C,
}

impl RateCounter {
    /// Create a counter using the process monotonic clock
    pub fn new(frame: Duration) -> Result<Self, TimingError> {
        Self::with_clock(frame, MonotonicClock::new())
    }

    pub fn from_nanos(frame_nanos: i64) -> Result<Self, TimingError> {
        Self::with_clock_nanos(frame_nanos, MonotonicClock::new())
    }
}

impl<C: Clock> RateCounter<C> {
    /// Create a counter reading self-timed updates from `clock`
    pub fn with_clock(frame: Duration, clock: C) -> Result<Self, TimingError> {
        Self::with_clock_nanos(duration_to_nanos(frame)?, clock)
    }

    pub fn with_clock_nanos(frame_nanos: i64, clock: C) -> Result<Self, TimingError> {
        if frame_nanos <= 0 {
            return Err(TimingError::InvalidFrameLength(frame_nanos));
        }

        Ok(Self {
            frame_nanos,
            count_in_current_frame: 0.0,
            count_in_last_frame: 0.0,
            elapsed_in_frame: None,
            last_update_clock: 0,
            clock,
        })
    }

    // ─── Updates ────────────────────────────────────────────────────────────

    /// Report `count` actions over `elapsed`
    pub fn add_actions(&mut self, count: u32, elapsed: Duration) -> Result<(), TimingError> {
        self.add_actions_nanos(i64::from(count), duration_to_nanos(elapsed)?)
    }

    pub fn add_actions_millis(&mut self, count: i64, elapsed_millis: i64) -> Result<(), TimingError> {
        self.add_actions_nanos(count, millis_to_nanos(elapsed_millis)?)
    }

    /// Report `count` actions, measuring elapsed time since the previous
    /// self-timed report with the counter's clock.
    ///
    /// The first call only starts the clock. A clock that steps backwards
    /// counts as zero elapsed time.
    pub fn add_actions_now(&mut self, count: i64) -> Result<(), TimingError> {
        if count < 0 {
            return Err(TimingError::NegativeActionCount(count));
        }
        // The first call only seeds the clock reading
        let delta = match self.elapsed_in_frame {
            None => 0,
            Some(_) => {
                let delta = self.clock.now_nanos().saturating_sub(self.last_update_clock);
                if delta < 0 {
                    tracing::warn!(delta_ns = delta, "clock stepped backwards, treating as no elapsed time");
                }
                delta.max(0)
            }
        };

        self.add_actions_nanos(count, delta)
    }

    /// Report `count` actions over `elapsed_nanos` nanoseconds.
    ///
    /// This is the primitive every other update goes through.
    pub fn add_actions_nanos(&mut self, count: i64, elapsed_nanos: i64) -> Result<(), TimingError> {
        if count < 0 {
            return Err(TimingError::NegativeActionCount(count));
        }
        if elapsed_nanos < 0 {
            return Err(TimingError::NegativeElapsed(elapsed_nanos));
        }

        let elapsed_before = self.elapsed_in_frame.unwrap_or(0);
        let new_elapsed = elapsed_before
            .checked_add(elapsed_nanos)
            .ok_or(TimingError::Overflow)?;

        if self.elapsed_in_frame.is_none() {
            self.start();
        }

        let frame = self.frame_nanos;
        let count = count as f64;

        if new_elapsed <= frame {
            // Everything stays in the open frame
            self.elapsed_in_frame = Some(new_elapsed);
            self.count_in_current_frame += count;
            tracing::trace!(
                elapsed_ns = new_elapsed,
                count = self.count_in_current_frame,
                "actions added to open frame"
            );
        } else if new_elapsed - frame <= frame {
            self.cross_one_boundary(count, elapsed_before, elapsed_nanos, new_elapsed);
        } else {
            self.skip_frames(count, elapsed_before, elapsed_nanos);
        }

        self.last_update_clock = self.last_update_clock.saturating_add(elapsed_nanos);
        Ok(())
    }

    /// The open frame closes inside this update and a new one opens.
    fn cross_one_boundary(&mut self, count: f64, elapsed_before: i64, delta: i64, new_elapsed: i64) {
        let frame = self.frame_nanos;
        let closing_share = frame - elapsed_before;
        let opening_share = new_elapsed - frame;

        let for_closing = if delta == 0 {
            0.0
        } else {
            count * closing_share as f64 / delta as f64
        };

        self.publish(self.count_in_current_frame + for_closing);
        self.count_in_current_frame = count - for_closing;
        self.elapsed_in_frame = Some(opening_share);
    }

    /// The update spans three or more boundaries.
    ///
    /// Whatever the open frame held is dropped along with every skipped frame.
    /// The frame just before the new open one is published with a full
    /// frame's share of `count`, and the new open frame gets the share of its
    /// own elapsed part. Shares are weighted against the whole `delta`.
    fn skip_frames(&mut self, count: f64, elapsed_before: i64, delta: i64) {
        let frame = self.frame_nanos;
        let past_closing = delta - (frame - elapsed_before);
        let tail = past_closing % frame;

        let delta = delta as f64;
        let last = count * frame as f64 / delta;
        let current = count * tail as f64 / delta;

        tracing::trace!(
            skipped_frames = past_closing / frame,
            tail_ns = tail,
            "update skipped whole frames"
        );

        self.publish(last);
        self.count_in_current_frame = current;
        self.elapsed_in_frame = Some(tail);
    }

    fn publish(&mut self, count: f64) {
        self.count_in_last_frame = count;
        self.count_in_current_frame = 0.0;
        tracing::debug!(rate = count, "frame closed");
    }

    fn start(&mut self) {
        self.elapsed_in_frame = Some(0);
        self.last_update_clock = self.clock.now_nanos();
    }

    /// Forget all counts and return to the not-started state
    pub fn reset(&mut self) {
        self.count_in_current_frame = 0.0;
        self.count_in_last_frame = 0.0;
        self.elapsed_in_frame = None;
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    /// Actions in the last fully elapsed frame
    pub fn current_rate(&self) -> f64 {
        self.count_in_last_frame
    }

    pub fn count_in_current_frame(&self) -> f64 {
        self.count_in_current_frame
    }

    pub fn elapsed_in_frame(&self) -> Option<Duration> {
        self.elapsed_in_frame.map(nanos_to_duration)
    }

    pub fn frame_length(&self) -> Duration {
        nanos_to_duration(self.frame_nanos)
    }

    pub fn is_started(&self) -> bool {
        self.elapsed_in_frame.is_some()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
