//! Tests for RateCounter frame bookkeeping
//!
//! Frames are 1000 ms unless stated otherwise.

use std::time::Duration;

use proptest::prelude::*;

use super::RateCounter;
use crate::clock::ManualClock;
use crate::error::TimingError;

const EPSILON: f64 = 0.001;
const ONE_SECOND_NS: i64 = 1_000_000_000;

fn counter() -> RateCounter<ManualClock> {
    RateCounter::with_clock(Duration::from_secs(1), ManualClock::new()).unwrap()
}

fn assert_rate(counter: &RateCounter<ManualClock>, expected: f64) {
    let rate = counter.current_rate();
    assert!(
        (rate - expected).abs() < EPSILON,
        "expected rate {expected}, got {rate}"
    );
}

#[test]
fn test_no_time_passed() {
    let counter = counter();
    assert_rate(&counter, 0.0);
    assert!(!counter.is_started());
}

#[test]
fn test_almost_full_frame_passed() {
    let mut counter = counter();
    counter.add_actions_millis(1, 999).unwrap();
    assert_rate(&counter, 0.0);
}

#[test]
fn test_exactly_one_frame_passed_keeps_frame_open() {
    let mut counter = counter();
    counter.add_actions_millis(1, 1000).unwrap();
    assert_rate(&counter, 0.0);
    assert_eq!(counter.elapsed_in_frame(), Some(Duration::from_secs(1)));
}

#[test]
fn test_just_after_one_frame_splits_the_action() {
    let mut counter = counter();
    counter.add_actions_millis(1, 1001).unwrap();
    assert_rate(&counter, 1000.0 / 1001.0);
}

#[test]
fn test_one_full_frame_then_almost_another() {
    let mut counter = counter();
    counter.add_actions_millis(1, 1000).unwrap();
    counter.add_actions_millis(1000, 999).unwrap();
    assert_rate(&counter, 1.0);
}

#[test]
fn test_two_full_frames() {
    let mut counter = counter();
    counter.add_actions_millis(1, 1000).unwrap();
    counter.add_actions_millis(1000, 1000).unwrap();
    assert_rate(&counter, 1.0);

    counter.add_actions_millis(0, 1).unwrap();
    assert_rate(&counter, 1000.0);
}

#[test]
fn test_actions_landing_on_the_edge_stay_in_the_open_frame() {
    let mut counter = counter();
    counter.add_actions_millis(1, 999).unwrap();
    assert_rate(&counter, 0.0);

    // Lands exactly on the boundary, frame stays open
    counter.add_actions_millis(1, 1).unwrap();
    assert_rate(&counter, 0.0);
    assert!((counter.count_in_current_frame() - 2.0).abs() < EPSILON);

    counter.add_actions_millis(1000, 999).unwrap();
    assert_rate(&counter, 2.0);
    counter.add_actions_millis(0, 1).unwrap();
    assert_rate(&counter, 2.0);

    counter.add_actions_millis(0, 1).unwrap();
    assert_rate(&counter, 1000.0);
}

#[test]
fn test_actions_split_over_frame() {
    let mut counter = counter();
    counter.add_actions_millis(0, 600).unwrap();
    counter.add_actions_millis(1000, 500).unwrap();
    assert_rate(&counter, 800.0);

    counter.add_actions_millis(0, 900).unwrap();
    assert_rate(&counter, 800.0);

    counter.add_actions_millis(0, 1).unwrap();
    assert_rate(&counter, 200.0);
}

#[test]
fn test_actions_split_over_frame_in_nanoseconds() {
    let mut counter = counter();
    counter.add_actions_nanos(0, 600 * 1_000_000).unwrap();
    counter.add_actions_nanos(1000, 500 * 1_000_000).unwrap();
    assert_rate(&counter, 800.0);

    counter.add_actions_nanos(0, 900 * 1_000_000).unwrap();
    assert_rate(&counter, 800.0);

    counter.add_actions_nanos(0, 1_000_000).unwrap();
    assert_rate(&counter, 200.0);
}

#[test]
fn test_actions_over_duration() {
    let mut counter = counter();
    counter.add_actions(0, Duration::from_millis(600)).unwrap();
    counter.add_actions(1000, Duration::from_millis(500)).unwrap();
    assert_rate(&counter, 800.0);
}

#[test]
fn test_actions_spanning_many_frames() {
    let mut counter = counter();
    counter.add_actions_millis(100, 5500).unwrap();
    assert_rate(&counter, 18.1818);

    counter.add_actions_millis(200, 5500).unwrap();
    assert_rate(&counter, 36.3636);

    // Not a full frame yet
    counter.add_actions_millis(100, 750).unwrap();
    assert_rate(&counter, 36.3636);

    // The 100 actions of the open frame are dropped with the skipped frames
    counter.add_actions_millis(100, 5000).unwrap();
    assert_rate(&counter, 20.0);

    counter.add_actions_millis(0, 250).unwrap();
    assert_rate(&counter, 20.0);

    counter.add_actions_millis(0, 1).unwrap();
    assert_rate(&counter, 15.0);
}

#[test]
fn test_skipping_to_an_exact_boundary_opens_an_empty_frame() {
    let mut counter = counter();
    counter.add_actions_millis(300, 3000).unwrap();
    assert_rate(&counter, 100.0);
    assert_eq!(counter.elapsed_in_frame(), Some(Duration::ZERO));
    assert_eq!(counter.count_in_current_frame(), 0.0);
}

#[test]
fn test_zero_actions_and_zero_time() {
    let mut counter = counter();
    counter.add_actions_millis(0, 0).unwrap();
    assert!(counter.is_started());
    counter.add_actions_millis(5, 0).unwrap();
    assert_rate(&counter, 0.0);
    assert!((counter.count_in_current_frame() - 5.0).abs() < EPSILON);
}

#[test]
fn test_rate_only_changes_when_a_frame_closes() {
    let mut counter = counter();
    for _ in 0..9 {
        counter.add_actions_millis(10, 100).unwrap();
        assert_rate(&counter, 0.0);
    }
    counter.add_actions_millis(10, 100).unwrap();
    assert_rate(&counter, 0.0);
    counter.add_actions_millis(0, 1).unwrap();
    assert_rate(&counter, 100.0);
}

#[test]
fn test_reset_returns_to_not_started() {
    let mut counter = counter();
    counter.add_actions_millis(100, 1500).unwrap();
    assert!(counter.current_rate() > 0.0);

    counter.reset();
    assert!(!counter.is_started());
    assert_rate(&counter, 0.0);
    assert_eq!(counter.count_in_current_frame(), 0.0);
}

// ─── Self-timed updates ─────────────────────────────────────────────────────

#[test]
fn test_self_timed_updates_follow_the_clock() {
    let clock = ManualClock::new();
    let mut counter = RateCounter::with_clock(Duration::from_secs(1), clock.clone()).unwrap();

    // First call only starts the clock
    counter.add_actions_now(0).unwrap();
    clock.advance(Duration::from_millis(800));
    counter.add_actions_now(1000).unwrap();
    assert_rate(&counter, 0.0);

    clock.advance(Duration::from_millis(500));
    counter.add_actions_now(0).unwrap();
    assert_rate(&counter, 1000.0);

    clock.advance(Duration::from_millis(1100));
    counter.add_actions_now(0).unwrap();
    assert_rate(&counter, 0.0);
}

#[test]
fn test_self_timed_and_explicit_updates_share_the_timeline() {
    let clock = ManualClock::new();
    let mut counter = RateCounter::with_clock(Duration::from_secs(1), clock.clone()).unwrap();

    counter.add_actions_now(0).unwrap();
    clock.advance(Duration::from_millis(700));

    // Explicitly report 600 ms of the 700 ms that passed
    counter.add_actions_millis(0, 600).unwrap();

    // Only the remaining 100 ms is measured here
    counter.add_actions_now(0).unwrap();
    assert_eq!(counter.elapsed_in_frame(), Some(Duration::from_millis(700)));
}

#[test]
fn test_clock_going_backwards_counts_as_no_time() {
    let clock = ManualClock::new();
    clock.set_nanos(ONE_SECOND_NS);
    let mut counter = RateCounter::with_clock(Duration::from_secs(1), clock.clone()).unwrap();

    counter.add_actions_now(0).unwrap();
    clock.set_nanos(ONE_SECOND_NS / 2);
    counter.add_actions_now(7).unwrap();

    assert_eq!(counter.elapsed_in_frame(), Some(Duration::ZERO));
    assert!((counter.count_in_current_frame() - 7.0).abs() < EPSILON);
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[test]
fn test_negative_time_is_rejected() {
    let mut counter = counter();
    let err = counter.add_actions_nanos(100, -1).unwrap_err();
    assert!(matches!(err, TimingError::NegativeElapsed(-1)));
    assert!(!counter.is_started());
}

#[test]
fn test_negative_actions_are_rejected() {
    let mut counter = counter();
    assert!(matches!(
        counter.add_actions_nanos(-1, 100),
        Err(TimingError::NegativeActionCount(-1))
    ));
    assert!(matches!(
        counter.add_actions_now(-1),
        Err(TimingError::NegativeActionCount(-1))
    ));
    assert!(!counter.is_started());
}

#[test]
fn test_overflowing_update_leaves_state_untouched() {
    let mut counter = counter();
    counter.add_actions_millis(3, 500).unwrap();

    assert!(matches!(
        counter.add_actions_nanos(1, i64::MAX),
        Err(TimingError::Overflow)
    ));
    assert_eq!(counter.elapsed_in_frame(), Some(Duration::from_millis(500)));
    assert!((counter.count_in_current_frame() - 3.0).abs() < EPSILON);
}

#[test]
fn test_frame_length_must_be_positive() {
    assert!(matches!(
        RateCounter::from_nanos(0),
        Err(TimingError::InvalidFrameLength(0))
    ));
    assert!(RateCounter::new(Duration::ZERO).is_err());
    assert!(RateCounter::new(Duration::from_millis(16)).is_ok());
}

// ─── Properties ─────────────────────────────────────────────────────────────

proptest! {
    /// Splitting a steady stream of actions into two reports lands in the
    /// same state as reporting it at once.
    #[test]
    fn split_reports_match_single_report(
        prefix_count in 0i64..50,
        prefix_ms in 0i64..1000,
        rate in 0i64..20,
        first_ms in 0i64..4000,
        second_ms in 1i64..4000,
    ) {
        // Landing exactly on a boundary after skipping frames is represented
        // differently from landing there frame by frame.
        prop_assume!((prefix_ms + first_ms + second_ms) % 1000 != 0);

        let mut whole = counter();
        let mut split = counter();
        for c in [&mut whole, &mut split] {
            c.add_actions_millis(prefix_count, prefix_ms).unwrap();
        }

        whole
            .add_actions_millis(rate * (first_ms + second_ms), first_ms + second_ms)
            .unwrap();
        split.add_actions_millis(rate * first_ms, first_ms).unwrap();
        split.add_actions_millis(rate * second_ms, second_ms).unwrap();

        prop_assert!((whole.current_rate() - split.current_rate()).abs() < 1e-6);
        prop_assert!(
            (whole.count_in_current_frame() - split.count_in_current_frame()).abs() < 1e-6
        );
        prop_assert_eq!(whole.elapsed_in_frame(), split.elapsed_in_frame());
    }

    #[test]
    fn elapsed_in_frame_never_exceeds_frame(
        updates in proptest::collection::vec((0i64..100, 0i64..5000), 1..20)
    ) {
        let mut counter = counter();
        for (count, ms) in updates {
            let before = counter.current_rate();
            let was_elapsed = counter.elapsed_in_frame().unwrap_or_default();
            counter.add_actions_millis(count, ms).unwrap();

            let elapsed = counter.elapsed_in_frame().unwrap();
            prop_assert!(elapsed <= counter.frame_length());

            // No boundary crossed, nothing published
            if was_elapsed + Duration::from_millis(ms as u64) <= counter.frame_length() {
                prop_assert_eq!(before, counter.current_rate());
            }
        }
    }
}
