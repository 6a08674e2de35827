//! Timer and counter management
//!
//! Owns the timers and counters built from a `TimingConfig` and feeds them
//! elapsed time from a single update loop.

use std::sync::Arc;
use std::time::Duration;

use hashbrown::HashMap;

use crate::config::TimingConfig;
use crate::error::{ConfigError, TimingError};
use crate::rate::RateCounter;
use crate::units::duration_to_nanos;

use super::definition::{build_counter, build_timer};
use super::observable::ObservableTargetTimer;
use super::observer::TargetObserver;

/// A timer that reached its target during `TimerManager::advance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerCompletion {
    pub timer_id: String,
    /// Number of targets reached in this update
    pub count: u32,
}

/// Keyed collection of timers and counters
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: HashMap<String, ObservableTargetTimer>,
    counters: HashMap<String, RateCounter>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every enabled timer and counter in `config`
    pub fn from_config(config: &TimingConfig) -> Result<Self, ConfigError> {
        crate::config::validate_config(config)?;

        let mut manager = Self::new();
        for def in config.timers.iter().filter(|t| t.enabled) {
            manager.timers.insert(def.id.clone(), build_timer(def)?);
        }
        for def in config.counters.iter().filter(|c| c.enabled) {
            manager.counters.insert(def.id.clone(), build_counter(def)?);
        }

        tracing::info!(
            timers = manager.timers.len(),
            counters = manager.counters.len(),
            "timer manager built from config"
        );
        Ok(manager)
    }

    pub fn insert_timer(&mut self, id: impl Into<String>, timer: ObservableTargetTimer) {
        self.timers.insert(id.into(), timer);
    }

    pub fn insert_counter(&mut self, id: impl Into<String>, counter: RateCounter) {
        self.counters.insert(id.into(), counter);
    }

    pub fn remove_timer(&mut self, id: &str) -> Option<ObservableTargetTimer> {
        self.timers.remove(id)
    }

    /// Register an observer on the timer with this id.
    /// Returns `Ok(false)` when no such timer exists.
    pub fn observe(&self, id: &str, observer: Arc<dyn TargetObserver>) -> Result<bool, TimingError> {
        match self.timers.get(id) {
            Some(timer) => timer.add_observer(observer).map(|()| true),
            None => Ok(false),
        }
    }

    /// Add elapsed time to every timer.
    ///
    /// Completions are returned sorted by timer id. Overflow in any timer is
    /// detected before a single timer is touched.
    pub fn advance(&mut self, elapsed: Duration) -> Result<Vec<TimerCompletion>, TimingError> {
        let nanos = duration_to_nanos(elapsed)?;

        if let Some((id, _)) = self
            .timers
            .iter()
            .find(|(_, timer)| timer.elapsed_nanos().checked_add(nanos).is_none())
        {
            tracing::warn!(timer_id = %id, elapsed_ns = nanos, "advance would overflow timer");
            return Err(TimingError::Overflow);
        }

        let mut completions = Vec::new();
        for (id, timer) in self.timers.iter_mut() {
            let count = timer.add_elapsed_nanos(nanos)?;
            if count > 0 {
                completions.push(TimerCompletion {
                    timer_id: id.clone(),
                    count,
                });
            }
        }

        completions.sort_by(|a, b| a.timer_id.cmp(&b.timer_id));
        Ok(completions)
    }

    /// Report actions to a counter, measured with its own clock.
    /// Returns `Ok(false)` when no such counter exists.
    pub fn record_actions(&mut self, id: &str, count: i64) -> Result<bool, TimingError> {
        match self.counters.get_mut(id) {
            Some(counter) => counter.add_actions_now(count).map(|()| true),
            None => Ok(false),
        }
    }

    // ─── Lookups ────────────────────────────────────────────────────────────

    pub fn timer(&self, id: &str) -> Option<&ObservableTargetTimer> {
        self.timers.get(id)
    }

    pub fn timer_mut(&mut self, id: &str) -> Option<&mut ObservableTargetTimer> {
        self.timers.get_mut(id)
    }

    pub fn counter(&self, id: &str) -> Option<&RateCounter> {
        self.counters.get(id)
    }

    pub fn counter_mut(&mut self, id: &str) -> Option<&mut RateCounter> {
        self.counters.get_mut(id)
    }

    /// Timer ids, sorted
    pub fn timer_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.timers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Counter ids, sorted
    pub fn counter_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.counters.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
