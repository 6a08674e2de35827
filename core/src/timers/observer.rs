//! Observer registration for timer events
//!
//! `ObserverSet` holds shared observers keyed by identity (the `Arc`
//! allocation), not by value. Registration and removal lock the set so they
//! may be called from any thread; notification works on a snapshot taken by
//! the thread driving the timer.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::TimingError;

use super::observable::ObservableTargetTimer;

/// Reacts to an `ObservableTargetTimer` reaching its target.
///
/// By the time this runs the timer has already carried its overshoot and
/// re-armed from its last target settings. An observer that wants a
/// different target can set one on the passed timer and it will stick.
pub trait TargetObserver: Send + Sync {
    fn target_passed(&self, timer: &mut ObservableTargetTimer);
}

impl<F> TargetObserver for F
where
    F: Fn(&mut ObservableTargetTimer) + Send + Sync,
{
    fn target_passed(&self, timer: &mut ObservableTargetTimer) {
        self(timer)
    }
}

/// Set of observers with add/remove contract checks
pub struct ObserverSet<T: ?Sized> {
    observers: Mutex<Vec<Arc<T>>>,
}

impl<T: ?Sized> ObserverSet<T> {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Register an observer. Registering the same `Arc` twice is an error.
    pub fn add(&self, observer: Arc<T>) -> Result<(), TimingError> {
        let mut observers = self.lock();
        if observers.iter().any(|o| same_observer(o, &observer)) {
            return Err(TimingError::ObserverAlreadyRegistered);
        }
        observers.push(observer);
        Ok(())
    }

    /// Unregister an observer. Removing one that isn't registered is an error.
    pub fn remove(&self, observer: &Arc<T>) -> Result<(), TimingError> {
        let mut observers = self.lock();
        let index = observers
            .iter()
            .position(|o| same_observer(o, observer))
            .ok_or(TimingError::ObserverNotRegistered)?;
        observers.swap_remove(index);
        Ok(())
    }

    pub fn contains(&self, observer: &Arc<T>) -> bool {
        self.lock().iter().any(|o| same_observer(o, observer))
    }

    /// Copy of the current observers, safe to iterate while the set changes
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<T>>> {
        // A panicking observer can't leave the Vec half-updated
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn same_observer<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl<T: ?Sized> Default for ObserverSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for ObserverSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSet")
            .field("len", &self.len())
            .finish()
    }
}
