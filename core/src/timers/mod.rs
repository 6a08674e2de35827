//! Timer system
//!
//! This module provides:
//! - **TargetTimer**: accumulates elapsed time against a fixed or random target
//! - **ObservableTargetTimer**: notifies observers and re-arms on every target
//! - **TimerManager**: owns timers and counters built from config
//!
//! Nothing here runs on its own thread. The owner feeds elapsed time and the
//! timers react synchronously within that call.

mod definition;
mod manager;
mod observable;
mod observer;
mod target;


pub use manager::{TimerCompletion, TimerManager};
pub use observable::ObservableTargetTimer;
pub use observer::{ObserverSet, TargetObserver};
pub use target::{TargetSpec, TargetTimer};
