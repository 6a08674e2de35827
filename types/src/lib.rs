//! Shared configuration types for cadence
//!
//! This crate contains serializable definitions for timers and rate counters.
//! They carry no runtime state; `cadence-core` turns them into live
//! `ObservableTargetTimer` and `RateCounter` instances.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Timer Targets
// ─────────────────────────────────────────────────────────────────────────────

/// How a timer picks its target duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TargetDefinition {
    /// Same target every cycle
    Fixed {
        /// Target in milliseconds
        ms: u64,
    },

    /// Target drawn uniformly from `[min_ms, max_ms)` every cycle
    Random {
        /// Inclusive lower bound in milliseconds
        min_ms: u64,
        /// Exclusive upper bound in milliseconds
        max_ms: u64,
    },
}

impl TargetDefinition {
    /// Check the bounds without building anything.
    /// Returns a human readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            TargetDefinition::Fixed { .. } => Ok(()),
            TargetDefinition::Random { min_ms, max_ms } => {
                if max_ms < 1 {
                    Err("random target max_ms must be at least 1".to_string())
                } else if max_ms <= min_ms {
                    Err(format!(
                        "random target max_ms ({max_ms}) must be greater than min_ms ({min_ms})"
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl Default for TargetDefinition {
    fn default() -> Self {
        TargetDefinition::Fixed { ms: 1000 }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Definitions
// ─────────────────────────────────────────────────────────────────────────────

/// Definition of a repeating target timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerDefinition {
    /// Unique identifier for this timer
    pub id: String,

    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether this timer should be built at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Target duration settings
    #[serde(default)]
    pub target: TargetDefinition,
}

impl TimerDefinition {
    /// Display name, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Definition of an action-rate counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterDefinition {
    /// Unique identifier for this counter
    pub id: String,

    /// Length of one counting frame in milliseconds
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Top-level configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default)]
    pub timers: Vec<TimerDefinition>,

    #[serde(default)]
    pub counters: Vec<CounterDefinition>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Serde Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn default_true() -> bool {
    true
}

fn default_frame_ms() -> u64 {
    1000
}
