//! Error types for counters, timers and config loading

use std::path::PathBuf;
use thiserror::Error;

/// Contract violations reported by counters, timers and observer sets.
///
/// These are caller mistakes, not transient failures. Every operation that
/// returns one leaves the receiver exactly as it was.
#[derive(Debug, Error)]
pub enum TimingError {
    #[error("number of actions has to be non negative (got {0})")]
    NegativeActionCount(i64),

    #[error("elapsed time has to be non negative (got {0} ns)")]
    NegativeElapsed(i64),

    #[error("target time cannot be negative (got {0} ns)")]
    NegativeTarget(i64),

    #[error("invalid random target range [{lower}, {upper}) ns: {reason}")]
    InvalidRandomRange {
        lower: i64,
        upper: i64,
        reason: &'static str,
    },

    #[error("total elapsed time {elapsed} ns has not reached target {target} ns yet")]
    TargetNotReached { elapsed: i64, target: i64 },

    #[error("frame length must be positive (got {0} ns)")]
    InvalidFrameLength(i64),

    #[error("time value overflows the nanosecond range")]
    Overflow,

    #[error("observer is already registered")]
    ObserverAlreadyRegistered,

    #[error("observer was not registered")]
    ObserverNotRegistered,

    #[error("random source failed")]
    Entropy(#[from] getrandom::Error),
}

/// Errors during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config file {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load user configuration")]
    UserConfig(#[from] confy::ConfyError),

    #[error("invalid definition {id}: {reason}")]
    InvalidDefinition { id: String, reason: String },

    #[error("duplicate id {0}")]
    DuplicateId(String),

    #[error(transparent)]
    Timing(#[from] TimingError),
}
