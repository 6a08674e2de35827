//! Logging setup for applications embedding cadence
//!
//! The library itself only emits `tracing` events. Applications that don't
//! install their own subscriber can call [`init`] early in `main`.
//! Set `DEBUG_LOGGING=1` to see per-frame and per-target debug output.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Install a stdout subscriber.
///
/// `RUST_LOG` wins when set. Otherwise INFO+, with DEBUG for cadence crates
/// when `DEBUG_LOGGING` is set. Returns `false` if a global subscriber was
/// already installed.
pub fn init() -> bool {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug_logging)));

    let installed = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(debug_logging, "cadence logging initialized");
    }
    installed
}

fn default_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,cadence_core=debug,cadence_types=debug"
    } else {
        "info"
    }
}
