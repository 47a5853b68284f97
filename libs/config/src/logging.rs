//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::EnvFilter;

/// Install a formatted tracing subscriber at `level`.
///
/// Safe to call more than once (tests call it per case); later calls are no-ops.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
