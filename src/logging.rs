//! Logging setup shared by both binaries
//!
//! Logs go to stderr so stdout carries only the report.

use crate::cli::Verbosity;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, otherwise the verbosity default
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    tracing::debug!(verbosity = verbosity.as_str(), "logging initialised");
}
