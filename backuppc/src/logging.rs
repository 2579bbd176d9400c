// SPDX-License-Identifier: AGPL-3.0-or-later
//! Logging setup
//!
//! Everything goes to stderr: stdout is reserved for fact and catalog
//! output, which the agent parses.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Pick the effective level from the CLI flags and the configured default
pub fn effective_level(debug: bool, verbose: bool, configured: &str) -> String {
    if debug {
        "debug".to_string()
    } else if verbose {
        "info".to_string()
    } else {
        configured.to_string()
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init(level: &str, logging: &LoggingConfig, with_target: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(with_target)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(with_target)
            .with_writer(std::io::stderr)
            .init();
    }
}
