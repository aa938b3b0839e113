//! Tracing initialization for the harness binary.
//!
//! Builds an `EnvFilter` from the configured log level, letting `RUST_LOG` take
//! precedence when set, and installs a fmt subscriber.

use crate::error::HarnessError;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber at the given level.
///
/// Calling this twice returns an error from the subscriber installation, which
/// is surfaced as a configuration error.
pub fn init(level: &str) -> Result<(), HarnessError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| HarnessError::Configuration(format!("tracing init failed: {err}")))
}
