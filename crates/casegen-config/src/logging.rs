//! Tracing subscriber setup

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, Result};
use crate::types::LoggingConfig;

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over `config.level`. Calling this again after
/// a subscriber is installed leaves the existing one in place.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| ConfigError::Logging(format!("invalid filter '{}': {}", config.level, e)))?,
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(config.with_target)
        .try_init();

    if installed.is_err() {
        debug!("Tracing subscriber already installed");
    }
    Ok(())
}
