//! Casegen configuration
//!
//! Layers an optional TOML file and `CASEGEN_*` environment variables over
//! the built-in taxonomy, templates and scoring, validates the result, and
//! installs the tracing subscriber.

pub mod error;
pub mod logging;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::{ConfigManager, DEFAULT_ENV_PREFIX};
pub use types::{CaseGenConfig, LoggingConfig, TemplatesConfig};
