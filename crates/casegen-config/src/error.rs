//! Configuration error types

use casegen_generation::{GenerationError, TemplateError};
use casegen_parser::ParseError;
use thiserror::Error;

/// Configuration result type
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid taxonomy: {0}")]
    Taxonomy(#[from] ParseError),

    #[error("Template catalog error: {0}")]
    Template(#[from] TemplateError),

    #[error("Generation setup error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Logging setup error: {0}")]
    Logging(String),
}
