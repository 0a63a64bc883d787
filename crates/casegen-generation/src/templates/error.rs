//! Template error types

use thiserror::Error;

/// Errors raised while looking up or rendering templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template exists for the requested test type
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A placeholder has no variable to fill it
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Malformed placeholder syntax
    #[error("Invalid template syntax at line {line}: {message}")]
    InvalidSyntax {
        /// Line number where syntax error occurred
        line: usize,
        /// Error message describing the syntax issue
        message: String,
    },

    /// Catalog data failed to deserialize
    #[error("Invalid template catalog: {0}")]
    InvalidCatalog(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
