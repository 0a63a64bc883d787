//! Error types for requirement parsing

use casegen_domain::{RequirementId, StoreError};
use thiserror::Error;

/// Errors that can occur while parsing a requirement
#[derive(Debug, Error)]
pub enum ParseError {
    /// Unexpected fault while extracting features
    #[error("Parse failure in requirement {requirement_id}: {message}{}", sentence_suffix(.sentence))]
    Failure {
        /// Requirement being parsed
        requirement_id: RequirementId,
        /// Sentence that triggered the fault, when known
        sentence: Option<String>,
        /// Error message
        message: String,
    },

    /// A pattern built from taxonomy data failed to compile
    #[error("Invalid {name} pattern: {source}")]
    InvalidPattern {
        /// Which pattern failed
        name: &'static str,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Taxonomy data is unusable
    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    /// Storage error
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn sentence_suffix(sentence: &Option<String>) -> String {
    match sentence {
        Some(sentence) => format!(" (sentence: \"{}\")", sentence),
        None => String::new(),
    }
}

impl ParseError {
    /// Create a failure tied to one sentence
    pub fn in_sentence(
        requirement_id: RequirementId,
        sentence: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Failure {
            requirement_id,
            sentence: Some(sentence.into()),
            message: message.into(),
        }
    }
}
