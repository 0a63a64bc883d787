//! Error types for test case generation and the pipeline workflow

use std::fmt;

use casegen_domain::StoreError;
use casegen_parser::ParseError;
use thiserror::Error;

use crate::templates::TemplateError;

/// Errors that can occur while generating or scoring test cases
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Template lookup or rendering failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Storage error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generator or scoring configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Pipeline stage that produced a [`WorkflowError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStage {
    /// Requirement parsing
    Parse,
    /// Test case generation
    Generate,
    /// Quality evaluation
    Evaluate,
}

impl WorkflowStage {
    /// Lowercase stage name
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Parse => "parse",
            WorkflowStage::Generate => "generate",
            WorkflowStage::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a failed stage
#[derive(Debug, Error)]
pub enum StageError {
    /// Parsing failed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Generation failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Storage failed outside a parser or generator call
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A pipeline failure tagged with the stage it happened in
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct WorkflowError {
    /// Stage that failed
    pub stage: WorkflowStage,
    /// Underlying cause
    #[source]
    pub source: StageError,
}

impl WorkflowError {
    /// Wrap a stage failure
    pub fn new(stage: WorkflowStage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    /// The storage error behind this failure, however deeply wrapped
    pub fn store_error(&self) -> Option<&StoreError> {
        match &self.source {
            StageError::Store(err)
            | StageError::Parse(ParseError::Store(err))
            | StageError::Generation(GenerationError::Store(err)) => Some(err),
            _ => None,
        }
    }

    /// Whether an unknown id caused this failure
    pub fn is_not_found(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_not_found)
    }
}
