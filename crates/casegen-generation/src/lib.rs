#![warn(missing_docs)]

//! Test case generation for casegen
//!
//! Expands parsed features into test cases from a versioned template
//! catalog, scores test cases along five weighted quality dimensions, and
//! orchestrates the parse → generate → evaluate workflow over a
//! [`casegen_domain::PipelineStore`].

pub mod error;
pub mod evaluator;
pub mod generator;
pub mod orchestrator;
pub mod templates;

// Re-export public API
pub use error::{GenerationError, StageError, WorkflowError, WorkflowStage};
pub use evaluator::{
    average_score, EvaluationKeywords, QualityEvaluator, ScoreWeights, ScoringConfig, TypoRule,
    READY_MESSAGE,
};
pub use generator::{GenerationConfig, GenerationOptions, TestCaseGenerator, AUTOMATIC_TEST_TYPES};
pub use orchestrator::{BatchEvaluation, FeatureSummary, GenerationOrchestrator, ParseSummary};
pub use templates::{
    RenderedTemplate, TemplateCatalog, TemplateEngine, TemplateError, TemplateVariables,
    TestTemplate, BUILTIN_CATALOG_VERSION,
};
