//! Core data models for requirements, features, test cases and evaluations

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a [`Requirement`]
pub type RequirementId = u64;
/// Identifier of a [`Feature`]
pub type FeatureId = u64;
/// Identifier of a [`TestCase`]
pub type TestCaseId = u64;
/// Identifier of a [`TestCaseEvaluation`]
pub type EvaluationId = u64;
/// Identifier of a [`GenerationHistory`] entry
pub type HistoryId = u64;

/// Well-known test type names
pub mod test_types {
    /// Normal-path functional test
    pub const FUNCTION: &str = "function";
    /// Boundary value test
    pub const BOUNDARY: &str = "boundary";
    /// Fault and error handling test
    pub const EXCEPTION: &str = "exception";
    /// Response time test
    pub const PERFORMANCE: &str = "performance";
    /// Safety mechanism test
    pub const SECURITY: &str = "security";
}

/// Processing status of a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
    /// Not parsed yet
    #[default]
    Pending,
    /// Last parse succeeded
    Completed,
    /// Last parse or generation failed
    Failed,
}

impl RequirementStatus {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementStatus::Pending => "pending",
            RequirementStatus::Completed => "completed",
            RequirementStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority level shared by features and the test cases generated from them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Must be covered first
    High,
    /// Default priority
    #[default]
    Medium,
    /// Nice to have
    Low,
}

impl Priority {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A free-form requirement document supplied by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Unique identifier
    pub id: RequirementId,
    /// Short title
    pub title: String,
    /// Raw requirement text
    pub content: String,
    /// Processing status
    pub status: RequirementStatus,
    /// Reference to the owning user
    pub owner: String,
    /// When the requirement was created
    pub created_at: DateTime<Utc>,
    /// When the requirement was last updated
    pub updated_at: DateTime<Utc>,
}

/// Requirement data before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRequirement {
    /// Short title
    pub title: String,
    /// Raw requirement text
    pub content: String,
    /// Reference to the owning user
    pub owner: String,
}

impl NewRequirement {
    /// Create requirement data
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            owner: owner.into(),
        }
    }
}

/// A parameter extracted from requirement text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// A numeric range such as `0-250`
    Range {
        /// Lower bound as written
        min: String,
        /// Upper bound as written
        max: String,
        /// Unit following the upper bound, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// A number followed by a known unit such as `3秒`
    Measured {
        /// Number as written
        value: String,
        /// Unit
        unit: String,
    },
    /// A bare scalar slot such as `min_value`
    Scalar(String),
}

impl ParameterValue {
    /// The scalar text of this value, if it is a scalar or measured value
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ParameterValue::Scalar(value) | ParameterValue::Measured { value, .. } => Some(value),
            ParameterValue::Range { .. } => None,
        }
    }

    /// The unit attached to this value, if any
    pub fn unit(&self) -> Option<&str> {
        match self {
            ParameterValue::Range { unit, .. } => unit.as_deref(),
            ParameterValue::Measured { unit, .. } => Some(unit),
            ParameterValue::Scalar(_) => None,
        }
    }
}

/// A named limit extracted from requirement text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstraintValue {
    /// A duration such as `5秒`
    Duration {
        /// Number as written
        value: String,
        /// Time unit
        unit: String,
    },
    /// A boolean restriction such as a safety prohibition
    Flag(bool),
}

/// Feature data before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeature {
    /// Owning requirement
    pub requirement_id: RequirementId,
    /// Feature name
    pub name: String,
    /// Taxonomy category
    #[serde(rename = "type")]
    pub feature_type: String,
    /// Source sentences
    pub description: String,
    /// Extracted parameters keyed by slot name
    pub parameters: BTreeMap<String, ParameterValue>,
    /// Extracted constraints keyed by limit name
    pub constraints: BTreeMap<String, ConstraintValue>,
    /// Names of other features or systems this one depends on
    pub dependencies: Vec<String>,
    /// Priority
    pub priority: Priority,
}

/// A functional capability detected in a requirement
///
/// Created only by the requirement parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Unique identifier
    pub id: FeatureId,
    /// Owning requirement
    pub requirement_id: RequirementId,
    /// Feature name
    pub name: String,
    /// Taxonomy category
    #[serde(rename = "type")]
    pub feature_type: String,
    /// Source sentences
    pub description: String,
    /// Extracted parameters keyed by slot name
    pub parameters: BTreeMap<String, ParameterValue>,
    /// Extracted constraints keyed by limit name
    pub constraints: BTreeMap<String, ConstraintValue>,
    /// Names of other features or systems this one depends on
    pub dependencies: Vec<String>,
    /// Priority
    pub priority: Priority,
    /// When the feature was stored
    pub created_at: DateTime<Utc>,
}

impl Feature {
    /// Materialize stored feature data
    pub fn from_new(id: FeatureId, new: NewFeature, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            requirement_id: new.requirement_id,
            name: new.name,
            feature_type: new.feature_type,
            description: new.description,
            parameters: new.parameters,
            constraints: new.constraints,
            dependencies: new.dependencies,
            priority: new.priority,
            created_at,
        }
    }

    /// Scalar text of a parameter slot
    pub fn scalar_parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).and_then(ParameterValue::as_scalar)
    }
}

/// Test case data before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTestCase {
    /// Owning requirement
    pub requirement_id: RequirementId,
    /// Feature this case was generated from
    pub feature_id: Option<FeatureId>,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Test type name
    pub test_type: String,
    /// Preconditions
    pub preconditions: String,
    /// Ordered steps as text
    pub test_steps: String,
    /// Expected result
    pub expected_result: String,
    /// Priority
    pub priority: Priority,
}

/// A test case, generated or edited by a human
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique identifier
    pub id: TestCaseId,
    /// Owning requirement
    pub requirement_id: RequirementId,
    /// Feature this case was generated from
    pub feature_id: Option<FeatureId>,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Test type name
    pub test_type: String,
    /// Preconditions
    pub preconditions: String,
    /// Ordered steps as text
    pub test_steps: String,
    /// Expected result
    pub expected_result: String,
    /// Priority
    pub priority: Priority,
    /// When the test case was stored
    pub created_at: DateTime<Utc>,
}

impl TestCase {
    /// Materialize stored test case data
    pub fn from_new(id: TestCaseId, new: NewTestCase, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            requirement_id: new.requirement_id,
            feature_id: new.feature_id,
            title: new.title,
            description: new.description,
            test_type: new.test_type,
            preconditions: new.preconditions,
            test_steps: new.test_steps,
            expected_result: new.expected_result,
            priority: new.priority,
            created_at,
        }
    }
}

/// The five quality sub-scores, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SubScores {
    /// Presence of preconditions, steps and expected result
    pub completeness: f64,
    /// Use of domain terms and concrete operations
    pub accuracy: f64,
    /// Actionable steps and verifiable results
    pub executability: f64,
    /// Test type coverage
    pub coverage: f64,
    /// Precise wording
    pub clarity: f64,
}

/// Diagnostics gathered while scoring a test case
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvaluationDetails {
    /// Required parts that are absent or too short
    pub missing_elements: Vec<String>,
    /// Domain terms found in description and steps
    pub domain_terms: Vec<String>,
    /// Operation keywords found in description and steps
    pub operations: Vec<String>,
    /// Action verbs found in the steps
    pub actionable_steps: Vec<String>,
    /// State-disclosure keywords found in the expected result
    pub verifiable_results: Vec<String>,
    /// Clarity signals found in steps and expected result
    pub clarity_signals: Vec<String>,
    /// Probable typos
    pub potential_errors: Vec<String>,
    /// Things that make the case hard to execute
    pub execution_challenges: Vec<String>,
    /// Vague wording
    pub clarity_issues: Vec<String>,
    /// Related cases worth adding
    pub missing_coverage: Vec<String>,
}

/// Evaluation data before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvaluation {
    /// Evaluated test case
    pub test_case_id: TestCaseId,
    /// Sub-scores
    #[serde(flatten)]
    pub scores: SubScores,
    /// Weighted total in [0, 100]
    pub total_score: f64,
    /// Improvement suggestions, in dimension order
    pub suggestions: Vec<String>,
    /// Diagnostics
    pub details: EvaluationDetails,
}

/// The live quality evaluation of a test case
///
/// At most one exists per test case; re-evaluation replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseEvaluation {
    /// Unique identifier
    pub id: EvaluationId,
    /// Evaluated test case
    pub test_case_id: TestCaseId,
    /// Sub-scores
    #[serde(flatten)]
    pub scores: SubScores,
    /// Weighted total in [0, 100]
    pub total_score: f64,
    /// Improvement suggestions, in dimension order
    pub suggestions: Vec<String>,
    /// Diagnostics
    pub details: EvaluationDetails,
    /// When the evaluation was stored
    pub evaluated_at: DateTime<Utc>,
}

impl TestCaseEvaluation {
    /// Materialize a stored evaluation
    pub fn from_new(id: EvaluationId, new: NewEvaluation, evaluated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            test_case_id: new.test_case_id,
            scores: new.scores,
            total_score: new.total_score,
            suggestions: new.suggestions,
            details: new.details,
            evaluated_at,
        }
    }
}

/// Which stages a workflow run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    /// Parse and generate
    TestCases,
    /// Evaluate existing test cases
    Evaluation,
    /// Parse, generate and evaluate
    Full,
}

impl GenerationType {
    /// Whether the run parses and generates
    pub fn generates(&self) -> bool {
        matches!(self, GenerationType::TestCases | GenerationType::Full)
    }

    /// Whether the run evaluates
    pub fn evaluates(&self) -> bool {
        matches!(self, GenerationType::Evaluation | GenerationType::Full)
    }

    /// Snake-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationType::TestCases => "test_cases",
            GenerationType::Evaluation => "evaluation",
            GenerationType::Full => "full",
        }
    }
}

impl fmt::Display for GenerationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every requested stage finished
    Completed,
    /// A stage failed
    Failed,
}

/// History data before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    /// Requirement the run targeted
    pub requirement_id: RequirementId,
    /// Stages covered
    pub generation_type: GenerationType,
    /// Outcome
    pub status: RunStatus,
    /// Features produced by the parse stage
    pub features_count: usize,
    /// Test cases produced or evaluated
    pub test_cases_count: usize,
    /// Mean total score when evaluation ran
    pub average_score: Option<f64>,
    /// Wall-clock duration of the run
    pub processing_time_ms: u64,
    /// Failure message for failed runs
    pub error_message: Option<String>,
}

/// Append-only audit record of one workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationHistory {
    /// Unique identifier
    pub id: HistoryId,
    /// Requirement the run targeted
    pub requirement_id: RequirementId,
    /// Stages covered
    pub generation_type: GenerationType,
    /// Outcome
    pub status: RunStatus,
    /// Features produced by the parse stage
    pub features_count: usize,
    /// Test cases produced or evaluated
    pub test_cases_count: usize,
    /// Mean total score when evaluation ran
    pub average_score: Option<f64>,
    /// Wall-clock duration of the run
    pub processing_time_ms: u64,
    /// Failure message for failed runs
    pub error_message: Option<String>,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
}

impl GenerationHistory {
    /// Materialize a stored history entry
    pub fn from_new(id: HistoryId, new: NewHistoryEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            requirement_id: new.requirement_id,
            generation_type: new.generation_type,
            status: new.status,
            features_count: new.features_count,
            test_cases_count: new.test_cases_count,
            average_score: new.average_score,
            processing_time_ms: new.processing_time_ms,
            error_message: new.error_message,
            created_at,
        }
    }
}
