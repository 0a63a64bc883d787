//! Storage port consumed by the pipeline
//!
//! The pipeline never talks to a database directly. Whatever persists
//! requirements, features, test cases, evaluations and history implements
//! [`PipelineStore`]; each call is a single create/read/update statement
//! from the pipeline's point of view.

use crate::{
    error::StoreResult,
    models::{
        Feature, GenerationHistory, NewEvaluation, NewFeature, NewHistoryEntry, NewRequirement,
        NewTestCase, Requirement, RequirementId, RequirementStatus, TestCase, TestCaseEvaluation,
        TestCaseId,
    },
};

/// Persistence boundary for the requirement → test case pipeline
pub trait PipelineStore: Send + Sync {
    /// Store a new requirement in `pending` status
    fn insert_requirement(&self, requirement: NewRequirement) -> StoreResult<Requirement>;

    /// Load a requirement by id
    fn load_requirement(&self, id: RequirementId) -> StoreResult<Requirement>;

    /// Set a requirement's processing status
    fn update_requirement_status(
        &self,
        id: RequirementId,
        status: RequirementStatus,
    ) -> StoreResult<()>;

    /// Replace every feature of a requirement
    ///
    /// Must be atomic: a concurrent reader sees either the old set or the
    /// new set, never a mix or an empty gap. Test cases that referenced a
    /// removed feature keep existing with `feature_id` cleared to `None`.
    fn replace_features(
        &self,
        requirement_id: RequirementId,
        features: Vec<NewFeature>,
    ) -> StoreResult<Vec<Feature>>;

    /// Features of a requirement in creation order
    fn list_features(&self, requirement_id: RequirementId) -> StoreResult<Vec<Feature>>;

    /// Store test cases, assigning ids in input order
    fn save_test_cases(&self, test_cases: Vec<NewTestCase>) -> StoreResult<Vec<TestCase>>;

    /// Load a test case by id
    fn load_test_case(&self, id: TestCaseId) -> StoreResult<TestCase>;

    /// Test cases of a requirement in creation order
    fn list_test_cases(&self, requirement_id: RequirementId) -> StoreResult<Vec<TestCase>>;

    /// Insert or overwrite the evaluation of a test case
    fn upsert_evaluation(&self, evaluation: NewEvaluation) -> StoreResult<TestCaseEvaluation>;

    /// The live evaluation of a test case, if any
    fn load_evaluation(&self, test_case_id: TestCaseId)
        -> StoreResult<Option<TestCaseEvaluation>>;

    /// Append a workflow history entry
    fn append_history(&self, entry: NewHistoryEntry) -> StoreResult<GenerationHistory>;

    /// History entries of a requirement, oldest first
    fn list_history(&self, requirement_id: RequirementId) -> StoreResult<Vec<GenerationHistory>>;

    /// Delete a requirement and everything it owns
    fn delete_requirement(&self, id: RequirementId) -> StoreResult<()>;
}
