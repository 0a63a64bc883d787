//! Pipeline orchestration
//!
//! Sequences parse → generate → evaluate for a requirement and records one
//! history entry per workflow run, failed runs included. A failing stage
//! stops the run; whatever earlier stages already stored stays stored.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use casegen_domain::{
    Feature, FeatureId, GenerationHistory, GenerationType, NewHistoryEntry, PipelineStore,
    Priority, RequirementId, RequirementStatus, RunStatus, StoreError, TestCase,
    TestCaseEvaluation, TestCaseId,
};
use casegen_parser::{ParseError, RequirementParser, Taxonomy};

use crate::error::{WorkflowError, WorkflowStage};
use crate::evaluator::{average_score, QualityEvaluator};
use crate::generator::{GenerationOptions, TestCaseGenerator};
use crate::templates::TemplateCatalog;

/// Name, type and priority of one parsed feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSummary {
    /// Feature name
    pub name: String,
    /// Taxonomy category
    #[serde(rename = "type")]
    pub feature_type: String,
    /// Priority
    pub priority: Priority,
}

/// Result of parsing a requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSummary {
    /// Number of features produced
    pub features_count: usize,
    /// The features, in detection order
    pub features: Vec<FeatureSummary>,
}

impl ParseSummary {
    fn from_features(features: &[Feature]) -> Self {
        Self {
            features_count: features.len(),
            features: features
                .iter()
                .map(|f| FeatureSummary {
                    name: f.name.clone(),
                    feature_type: f.feature_type.clone(),
                    priority: f.priority,
                })
                .collect(),
        }
    }
}

/// Result of evaluating several test cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEvaluation {
    /// One evaluation per requested id, in request order
    pub per_case: Vec<TestCaseEvaluation>,
    /// Mean total score, absent for an empty batch
    pub average_score: Option<f64>,
}

#[derive(Debug, Default)]
struct RunProgress {
    features_count: usize,
    test_cases_count: usize,
    average_score: Option<f64>,
}

/// Drives the requirement → feature → test case → evaluation pipeline
pub struct GenerationOrchestrator {
    store: Arc<dyn PipelineStore>,
    parser: RequirementParser,
    generator: TestCaseGenerator,
    evaluator: QualityEvaluator,
}

impl GenerationOrchestrator {
    /// Create an orchestrator from configured components
    pub fn new(
        store: Arc<dyn PipelineStore>,
        parser: RequirementParser,
        generator: TestCaseGenerator,
        evaluator: QualityEvaluator,
    ) -> Self {
        Self {
            store,
            parser,
            generator,
            evaluator,
        }
    }

    /// Create an orchestrator with the built-in taxonomy, templates and scoring
    pub fn with_defaults(store: Arc<dyn PipelineStore>) -> Result<Self, ParseError> {
        let parser = RequirementParser::new(Arc::new(Taxonomy::default()))?;
        let generator = TestCaseGenerator::new(Arc::new(TemplateCatalog::builtin()));
        Ok(Self::new(store, parser, generator, QualityEvaluator::new()))
    }

    /// The store this orchestrator writes through
    pub fn store(&self) -> &Arc<dyn PipelineStore> {
        &self.store
    }

    /// Parse a requirement, replacing its features
    pub fn parse_requirement(
        &self,
        requirement_id: RequirementId,
    ) -> Result<ParseSummary, WorkflowError> {
        let features = self.parse_stage(requirement_id)?;
        Ok(ParseSummary::from_features(&features))
    }

    /// Generate and store test cases from a requirement's current features
    ///
    /// The requirement must already be parsed; an unparsed requirement has
    /// no features and yields no test cases.
    pub fn generate_test_cases(
        &self,
        requirement_id: RequirementId,
        options: &GenerationOptions,
    ) -> Result<Vec<TestCase>, WorkflowError> {
        let generate = |err: StoreError| WorkflowError::new(WorkflowStage::Generate, err);
        self.store.load_requirement(requirement_id).map_err(generate)?;
        let features = self.store.list_features(requirement_id).map_err(generate)?;
        self.generate_stage(requirement_id, &features, options)
    }

    /// Evaluate one test case, replacing any earlier evaluation
    pub fn evaluate_test_case(
        &self,
        test_case_id: TestCaseId,
    ) -> Result<TestCaseEvaluation, WorkflowError> {
        let evaluate = |err: StoreError| WorkflowError::new(WorkflowStage::Evaluate, err);
        let test_case = self.store.load_test_case(test_case_id).map_err(evaluate)?;
        let features = self
            .source_features(std::slice::from_ref(&test_case))
            .map_err(evaluate)?;
        let feature = test_case.feature_id.and_then(|id| features.get(&id));

        let draft = self.evaluator.evaluate(&test_case, feature);
        self.store.upsert_evaluation(draft).map_err(evaluate)
    }

    /// Evaluate several test cases and average their scores
    ///
    /// Every id is loaded before anything is scored, so an unknown id fails
    /// the batch without storing any evaluation.
    pub fn batch_evaluate(
        &self,
        test_case_ids: &[TestCaseId],
    ) -> Result<BatchEvaluation, WorkflowError> {
        let test_cases = test_case_ids
            .iter()
            .map(|id| self.store.load_test_case(*id))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| WorkflowError::new(WorkflowStage::Evaluate, err))?;

        let (per_case, average_score) = self.evaluate_stage(&test_cases)?;
        info!(
            test_cases = per_case.len(),
            average_score = ?average_score,
            "Batch evaluation finished"
        );
        Ok(BatchEvaluation {
            per_case,
            average_score,
        })
    }

    /// Run parse → generate → evaluate with default options
    pub fn run_full_workflow(
        &self,
        requirement_id: RequirementId,
    ) -> Result<GenerationHistory, WorkflowError> {
        self.run_workflow(requirement_id, GenerationType::Full, &GenerationOptions::default())
    }

    /// Run the stages `generation_type` covers and record the run
    ///
    /// A history entry is appended whether the run succeeds or fails. On
    /// failure the stage error is returned after the entry is written.
    pub fn run_workflow(
        &self,
        requirement_id: RequirementId,
        generation_type: GenerationType,
        options: &GenerationOptions,
    ) -> Result<GenerationHistory, WorkflowError> {
        info!(requirement_id, %generation_type, "Starting workflow");
        let started = Instant::now();
        let mut progress = RunProgress::default();

        let outcome = self.execute(requirement_id, generation_type, options, &mut progress);

        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let (status, error_message) = match &outcome {
            Ok(()) => (RunStatus::Completed, None),
            Err(err) => (RunStatus::Failed, Some(err.to_string())),
        };
        let entry = NewHistoryEntry {
            requirement_id,
            generation_type,
            status,
            features_count: progress.features_count,
            test_cases_count: progress.test_cases_count,
            average_score: progress.average_score,
            processing_time_ms,
            error_message,
        };

        match outcome {
            Ok(()) => {
                let history = self
                    .store
                    .append_history(entry)
                    .map_err(|err| WorkflowError::new(final_stage(generation_type), err))?;
                info!(
                    requirement_id,
                    features = history.features_count,
                    test_cases = history.test_cases_count,
                    score = ?history.average_score,
                    elapsed_ms = processing_time_ms,
                    "Workflow completed"
                );
                Ok(history)
            }
            Err(err) => {
                error!(requirement_id, stage = %err.stage, error = %err, "Workflow failed");
                if let Err(history_err) = self.store.append_history(entry) {
                    warn!(requirement_id, error = %history_err, "Could not record failed run");
                }
                Err(err)
            }
        }
    }

    fn execute(
        &self,
        requirement_id: RequirementId,
        generation_type: GenerationType,
        options: &GenerationOptions,
        progress: &mut RunProgress,
    ) -> Result<(), WorkflowError> {
        let test_cases = if generation_type.generates() {
            let features = self.parse_stage(requirement_id)?;
            progress.features_count = features.len();
            let created = self.generate_stage(requirement_id, &features, options)?;
            progress.test_cases_count = created.len();
            created
        } else {
            let evaluate = |err: StoreError| WorkflowError::new(WorkflowStage::Evaluate, err);
            self.store.load_requirement(requirement_id).map_err(evaluate)?;
            progress.features_count = self.store.list_features(requirement_id).map_err(evaluate)?.len();
            let existing = self.store.list_test_cases(requirement_id).map_err(evaluate)?;
            progress.test_cases_count = existing.len();
            existing
        };

        if generation_type.evaluates() {
            let (_, average) = self.evaluate_stage(&test_cases)?;
            progress.average_score = average;
        }
        Ok(())
    }

    fn parse_stage(&self, requirement_id: RequirementId) -> Result<Vec<Feature>, WorkflowError> {
        let parse = |err: ParseError| WorkflowError::new(WorkflowStage::Parse, err);
        let requirement = self
            .store
            .load_requirement(requirement_id)
            .map_err(|err| parse(err.into()))?;
        self.parser.parse(&requirement, self.store.as_ref()).map_err(parse)
    }

    fn generate_stage(
        &self,
        requirement_id: RequirementId,
        features: &[Feature],
        options: &GenerationOptions,
    ) -> Result<Vec<TestCase>, WorkflowError> {
        let result = self
            .generator
            .generate_all(features, options)
            .and_then(|drafts| self.store.save_test_cases(drafts).map_err(Into::into));

        match result {
            Ok(created) => {
                info!(requirement_id, test_cases = created.len(), "Test cases stored");
                Ok(created)
            }
            Err(err) => {
                if let Err(status_err) = self
                    .store
                    .update_requirement_status(requirement_id, RequirementStatus::Failed)
                {
                    warn!(requirement_id, error = %status_err, "Could not mark requirement as failed");
                }
                Err(WorkflowError::new(WorkflowStage::Generate, err))
            }
        }
    }

    fn evaluate_stage(
        &self,
        test_cases: &[TestCase],
    ) -> Result<(Vec<TestCaseEvaluation>, Option<f64>), WorkflowError> {
        let evaluate = |err: StoreError| WorkflowError::new(WorkflowStage::Evaluate, err);
        let features = self.source_features(test_cases).map_err(evaluate)?;

        let pairs: Vec<(&TestCase, Option<&Feature>)> = test_cases
            .iter()
            .map(|case| (case, case.feature_id.and_then(|id| features.get(&id))))
            .collect();
        let drafts = self.evaluator.evaluate_batch(&pairs);
        let average = average_score(&drafts);

        let mut stored = Vec::with_capacity(drafts.len());
        for draft in drafts {
            stored.push(self.store.upsert_evaluation(draft).map_err(evaluate)?);
        }
        Ok((stored, average))
    }

    fn source_features(&self, test_cases: &[TestCase]) -> Result<HashMap<FeatureId, Feature>, StoreError> {
        let mut requirement_ids: Vec<RequirementId> = test_cases
            .iter()
            .filter(|case| case.feature_id.is_some())
            .map(|case| case.requirement_id)
            .collect();
        requirement_ids.sort_unstable();
        requirement_ids.dedup();

        let mut features = HashMap::new();
        for requirement_id in requirement_ids {
            for feature in self.store.list_features(requirement_id)? {
                features.insert(feature.id, feature);
            }
        }
        Ok(features)
    }
}

fn final_stage(generation_type: GenerationType) -> WorkflowStage {
    if generation_type.evaluates() {
        WorkflowStage::Evaluate
    } else {
        WorkflowStage::Generate
    }
}
