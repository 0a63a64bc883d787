//! In-Memory Pipeline Store Implementation
//!
//! Memory backend for tests

use std::collections::BTreeMap;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use casegen_domain::{
    error::{StoreError, StoreResult},
    models::{
        EvaluationId, Feature, FeatureId, GenerationHistory, HistoryId, NewEvaluation, NewFeature,
        NewHistoryEntry, NewRequirement, NewTestCase, Requirement, RequirementId,
        RequirementStatus, TestCase, TestCaseEvaluation, TestCaseId,
    },
    store::PipelineStore,
};

#[derive(Debug, Default)]
struct Tables {
    requirements: BTreeMap<RequirementId, Requirement>,
    features: BTreeMap<FeatureId, Feature>,
    test_cases: BTreeMap<TestCaseId, TestCase>,
    evaluations: BTreeMap<TestCaseId, TestCaseEvaluation>,
    history: BTreeMap<HistoryId, GenerationHistory>,
    next_requirement_id: RequirementId,
    next_feature_id: FeatureId,
    next_test_case_id: TestCaseId,
    next_evaluation_id: EvaluationId,
    next_history_id: HistoryId,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Thread-safe in-memory implementation of [`PipelineStore`]
///
/// Every table sits behind one RwLock, so multi-row writes such as
/// feature replacement and cascade deletion are atomic to readers.
/// Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct InMemoryPipelineStore {
    tables: RwLock<Tables>,
}

impl InMemoryPipelineStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial requirements (useful for testing)
    pub fn with_requirements(requirements: Vec<NewRequirement>) -> StoreResult<Self> {
        let store = Self::new();
        for requirement in requirements {
            store.insert_requirement(requirement)?;
        }
        Ok(store)
    }

    /// Number of stored requirements (for testing)
    pub fn requirement_count(&self) -> usize {
        self.tables.read().requirements.len()
    }

    /// Number of stored features across all requirements (for testing)
    pub fn feature_count(&self) -> usize {
        self.tables.read().features.len()
    }

    /// Number of stored test cases across all requirements (for testing)
    pub fn test_case_count(&self) -> usize {
        self.tables.read().test_cases.len()
    }

    /// Number of live evaluations (for testing)
    pub fn evaluation_count(&self) -> usize {
        self.tables.read().evaluations.len()
    }

    /// Clear all tables (for testing)
    pub fn clear(&self) {
        *self.tables.write() = Tables::default();
    }
}

impl PipelineStore for InMemoryPipelineStore {
    fn insert_requirement(&self, requirement: NewRequirement) -> StoreResult<Requirement> {
        let mut tables = self.tables.write();
        let id = next_id(&mut tables.next_requirement_id);
        let now = Utc::now();
        let stored = Requirement {
            id,
            title: requirement.title,
            content: requirement.content,
            status: RequirementStatus::Pending,
            owner: requirement.owner,
            created_at: now,
            updated_at: now,
        };
        tables.requirements.insert(id, stored.clone());
        Ok(stored)
    }

    fn load_requirement(&self, id: RequirementId) -> StoreResult<Requirement> {
        self.tables
            .read()
            .requirements
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Requirement", id))
    }

    fn update_requirement_status(
        &self,
        id: RequirementId,
        status: RequirementStatus,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let requirement = tables
            .requirements
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Requirement", id))?;
        requirement.status = status;
        requirement.updated_at = Utc::now();
        Ok(())
    }

    fn replace_features(
        &self,
        requirement_id: RequirementId,
        features: Vec<NewFeature>,
    ) -> StoreResult<Vec<Feature>> {
        let mut tables = self.tables.write();
        if !tables.requirements.contains_key(&requirement_id) {
            return Err(StoreError::not_found("Requirement", requirement_id));
        }

        let before = tables.features.len();
        tables
            .features
            .retain(|_, feature| feature.requirement_id != requirement_id);
        let removed = before - tables.features.len();

        // cases generated from a removed feature keep their text but lose the link
        let Tables {
            features: live,
            test_cases,
            ..
        } = &mut *tables;
        let mut detached = 0;
        for case in test_cases
            .values_mut()
            .filter(|case| case.requirement_id == requirement_id)
        {
            if case.feature_id.is_some_and(|id| !live.contains_key(&id)) {
                case.feature_id = None;
                detached += 1;
            }
        }

        let now = Utc::now();
        let mut stored = Vec::with_capacity(features.len());
        for mut feature in features {
            feature.requirement_id = requirement_id;
            let id = next_id(&mut tables.next_feature_id);
            let feature = Feature::from_new(id, feature, now);
            tables.features.insert(id, feature.clone());
            stored.push(feature);
        }

        debug!(
            requirement_id,
            removed,
            detached,
            inserted = stored.len(),
            "Replaced feature set"
        );
        Ok(stored)
    }

    fn list_features(&self, requirement_id: RequirementId) -> StoreResult<Vec<Feature>> {
        let tables = self.tables.read();
        if !tables.requirements.contains_key(&requirement_id) {
            return Err(StoreError::not_found("Requirement", requirement_id));
        }
        Ok(tables
            .features
            .values()
            .filter(|f| f.requirement_id == requirement_id)
            .cloned()
            .collect())
    }

    fn save_test_cases(&self, test_cases: Vec<NewTestCase>) -> StoreResult<Vec<TestCase>> {
        let mut tables = self.tables.write();
        for case in &test_cases {
            if !tables.requirements.contains_key(&case.requirement_id) {
                return Err(StoreError::not_found("Requirement", case.requirement_id));
            }
            if let Some(feature_id) = case.feature_id {
                if !tables.features.contains_key(&feature_id) {
                    return Err(StoreError::not_found("Feature", feature_id));
                }
            }
        }

        let now = Utc::now();
        let mut stored = Vec::with_capacity(test_cases.len());
        for case in test_cases {
            let id = next_id(&mut tables.next_test_case_id);
            let case = TestCase::from_new(id, case, now);
            tables.test_cases.insert(id, case.clone());
            stored.push(case);
        }
        Ok(stored)
    }

    fn load_test_case(&self, id: TestCaseId) -> StoreResult<TestCase> {
        self.tables
            .read()
            .test_cases
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("TestCase", id))
    }

    fn list_test_cases(&self, requirement_id: RequirementId) -> StoreResult<Vec<TestCase>> {
        let tables = self.tables.read();
        if !tables.requirements.contains_key(&requirement_id) {
            return Err(StoreError::not_found("Requirement", requirement_id));
        }
        Ok(tables
            .test_cases
            .values()
            .filter(|c| c.requirement_id == requirement_id)
            .cloned()
            .collect())
    }

    fn upsert_evaluation(&self, evaluation: NewEvaluation) -> StoreResult<TestCaseEvaluation> {
        let mut tables = self.tables.write();
        let test_case_id = evaluation.test_case_id;
        if !tables.test_cases.contains_key(&test_case_id) {
            return Err(StoreError::not_found("TestCase", test_case_id));
        }

        let id = match tables.evaluations.get(&test_case_id) {
            Some(existing) => existing.id,
            None => next_id(&mut tables.next_evaluation_id),
        };
        let stored = TestCaseEvaluation::from_new(id, evaluation, Utc::now());
        tables.evaluations.insert(test_case_id, stored.clone());
        Ok(stored)
    }

    fn load_evaluation(
        &self,
        test_case_id: TestCaseId,
    ) -> StoreResult<Option<TestCaseEvaluation>> {
        Ok(self.tables.read().evaluations.get(&test_case_id).cloned())
    }

    fn append_history(&self, entry: NewHistoryEntry) -> StoreResult<GenerationHistory> {
        let mut tables = self.tables.write();
        if !tables.requirements.contains_key(&entry.requirement_id) {
            return Err(StoreError::not_found("Requirement", entry.requirement_id));
        }
        let id = next_id(&mut tables.next_history_id);
        let stored = GenerationHistory::from_new(id, entry, Utc::now());
        tables.history.insert(id, stored.clone());
        Ok(stored)
    }

    fn list_history(&self, requirement_id: RequirementId) -> StoreResult<Vec<GenerationHistory>> {
        Ok(self
            .tables
            .read()
            .history
            .values()
            .filter(|h| h.requirement_id == requirement_id)
            .cloned()
            .collect())
    }

    fn delete_requirement(&self, id: RequirementId) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.requirements.remove(&id).is_none() {
            return Err(StoreError::not_found("Requirement", id));
        }

        tables.features.retain(|_, f| f.requirement_id != id);
        let orphaned: Vec<TestCaseId> = tables
            .test_cases
            .values()
            .filter(|c| c.requirement_id == id)
            .map(|c| c.id)
            .collect();
        for case_id in &orphaned {
            tables.test_cases.remove(case_id);
            tables.evaluations.remove(case_id);
        }
        tables.history.retain(|_, h| h.requirement_id != id);

        debug!(requirement_id = id, test_cases = orphaned.len(), "Deleted requirement");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegen_domain::models::{EvaluationDetails, GenerationType, Priority, RunStatus, SubScores};
    use std::collections::BTreeMap;

    fn new_feature(name: &str) -> NewFeature {
        NewFeature {
            requirement_id: 0,
            name: name.to_string(),
            feature_type: name.to_string(),
            description: String::new(),
            parameters: BTreeMap::new(),
            constraints: BTreeMap::new(),
            dependencies: vec![],
            priority: Priority::Medium,
        }
    }

    fn new_case(requirement_id: RequirementId, feature_id: Option<FeatureId>) -> NewTestCase {
        NewTestCase {
            requirement_id,
            feature_id,
            title: "case".to_string(),
            description: String::new(),
            test_type: "function".to_string(),
            preconditions: String::new(),
            test_steps: String::new(),
            expected_result: String::new(),
            priority: Priority::Medium,
        }
    }

    fn new_evaluation(test_case_id: TestCaseId, total: f64) -> NewEvaluation {
        NewEvaluation {
            test_case_id,
            scores: SubScores::default(),
            total_score: total,
            suggestions: vec![],
            details: EvaluationDetails::default(),
        }
    }

    #[test]
    fn test_insert_and_load_requirement() {
        let store = InMemoryPipelineStore::new();
        let req = store
            .insert_requirement(NewRequirement::new("座椅", "座椅记忆功能", "alice"))
            .unwrap();
        assert_eq!(req.id, 1);
        assert_eq!(req.status, RequirementStatus::Pending);

        let loaded = store.load_requirement(req.id).unwrap();
        assert_eq!(loaded, req);
    }

    #[test]
    fn test_load_missing_requirement() {
        let store = InMemoryPipelineStore::new();
        let err = store.load_requirement(9).unwrap_err();
        assert_eq!(err, StoreError::not_found("Requirement", 9));
    }

    #[test]
    fn test_update_status() {
        let store = InMemoryPipelineStore::new();
        let req = store
            .insert_requirement(NewRequirement::new("t", "c", "o"))
            .unwrap();
        store
            .update_requirement_status(req.id, RequirementStatus::Failed)
            .unwrap();
        assert_eq!(
            store.load_requirement(req.id).unwrap().status,
            RequirementStatus::Failed
        );
    }

    #[test]
    fn test_replace_features_replaces_not_accumulates() {
        let store = InMemoryPipelineStore::new();
        let req = store
            .insert_requirement(NewRequirement::new("t", "c", "o"))
            .unwrap();

        let first = store
            .replace_features(req.id, vec![new_feature("a"), new_feature("b")])
            .unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|f| f.requirement_id == req.id));

        let second = store
            .replace_features(req.id, vec![new_feature("c")])
            .unwrap();
        assert_eq!(second.len(), 1);

        let listed = store.list_features(req.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "c");
        assert!(listed[0].id > first[1].id);
    }

    #[test]
    fn test_replace_features_detaches_stale_test_cases() {
        let store = InMemoryPipelineStore::new();
        let req = store
            .insert_requirement(NewRequirement::new("t", "c", "o"))
            .unwrap();
        let other = store
            .insert_requirement(NewRequirement::new("t2", "c2", "o"))
            .unwrap();
        let old = store.replace_features(req.id, vec![new_feature("a")]).unwrap();
        let kept = store.replace_features(other.id, vec![new_feature("b")]).unwrap();
        let cases = store
            .save_test_cases(vec![
                new_case(req.id, Some(old[0].id)),
                new_case(req.id, None),
                new_case(other.id, Some(kept[0].id)),
            ])
            .unwrap();

        store.replace_features(req.id, vec![new_feature("a")]).unwrap();

        assert_eq!(store.load_test_case(cases[0].id).unwrap().feature_id, None);
        assert_eq!(store.load_test_case(cases[1].id).unwrap().feature_id, None);
        assert_eq!(
            store.load_test_case(cases[2].id).unwrap().feature_id,
            Some(kept[0].id)
        );
        assert_eq!(store.list_test_cases(req.id).unwrap().len(), 2);
    }

    #[test]
    fn test_readers_never_see_partial_feature_set() {
        let store = InMemoryPipelineStore::new();
        let req = store
            .insert_requirement(NewRequirement::new("t", "c", "o"))
            .unwrap();
        let generation_a = || vec![new_feature("a"), new_feature("a"), new_feature("a")];
        let generation_b = || vec![new_feature("b"), new_feature("b")];
        store.replace_features(req.id, generation_a()).unwrap();

        let writes = 500;
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for round in 0..writes {
                    let features = if round % 2 == 0 { generation_b() } else { generation_a() };
                    store.replace_features(req.id, features).unwrap();
                }
            });

            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..writes {
                        let listed = store.list_features(req.id).unwrap();
                        let names: Vec<&str> = listed.iter().map(|f| f.name.as_str()).collect();
                        assert!(
                            names == ["a", "a", "a"] || names == ["b", "b"],
                            "observed mixed or empty feature set: {:?}",
                            names
                        );
                    }
                });
            }
        });
    }

    #[test]
    fn test_replace_features_unknown_requirement() {
        let store = InMemoryPipelineStore::new();
        assert!(store
            .replace_features(5, vec![new_feature("a")])
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_save_test_cases_assigns_ids_in_order() {
        let store = InMemoryPipelineStore::new();
        let req = store
            .insert_requirement(NewRequirement::new("t", "c", "o"))
            .unwrap();
        let saved = store
            .save_test_cases(vec![new_case(req.id, None), new_case(req.id, None)])
            .unwrap();
        assert_eq!(saved[0].id, 1);
        assert_eq!(saved[1].id, 2);
        assert_eq!(store.list_test_cases(req.id).unwrap().len(), 2);
    }

    #[test]
    fn test_save_test_cases_rejects_unknown_feature() {
        let store = InMemoryPipelineStore::new();
        let req = store
            .insert_requirement(NewRequirement::new("t", "c", "o"))
            .unwrap();
        let err = store
            .save_test_cases(vec![new_case(req.id, Some(99))])
            .unwrap_err();
        assert_eq!(err, StoreError::not_found("Feature", 99));
        assert_eq!(store.test_case_count(), 0);
    }

    #[test]
    fn test_upsert_evaluation_overwrites() {
        let store = InMemoryPipelineStore::new();
        let req = store
            .insert_requirement(NewRequirement::new("t", "c", "o"))
            .unwrap();
        let case = store.save_test_cases(vec![new_case(req.id, None)]).unwrap()[0].clone();

        let first = store.upsert_evaluation(new_evaluation(case.id, 40.0)).unwrap();
        let second = store.upsert_evaluation(new_evaluation(case.id, 90.0)).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.evaluation_count(), 1);
        assert_eq!(
            store.load_evaluation(case.id).unwrap().unwrap().total_score,
            90.0
        );
    }

    #[test]
    fn test_delete_requirement_cascades() {
        let store = InMemoryPipelineStore::new();
        let keep = store
            .insert_requirement(NewRequirement::new("keep", "c", "o"))
            .unwrap();
        let drop = store
            .insert_requirement(NewRequirement::new("drop", "c", "o"))
            .unwrap();

        let features = store
            .replace_features(drop.id, vec![new_feature("a")])
            .unwrap();
        let cases = store
            .save_test_cases(vec![
                new_case(drop.id, Some(features[0].id)),
                new_case(keep.id, None),
            ])
            .unwrap();
        store.upsert_evaluation(new_evaluation(cases[0].id, 50.0)).unwrap();
        store
            .append_history(NewHistoryEntry {
                requirement_id: drop.id,
                generation_type: GenerationType::Full,
                status: RunStatus::Completed,
                features_count: 1,
                test_cases_count: 1,
                average_score: Some(50.0),
                processing_time_ms: 1,
                error_message: None,
            })
            .unwrap();

        store.delete_requirement(drop.id).unwrap();

        assert_eq!(store.requirement_count(), 1);
        assert_eq!(store.feature_count(), 0);
        assert_eq!(store.test_case_count(), 1);
        assert_eq!(store.evaluation_count(), 0);
        assert!(store.list_history(drop.id).unwrap().is_empty());
        assert!(store.load_requirement(drop.id).unwrap_err().is_not_found());
    }
}
