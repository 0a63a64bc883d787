//! Test case quality scoring
//!
//! Five independent keyword heuristics each produce a sub-score in
//! [0, 100]; the total is their weighted sum. Scoring is pure: the same
//! test case always gets the same evaluation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use casegen_domain::{
    test_types, EvaluationDetails, Feature, NewEvaluation, SubScores, TestCase,
};

use crate::error::GenerationError;

const COMPLETENESS_SUGGESTION: &str = "建议完善测试用例的前置条件、测试步骤或预期结果";
const ACCURACY_SUGGESTION: &str = "建议使用更准确的技术术语和操作描述";
const EXECUTABILITY_SUGGESTION: &str = "建议增加更具体的操作步骤和可验证的结果描述";
const COVERAGE_SUGGESTION: &str = "建议扩展测试覆盖范围，包含更多测试场景";
const CLARITY_SUGGESTION: &str = "建议使用更清晰明确的语言描述，避免模糊表达";
/// Emitted when the total reaches the ready threshold
pub const READY_MESSAGE: &str = "测试用例质量良好，可直接使用";

/// Weight of each sub-score in the total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Weight for completeness
    pub completeness: f64,
    /// Weight for accuracy
    pub accuracy: f64,
    /// Weight for executability
    pub executability: f64,
    /// Weight for coverage
    pub coverage: f64,
    /// Weight for clarity
    pub clarity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            completeness: 0.25,
            accuracy: 0.25,
            executability: 0.20,
            coverage: 0.20,
            clarity: 0.10,
        }
    }
}

impl ScoreWeights {
    fn as_array(&self) -> [f64; 5] {
        [
            self.completeness,
            self.accuracy,
            self.executability,
            self.coverage,
            self.clarity,
        ]
    }

    /// Sum of all weights
    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Weighted total of clamped sub-scores, itself clamped to [0, 100]
    pub fn total(&self, scores: &SubScores) -> f64 {
        let total = clamp_score(scores.completeness) * self.completeness
            + clamp_score(scores.accuracy) * self.accuracy
            + clamp_score(scores.executability) * self.executability
            + clamp_score(scores.coverage) * self.coverage
            + clamp_score(scores.clarity) * self.clarity;
        clamp_score(total)
    }
}

/// A probable typo and its correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypoRule {
    /// Misspelling to look for
    pub wrong: String,
    /// Intended spelling
    pub right: String,
}

/// Keyword lists used by the sub-scorers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationKeywords {
    /// Domain terms rewarded by accuracy
    pub domain_terms: Vec<String>,
    /// Operations rewarded by accuracy
    pub operations: Vec<String>,
    /// Action verbs rewarded in steps by executability
    pub action_verbs: Vec<String>,
    /// State-disclosure words rewarded in expected results by executability
    pub state_disclosure: Vec<String>,
    /// Clarity signals
    pub clarity_signals: Vec<String>,
    /// Typo rules reported in details
    pub typos: Vec<TypoRule>,
}

impl Default for EvaluationKeywords {
    fn default() -> Self {
        Self {
            domain_terms: words(&[
                "座椅", "调节", "记忆", "加热", "通风", "按摩", "安全", "角度", "温度", "时间", "速度",
                "位置",
            ]),
            operations: words(&["点击", "设置", "调整", "启动", "停止", "切换", "选择"]),
            action_verbs: words(&["点击", "设置", "调整", "输入", "选择", "确认"]),
            state_disclosure: words(&["检查", "验证", "观察", "确认", "测量", "显示"]),
            clarity_signals: words(&["具体", "明确", "详细", "清晰"]),
            typos: vec![
                TypoRule {
                    wrong: "坐椅".to_string(),
                    right: "座椅".to_string(),
                },
                TypoRule {
                    wrong: "点机".to_string(),
                    right: "点击".to_string(),
                },
            ],
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Sub-score weights
    pub weights: ScoreWeights,
    /// Sub-scores below this get an improvement suggestion
    pub suggestion_threshold: f64,
    /// Totals at or above this get the ready message
    pub ready_threshold: f64,
    /// Test types that earn full coverage
    pub well_covered_types: Vec<String>,
    /// Keyword lists
    pub keywords: EvaluationKeywords,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            suggestion_threshold: 80.0,
            ready_threshold: 85.0,
            well_covered_types: vec![
                test_types::FUNCTION.to_string(),
                test_types::BOUNDARY.to_string(),
            ],
            keywords: EvaluationKeywords::default(),
        }
    }
}

impl ScoringConfig {
    /// Check weights, thresholds and keyword lists
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.weights.as_array().iter().any(|w| !(0.0..=1.0).contains(w)) {
            return Err(GenerationError::InvalidConfig(
                "score weights must lie in [0, 1]".to_string(),
            ));
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(GenerationError::InvalidConfig(format!(
                "score weights must sum to 1.0, got {}",
                sum
            )));
        }
        for (name, threshold) in [
            ("suggestion_threshold", self.suggestion_threshold),
            ("ready_threshold", self.ready_threshold),
        ] {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(GenerationError::InvalidConfig(format!(
                    "{} must lie in [0, 100], got {}",
                    name, threshold
                )));
            }
        }

        let keywords = &self.keywords;
        for (name, list) in [
            ("domain_terms", &keywords.domain_terms),
            ("operations", &keywords.operations),
            ("action_verbs", &keywords.action_verbs),
            ("state_disclosure", &keywords.state_disclosure),
            ("clarity_signals", &keywords.clarity_signals),
            ("well_covered_types", &self.well_covered_types),
        ] {
            if list.is_empty() || list.iter().any(|k| k.is_empty()) {
                return Err(GenerationError::InvalidConfig(format!(
                    "{} must be a non-empty list of non-empty words",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Scores test cases and suggests improvements
#[derive(Debug, Clone, Default)]
pub struct QualityEvaluator {
    config: ScoringConfig,
}

impl QualityEvaluator {
    /// Create an evaluator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator with custom configuration
    pub fn with_config(config: ScoringConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Gets the current configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Evaluate one test case
    ///
    /// `feature` is the feature the case was generated from, when known. It
    /// narrows the coverage hints to test types that apply to that feature.
    pub fn evaluate(&self, test_case: &TestCase, feature: Option<&Feature>) -> NewEvaluation {
        let scores = self.sub_scores(test_case);
        let total_score = self.config.weights.total(&scores);
        let suggestions = self.suggestions(&scores, total_score);
        let details = self.details(test_case, feature);

        debug!(
            test_case_id = test_case.id,
            score = total_score,
            suggestions = suggestions.len(),
            "Evaluated test case"
        );

        NewEvaluation {
            test_case_id: test_case.id,
            scores,
            total_score,
            suggestions,
            details,
        }
    }

    /// Evaluate test cases in parallel, keeping input order
    pub fn evaluate_batch(&self, test_cases: &[(&TestCase, Option<&Feature>)]) -> Vec<NewEvaluation> {
        test_cases
            .par_iter()
            .map(|(test_case, feature)| self.evaluate(test_case, *feature))
            .collect()
    }

    /// The five sub-scores, each clamped to [0, 100]
    pub fn sub_scores(&self, test_case: &TestCase) -> SubScores {
        SubScores {
            completeness: self.completeness(test_case),
            accuracy: self.accuracy(test_case),
            executability: self.executability(test_case),
            coverage: self.coverage(test_case),
            clarity: self.clarity(test_case),
        }
    }

    fn completeness(&self, test_case: &TestCase) -> f64 {
        let mut score = 0.0;
        if has_preconditions(test_case) {
            score += 30.0;
        }
        if has_steps(test_case) {
            score += 40.0;
        }
        if has_expected_result(test_case) {
            score += 30.0;
        }
        clamp_score(score)
    }

    fn accuracy(&self, test_case: &TestCase) -> f64 {
        let content = format!("{} {}", test_case.description, test_case.test_steps);
        let keywords = &self.config.keywords;
        let mut score = 50.0;
        if contains_any(&content, &keywords.domain_terms) {
            score += 25.0;
        }
        if contains_any(&content, &keywords.operations) {
            score += 25.0;
        }
        clamp_score(score)
    }

    fn executability(&self, test_case: &TestCase) -> f64 {
        let keywords = &self.config.keywords;
        let mut score = 40.0;
        if contains_any(&test_case.test_steps, &keywords.action_verbs) {
            score += 30.0;
        }
        if contains_any(&test_case.expected_result, &keywords.state_disclosure) {
            score += 30.0;
        }
        clamp_score(score)
    }

    fn coverage(&self, test_case: &TestCase) -> f64 {
        let mut score = 50.0;
        if self.config.well_covered_types.contains(&test_case.test_type) {
            score += 50.0;
        }
        clamp_score(score)
    }

    fn clarity(&self, test_case: &TestCase) -> f64 {
        let content = format!("{} {}", test_case.test_steps, test_case.expected_result);
        let mut score = 60.0;
        if contains_any(&content, &self.config.keywords.clarity_signals) {
            score += 40.0;
        }
        clamp_score(score)
    }

    /// Improvement suggestions in dimension order, plus the ready message
    pub fn suggestions(&self, scores: &SubScores, total_score: f64) -> Vec<String> {
        let threshold = self.config.suggestion_threshold;
        let mut suggestions: Vec<String> = [
            (scores.completeness, COMPLETENESS_SUGGESTION),
            (scores.accuracy, ACCURACY_SUGGESTION),
            (scores.executability, EXECUTABILITY_SUGGESTION),
            (scores.coverage, COVERAGE_SUGGESTION),
            (scores.clarity, CLARITY_SUGGESTION),
        ]
        .into_iter()
        .filter(|(score, _)| *score < threshold)
        .map(|(_, suggestion)| suggestion.to_string())
        .collect();

        if total_score >= self.config.ready_threshold {
            suggestions.push(READY_MESSAGE.to_string());
        }
        suggestions
    }

    fn details(&self, test_case: &TestCase, feature: Option<&Feature>) -> EvaluationDetails {
        let keywords = &self.config.keywords;
        let accuracy_content = format!("{} {}", test_case.description, test_case.test_steps);
        let clarity_content = format!("{} {}", test_case.test_steps, test_case.expected_result);
        let full_content = format!(
            "{} {} {}",
            test_case.description, test_case.test_steps, test_case.expected_result
        );

        let mut missing_elements = Vec::new();
        if !has_preconditions(test_case) {
            missing_elements.push("前置条件".to_string());
        }
        if !has_steps(test_case) {
            missing_elements.push("详细测试步骤".to_string());
        }
        if !has_expected_result(test_case) {
            missing_elements.push("预期结果".to_string());
        }

        let potential_errors = keywords
            .typos
            .iter()
            .filter(|typo| full_content.contains(typo.wrong.as_str()))
            .map(|typo| format!("可能的错别字：'{}' 应为 '{}'", typo.wrong, typo.right))
            .collect();

        let mut execution_challenges = Vec::new();
        if test_case.test_steps.contains("观察") && !test_case.test_steps.contains("如何") {
            execution_challenges.push("缺少具体的观察方法说明".to_string());
        }
        if test_case.expected_result.contains("正常") && !test_case.expected_result.contains("具体") {
            execution_challenges.push("预期结果描述过于抽象".to_string());
        }

        let mut clarity_issues = Vec::new();
        if clarity_content.contains("等等") {
            clarity_issues.push("使用了模糊的表达 '等等'".to_string());
        }
        if clarity_content.contains("相关") && !clarity_content.contains("具体") {
            clarity_issues.push("使用了不够具体的表达 '相关'".to_string());
        }

        EvaluationDetails {
            missing_elements,
            domain_terms: found(&accuracy_content, &keywords.domain_terms),
            operations: found(&accuracy_content, &keywords.operations),
            actionable_steps: found(&test_case.test_steps, &keywords.action_verbs),
            verifiable_results: found(&test_case.expected_result, &keywords.state_disclosure),
            clarity_signals: found(&clarity_content, &keywords.clarity_signals),
            potential_errors,
            execution_challenges,
            clarity_issues,
            missing_coverage: missing_coverage(test_case, feature),
        }
    }
}

/// Arithmetic mean of total scores, or `None` for an empty batch
pub fn average_score<'a>(evaluations: impl IntoIterator<Item = &'a NewEvaluation>) -> Option<f64> {
    let (sum, count) = evaluations
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), e| (sum + e.total_score, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn missing_coverage(test_case: &TestCase, feature: Option<&Feature>) -> Vec<String> {
    if test_case.test_type != test_types::FUNCTION {
        return Vec::new();
    }
    let (boundary, exception) = match feature {
        Some(feature) => (!feature.parameters.is_empty(), !feature.constraints.is_empty()),
        None => (true, true),
    };
    let mut hints = Vec::new();
    if boundary {
        hints.push("可考虑增加边界值测试".to_string());
    }
    if exception {
        hints.push("可考虑增加异常情况测试".to_string());
    }
    hints
}

fn has_preconditions(test_case: &TestCase) -> bool {
    char_len(&test_case.preconditions) > 10
}

fn has_steps(test_case: &TestCase) -> bool {
    char_len(&test_case.test_steps) > 20
}

fn has_expected_result(test_case: &TestCase) -> bool {
    char_len(&test_case.expected_result) > 10
}

fn char_len(text: &str) -> usize {
    text.trim().chars().count()
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

fn found(text: &str, keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| text.contains(k.as_str()))
        .cloned()
        .collect()
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}
