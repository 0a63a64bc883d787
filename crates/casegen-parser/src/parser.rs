//! Requirement → feature parsing
//!
//! Detection, priority and parameter extraction all run over the whole
//! requirement text, not per sentence. Every feature produced by one parse
//! therefore shares the same priority, parameters, constraints and
//! dependencies; only name, type and description differ per category.

use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, error, info, warn};

use casegen_domain::{
    ConstraintValue, Feature, NewFeature, ParameterValue, PipelineStore, Requirement,
    RequirementId, RequirementStatus,
};

use crate::classifier::FeatureClassifier;
use crate::error::ParseError;
use crate::extractor::ParameterExtractor;
use crate::splitter::SentenceSplitter;
use crate::taxonomy::{FeatureCategory, Taxonomy};

/// Turns requirement text into feature records
#[derive(Debug, Clone)]
pub struct RequirementParser {
    taxonomy: Arc<Taxonomy>,
    splitter: SentenceSplitter,
    extractor: ParameterExtractor,
    classifier: FeatureClassifier,
    name_pattern: Option<Regex>,
    dependency_pattern: Option<Regex>,
}

impl RequirementParser {
    /// Create a parser over a validated taxonomy
    pub fn new(taxonomy: Arc<Taxonomy>) -> Result<Self, ParseError> {
        taxonomy.validate()?;

        let extractor = ParameterExtractor::new(&taxonomy.units, &taxonomy.time_units)?;
        let name_pattern = suffix_pattern("feature name", &taxonomy.action_suffixes)?;
        let dependency_pattern = suffix_pattern("dependency", &taxonomy.dependency_suffixes)?;

        Ok(Self {
            classifier: FeatureClassifier::new(taxonomy.clone()),
            splitter: SentenceSplitter::new(),
            taxonomy,
            extractor,
            name_pattern,
            dependency_pattern,
        })
    }

    /// The taxonomy this parser classifies against
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Parse a requirement and replace its stored features
    ///
    /// On success the requirement moves to `completed`. On failure it moves
    /// to `failed` (best effort) and the original error is returned.
    pub fn parse(
        &self,
        requirement: &Requirement,
        store: &dyn PipelineStore,
    ) -> Result<Vec<Feature>, ParseError> {
        info!(requirement_id = requirement.id, "Parsing requirement");

        let result = self.extract_features(requirement).and_then(|features| {
            store
                .replace_features(requirement.id, features)
                .map_err(ParseError::from)
        });

        match result {
            Ok(features) => {
                store.update_requirement_status(requirement.id, RequirementStatus::Completed)?;
                info!(
                    requirement_id = requirement.id,
                    features = features.len(),
                    "Requirement parsed"
                );
                Ok(features)
            }
            Err(err) => {
                error!(requirement_id = requirement.id, error = %err, "Requirement parse failed");
                if let Err(status_err) =
                    store.update_requirement_status(requirement.id, RequirementStatus::Failed)
                {
                    warn!(
                        requirement_id = requirement.id,
                        error = %status_err,
                        "Could not mark requirement as failed"
                    );
                }
                Err(err)
            }
        }
    }

    /// Extract feature records from a requirement without touching storage
    pub fn extract_features(
        &self,
        requirement: &Requirement,
    ) -> Result<Vec<NewFeature>, ParseError> {
        let content = requirement.content.as_str();
        let categories = self.classifier.detect(content);
        if categories.is_empty() {
            debug!(requirement_id = requirement.id, "No feature categories detected");
            return Ok(Vec::new());
        }

        let sentences = self.splitter.split(content);
        let priority = self.classifier.priority(content);
        let parameters = self.parameters(requirement.id, &sentences)?;
        let constraints = self.constraints(requirement.id, content, &sentences)?;
        let dependencies = self.dependencies(&sentences);

        debug!(
            requirement_id = requirement.id,
            categories = categories.len(),
            parameters = parameters.len(),
            constraints = constraints.len(),
            %priority,
            "Extracted requirement details"
        );

        Ok(categories
            .into_iter()
            .map(|category| NewFeature {
                requirement_id: requirement.id,
                name: self.feature_name(category, content, &sentences),
                feature_type: category.name.clone(),
                description: describe(category, &sentences),
                parameters: parameters.clone(),
                constraints: constraints.clone(),
                dependencies: dependencies.clone(),
                priority,
            })
            .collect())
    }

    fn feature_name(&self, category: &FeatureCategory, content: &str, sentences: &[&str]) -> String {
        if content.contains(category.name.as_str()) {
            return category.name.clone();
        }
        self.name_pattern
            .as_ref()
            .and_then(|pattern| {
                sentences
                    .iter()
                    .filter(|sentence| category.matches(sentence))
                    .find_map(|sentence| pattern.find(sentence))
            })
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| category.name.clone())
    }

    fn parameters(
        &self,
        requirement_id: RequirementId,
        sentences: &[&str],
    ) -> Result<BTreeMap<String, ParameterValue>, ParseError> {
        let mut parameters = BTreeMap::new();
        let mut range_count = 0;
        let mut value_count = 0;

        for sentence in sentences.iter().filter(|s| s.chars().any(|c| c.is_ascii_digit())) {
            let extraction = self.extractor.extract(sentence);

            for range in extraction.ranges {
                check_number(requirement_id, sentence, &range.low)?;
                check_number(requirement_id, sentence, &range.high)?;
                range_count += 1;
                if range_count == 1 {
                    parameters.insert("min_value".to_string(), ParameterValue::Scalar(range.low.clone()));
                    parameters.insert("max_value".to_string(), ParameterValue::Scalar(range.high.clone()));
                }
                parameters.insert(
                    format!("range_{}", range_count),
                    ParameterValue::Range {
                        min: range.low,
                        max: range.high,
                        unit: range.unit,
                    },
                );
            }

            for value in extraction.values.into_iter().filter(|v| !v.unit.is_empty()) {
                check_number(requirement_id, sentence, &value.number)?;
                value_count += 1;
                parameters.insert(
                    format!("value_{}", value_count),
                    ParameterValue::Measured {
                        value: value.number,
                        unit: value.unit,
                    },
                );
            }
        }

        Ok(parameters)
    }

    fn constraints(
        &self,
        requirement_id: RequirementId,
        content: &str,
        sentences: &[&str],
    ) -> Result<BTreeMap<String, ConstraintValue>, ParseError> {
        let mut constraints = BTreeMap::new();

        let mut limit_count = 0;
        for sentence in sentences {
            for duration in self.extractor.durations(sentence) {
                check_number(requirement_id, sentence, &duration.value)?;
                limit_count += 1;
                let key = if limit_count == 1 {
                    "time_limit".to_string()
                } else {
                    format!("time_limit_{}", limit_count)
                };
                constraints.insert(
                    key,
                    ConstraintValue::Duration {
                        value: duration.value,
                        unit: duration.unit,
                    },
                );
            }
        }

        if contains_any(content, &self.taxonomy.safety_words) {
            constraints.insert("safety_restriction".to_string(), ConstraintValue::Flag(true));
        }
        if contains_any(content, &self.taxonomy.concurrency_words) {
            constraints.insert("concurrent_operation".to_string(), ConstraintValue::Flag(true));
        }

        Ok(constraints)
    }

    fn dependencies(&self, sentences: &[&str]) -> Vec<String> {
        let Some(pattern) = &self.dependency_pattern else {
            return Vec::new();
        };

        let mut dependencies: Vec<String> = Vec::new();
        for sentence in sentences {
            for cue in &self.taxonomy.dependency_cues {
                for tail in sentence.split(cue.as_str()).skip(1) {
                    let Some(found) = pattern.find(tail) else {
                        continue;
                    };
                    // overlapping cues such as 需要基于 leave the inner cue in front
                    let name = strip_cues(found.as_str(), &self.taxonomy.dependency_cues);
                    if !name.is_empty() && !dependencies.iter().any(|d| d == name) {
                        dependencies.push(name.to_string());
                    }
                }
            }
        }
        dependencies
    }
}

fn describe(category: &FeatureCategory, sentences: &[&str]) -> String {
    sentences
        .iter()
        .filter(|sentence| category.matches(sentence))
        .copied()
        .collect::<Vec<_>>()
        .join("。")
}

fn contains_any(text: &str, words: &[String]) -> bool {
    words.iter().any(|w| text.contains(w.as_str()))
}

fn strip_cues<'a>(mut phrase: &'a str, cues: &[String]) -> &'a str {
    while let Some(rest) = cues.iter().find_map(|cue| phrase.strip_prefix(cue.as_str())) {
        phrase = rest;
    }
    phrase
}

fn check_number(
    requirement_id: RequirementId,
    sentence: &str,
    number: &str,
) -> Result<(), ParseError> {
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(()),
        _ => Err(ParseError::in_sentence(
            requirement_id,
            sentence,
            format!("numeric value {} is not representable", number),
        )),
    }
}

fn suffix_pattern(name: &'static str, suffixes: &[String]) -> Result<Option<Regex>, ParseError> {
    if suffixes.is_empty() {
        return Ok(None);
    }
    let alternation = suffixes
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\w+(?:{})", alternation))
        .map(Some)
        .map_err(|source| ParseError::InvalidPattern { name, source })
}
