//! Property-based tests for test type selection
//!
//! Property: `function` always comes first, `boundary` appears exactly when
//! the feature has parameters, `exception` exactly when it has constraints,
//! in that order, and every generated case inherits the feature priority.

use std::collections::BTreeMap;
use std::sync::Arc;

use casegen_domain::{ConstraintValue, Feature, ParameterValue, Priority};
use casegen_generation::{GenerationOptions, TemplateCatalog, TestCaseGenerator};
use chrono::Utc;
use proptest::prelude::*;

/// Strategy for features with optional parameters and constraints
fn feature_strategy() -> impl Strategy<Value = Feature> {
    (
        any::<bool>(),
        any::<bool>(),
        prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)],
        prop_oneof![Just("记忆功能"), Just("加热功能"), Just("靠背角度调节")],
        (0u32..100, 100u32..500),
    )
        .prop_map(|(has_parameters, has_constraints, priority, name, (low, high))| {
            let mut parameters = BTreeMap::new();
            if has_parameters {
                parameters.insert("min_value".to_string(), ParameterValue::Scalar(low.to_string()));
                parameters.insert("max_value".to_string(), ParameterValue::Scalar(high.to_string()));
            }
            let mut constraints = BTreeMap::new();
            if has_constraints {
                constraints.insert("safety_restriction".to_string(), ConstraintValue::Flag(true));
            }
            Feature {
                id: 5,
                requirement_id: 2,
                name: name.to_string(),
                feature_type: name.to_string(),
                description: String::new(),
                parameters,
                constraints,
                dependencies: Vec::new(),
                priority,
                created_at: Utc::now(),
            }
        })
}

/// Strategy for extra requested types
fn extras_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("security".to_string()),
            Just("performance".to_string()),
            Just("function".to_string()),
            Just("boundary".to_string()),
        ],
        0..4,
    )
}

proptest! {
    #[test]
    fn prop_type_order(feature in feature_strategy(), extras in extras_strategy()) {
        let generator = TestCaseGenerator::new(Arc::new(TemplateCatalog::builtin()));
        let options = GenerationOptions::with_test_types(extras.clone());

        let drafts = generator.generate(&feature, &options).unwrap();
        let types: Vec<&str> = drafts.iter().map(|d| d.test_type.as_str()).collect();

        let mut expected = vec!["function"];
        if !feature.parameters.is_empty() {
            expected.push("boundary");
        }
        if !feature.constraints.is_empty() {
            expected.push("exception");
        }
        prop_assert_eq!(&types[..expected.len()], &expected[..]);

        let mut unique = types.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(unique.len(), types.len());
        for extra in &extras {
            prop_assert!(types.contains(&extra.as_str()));
        }
        prop_assert!(drafts.iter().all(|d| d.priority == feature.priority));
    }

    #[test]
    fn prop_rendered_text_has_no_placeholders(feature in feature_strategy()) {
        let generator = TestCaseGenerator::new(Arc::new(TemplateCatalog::builtin()));
        let options = GenerationOptions::with_test_types(["security", "performance"]);

        for draft in generator.generate(&feature, &options).unwrap() {
            for text in [&draft.title, &draft.description, &draft.preconditions, &draft.test_steps, &draft.expected_result] {
                prop_assert!(!text.contains('{'), "text contains '{{': {:?}", text);
                prop_assert!(!text.contains('}'), "text contains '}}': {:?}", text);
            }
        }
    }
}
