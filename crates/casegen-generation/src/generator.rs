//! Feature → test case generation
//!
//! Test types are chosen from the feature's shape: `function` always,
//! `boundary` when the feature has parameters, `exception` when it has
//! constraints, then any extra types the caller asks for. Each type's
//! template is rendered with variables derived from the feature.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use casegen_domain::{test_types, Feature, NewTestCase, ParameterValue};

use crate::error::GenerationError;
use crate::templates::{TemplateCatalog, TemplateVariables};

/// Test types the generator may select on its own, in output order
pub const AUTOMATIC_TEST_TYPES: [&str; 3] = [
    test_types::FUNCTION,
    test_types::BOUNDARY,
    test_types::EXCEPTION,
];

/// Configuration for the test case generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Tokens searched, in order, to derive the `operation` variable
    pub operation_keywords: Vec<String>,
    /// `min_value` when the feature has no range
    pub default_min_value: String,
    /// `max_value` when the feature has no range
    pub default_max_value: String,
    /// Extra test types used when a request names none
    pub extra_test_types: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            operation_keywords: ["调节", "控制", "设置", "操作", "加热", "通风", "按摩", "存储"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            default_min_value: "0".to_string(),
            default_max_value: "100".to_string(),
            extra_test_types: Vec::new(),
        }
    }
}

impl GenerationConfig {
    /// Check the configuration against a template catalog
    pub fn validate(&self, catalog: &TemplateCatalog) -> Result<(), GenerationError> {
        let required = AUTOMATIC_TEST_TYPES
            .iter()
            .copied()
            .chain(self.extra_test_types.iter().map(String::as_str));
        for test_type in required {
            if !catalog.contains(test_type) {
                return Err(GenerationError::InvalidConfig(format!(
                    "test type {} has no template in catalog version {}",
                    test_type, catalog.version
                )));
            }
        }
        if self.operation_keywords.iter().any(|k| k.is_empty()) {
            return Err(GenerationError::InvalidConfig(
                "operation keywords cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-request generation options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Extra test types to add after the automatic ones
    #[serde(default)]
    pub test_types: Vec<String>,
}

impl GenerationOptions {
    /// Request extra test types
    pub fn with_test_types<I, S>(test_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            test_types: test_types.into_iter().map(Into::into).collect(),
        }
    }
}

/// Expands features into test case drafts
#[derive(Debug, Clone)]
pub struct TestCaseGenerator {
    catalog: Arc<TemplateCatalog>,
    config: GenerationConfig,
}

impl TestCaseGenerator {
    /// Create a generator with default configuration
    pub fn new(catalog: Arc<TemplateCatalog>) -> Self {
        Self {
            catalog,
            config: GenerationConfig::default(),
        }
    }

    /// Create a generator with custom configuration
    pub fn with_config(
        catalog: Arc<TemplateCatalog>,
        config: GenerationConfig,
    ) -> Result<Self, GenerationError> {
        config.validate(&catalog)?;
        Ok(Self { catalog, config })
    }

    /// The template catalog in use
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Gets the current configuration
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Test types to generate for a feature, in output order
    pub fn select_test_types(&self, feature: &Feature, options: &GenerationOptions) -> Vec<String> {
        let mut selected = vec![test_types::FUNCTION.to_string()];
        if !feature.parameters.is_empty() {
            selected.push(test_types::BOUNDARY.to_string());
        }
        if !feature.constraints.is_empty() {
            selected.push(test_types::EXCEPTION.to_string());
        }

        let extras = if options.test_types.is_empty() {
            &self.config.extra_test_types
        } else {
            &options.test_types
        };
        for extra in extras {
            if !selected.contains(extra) {
                selected.push(extra.clone());
            }
        }
        selected
    }

    /// Variables offered to templates for a feature
    pub fn variables(&self, feature: &Feature) -> TemplateVariables {
        let mut variables = TemplateVariables::new();
        variables.insert("feature_name".to_string(), feature.name.clone());
        variables.insert("feature_type".to_string(), feature.feature_type.clone());
        variables.insert("operation".to_string(), self.operation(feature));
        variables.insert(
            "min_value".to_string(),
            feature
                .scalar_parameter("min_value")
                .unwrap_or(&self.config.default_min_value)
                .to_string(),
        );
        variables.insert(
            "max_value".to_string(),
            feature
                .scalar_parameter("max_value")
                .unwrap_or(&self.config.default_max_value)
                .to_string(),
        );
        variables.insert(
            "unit".to_string(),
            feature
                .parameters
                .get("range_1")
                .and_then(ParameterValue::unit)
                .unwrap_or_default()
                .to_string(),
        );
        variables.insert("priority".to_string(), feature.priority.to_string());
        variables.insert("description".to_string(), feature.description.clone());
        variables
    }

    fn operation(&self, feature: &Feature) -> String {
        self.config
            .operation_keywords
            .iter()
            .find(|k| feature.name.contains(k.as_str()) || feature.description.contains(k.as_str()))
            .cloned()
            .unwrap_or_else(|| feature.name.clone())
    }

    /// Generate test case drafts for one feature
    ///
    /// Every template is looked up before anything renders, so an unknown
    /// test type fails the whole feature.
    pub fn generate(
        &self,
        feature: &Feature,
        options: &GenerationOptions,
    ) -> Result<Vec<NewTestCase>, GenerationError> {
        let selected = self.select_test_types(feature, options);
        let templates = selected
            .iter()
            .map(|test_type| self.catalog.get(test_type).map(|t| (test_type, t)))
            .collect::<Result<Vec<_>, _>>()?;

        let variables = self.variables(feature);
        let mut drafts = Vec::with_capacity(templates.len());
        for (test_type, template) in templates {
            let rendered = template.render(&variables)?;
            drafts.push(NewTestCase {
                requirement_id: feature.requirement_id,
                feature_id: Some(feature.id),
                title: rendered.title,
                description: rendered.description,
                test_type: test_type.clone(),
                preconditions: rendered.preconditions,
                test_steps: rendered.test_steps,
                expected_result: rendered.expected_result,
                priority: feature.priority,
            });
        }

        debug!(
            feature_id = feature.id,
            test_types = ?selected,
            "Generated test case drafts"
        );
        Ok(drafts)
    }

    /// Generate drafts for every feature, in feature order
    pub fn generate_all(
        &self,
        features: &[Feature],
        options: &GenerationOptions,
    ) -> Result<Vec<NewTestCase>, GenerationError> {
        let mut drafts = Vec::new();
        for feature in features {
            drafts.extend(self.generate(feature, options)?);
        }
        info!(
            features = features.len(),
            test_cases = drafts.len(),
            "Generated test cases"
        );
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateError;
    use casegen_domain::{ConstraintValue, Priority};
    use std::collections::BTreeMap;

    fn feature(parameters: bool, constraints: bool) -> Feature {
        let mut params = BTreeMap::new();
        if parameters {
            params.insert("min_value".to_string(), ParameterValue::Scalar("30".into()));
            params.insert("max_value".to_string(), ParameterValue::Scalar("45".into()));
            params.insert(
                "range_1".to_string(),
                ParameterValue::Range {
                    min: "30".into(),
                    max: "45".into(),
                    unit: Some("°".into()),
                },
            );
        }
        let mut limits = BTreeMap::new();
        if constraints {
            limits.insert(
                "time_limit".to_string(),
                ConstraintValue::Duration {
                    value: "5".into(),
                    unit: "分钟".into(),
                },
            );
        }
        Feature {
            id: 11,
            requirement_id: 3,
            name: "加热功能".into(),
            feature_type: "加热功能".into(),
            description: "座椅加热必须在5分钟内达到设定温度".into(),
            parameters: params,
            constraints: limits,
            dependencies: Vec::new(),
            priority: Priority::High,
            created_at: chrono::Utc::now(),
        }
    }

    fn generator() -> TestCaseGenerator {
        TestCaseGenerator::new(Arc::new(TemplateCatalog::builtin()))
    }

    fn types(drafts: &[NewTestCase]) -> Vec<&str> {
        drafts.iter().map(|d| d.test_type.as_str()).collect()
    }

    #[test]
    fn test_function_only_for_bare_feature() {
        let drafts = generator()
            .generate(&feature(false, false), &GenerationOptions::default())
            .unwrap();
        assert_eq!(types(&drafts), vec!["function"]);
    }

    #[test]
    fn test_parameters_and_constraints_select_all_automatic_types() {
        let drafts = generator()
            .generate(&feature(true, true), &GenerationOptions::default())
            .unwrap();
        assert_eq!(types(&drafts), vec!["function", "boundary", "exception"]);
        assert!(drafts.iter().all(|d| d.priority == Priority::High));
        assert!(drafts.iter().all(|d| d.feature_id == Some(11)));
        assert!(drafts.iter().all(|d| d.requirement_id == 3));
    }

    #[test]
    fn test_extra_types_appended_without_duplicates() {
        let options = GenerationOptions::with_test_types(["security", "function", "security"]);
        let drafts = generator().generate(&feature(true, false), &options).unwrap();
        assert_eq!(types(&drafts), vec!["function", "boundary", "security"]);
    }

    #[test]
    fn test_unknown_type_is_template_not_found() {
        let options = GenerationOptions::with_test_types(["compatibility"]);
        let err = generator().generate(&feature(false, false), &options).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Template(TemplateError::TemplateNotFound(name)) if name == "compatibility"
        ));
    }

    #[test]
    fn test_variables_from_feature() {
        let vars = generator().variables(&feature(true, false));
        assert_eq!(vars["min_value"], "30");
        assert_eq!(vars["max_value"], "45");
        assert_eq!(vars["unit"], "°");
        assert_eq!(vars["operation"], "加热");
        assert_eq!(vars["priority"], "high");
    }

    #[test]
    fn test_variable_defaults() {
        let mut bare = feature(false, false);
        bare.name = "记忆功能".into();
        bare.description = "支持用户档案".into();
        let vars = generator().variables(&bare);
        assert_eq!(vars["min_value"], "0");
        assert_eq!(vars["max_value"], "100");
        assert_eq!(vars["unit"], "");
        assert_eq!(vars["operation"], "记忆功能");
    }

    #[test]
    fn test_boundary_renders_range() {
        let drafts = generator()
            .generate(&feature(true, false), &GenerationOptions::default())
            .unwrap();
        let boundary = &drafts[1];
        assert_eq!(boundary.title, "加热功能边界测试");
        assert!(boundary.test_steps.contains("最大值45°"));
        assert!(boundary.test_steps.contains("最小值30°"));
    }

    #[test]
    fn test_missing_variable_surfaces() {
        let mut catalog = TemplateCatalog::builtin();
        if let Some(function) = catalog.templates.get_mut("function") {
            function.title = "{feature_name}{tolerance}".into();
        }
        let generator = TestCaseGenerator::new(Arc::new(catalog));
        let err = generator
            .generate(&feature(false, false), &GenerationOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Template(TemplateError::MissingVariable(name)) if name == "tolerance"
        ));
    }

    #[test]
    fn test_config_requires_templates_for_extras() {
        let config = GenerationConfig {
            extra_test_types: vec!["stress".into()],
            ..Default::default()
        };
        let result = TestCaseGenerator::with_config(Arc::new(TemplateCatalog::builtin()), config);
        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_configured_extras_apply_when_request_names_none() {
        let config = GenerationConfig {
            extra_test_types: vec!["performance".into()],
            ..Default::default()
        };
        let generator =
            TestCaseGenerator::with_config(Arc::new(TemplateCatalog::builtin()), config).unwrap();
        let drafts = generator
            .generate(&feature(false, false), &GenerationOptions::default())
            .unwrap();
        assert_eq!(types(&drafts), vec!["function", "performance"]);
    }
}
