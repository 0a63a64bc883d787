//! Configuration types

use std::path::PathBuf;
use std::sync::Arc;

use casegen_domain::PipelineStore;
use casegen_generation::{
    GenerationConfig, GenerationOrchestrator, QualityEvaluator, ScoringConfig, TemplateCatalog,
    TestCaseGenerator,
};
use casegen_parser::{RequirementParser, Taxonomy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Complete pipeline configuration
///
/// Every section falls back to the built-in data, so an empty file is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseGenConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Generator settings
    pub generation: GenerationConfig,
    /// Evaluator settings
    pub scoring: ScoringConfig,
    /// Template catalog source
    pub templates: TemplatesConfig,
    /// Parser vocabulary
    pub taxonomy: Taxonomy,
}

/// Where the template catalog comes from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// YAML catalog file; takes precedence over `catalog` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,
    /// Inline catalog
    pub catalog: TemplateCatalog,
}

impl TemplatesConfig {
    /// Resolve the catalog, reading the YAML file if one is configured
    pub fn load_catalog(&self) -> Result<TemplateCatalog> {
        match &self.catalog_file {
            Some(path) => {
                debug!(path = %path.display(), "Loading template catalog file");
                Ok(TemplateCatalog::from_yaml_file(path)?)
            }
            None => Ok(self.catalog.clone()),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Colored output
    pub ansi: bool,
    /// Include the event target
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
            with_target: false,
        }
    }
}

impl CaseGenConfig {
    /// Build a parser from the configured taxonomy
    pub fn parser(&self) -> Result<RequirementParser> {
        Ok(RequirementParser::new(Arc::new(self.taxonomy.clone()))?)
    }

    /// Build a generator from the configured catalog and generation settings
    pub fn generator(&self) -> Result<TestCaseGenerator> {
        let catalog = self.templates.load_catalog()?;
        Ok(TestCaseGenerator::with_config(
            Arc::new(catalog),
            self.generation.clone(),
        )?)
    }

    /// Build an evaluator from the scoring settings
    pub fn evaluator(&self) -> Result<QualityEvaluator> {
        Ok(QualityEvaluator::with_config(self.scoring.clone())?)
    }

    /// Wire a full orchestrator over `store`
    pub fn build_orchestrator(
        &self,
        store: Arc<dyn PipelineStore>,
    ) -> Result<GenerationOrchestrator> {
        Ok(GenerationOrchestrator::new(
            store,
            self.parser()?,
            self.generator()?,
            self.evaluator()?,
        ))
    }
}
