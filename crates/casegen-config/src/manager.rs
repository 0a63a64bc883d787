//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    error::{ConfigError, Result},
    types::CaseGenConfig,
};

/// Default prefix for environment overrides, as in `CASEGEN_SCORING__READY_THRESHOLD`
pub const DEFAULT_ENV_PREFIX: &str = "CASEGEN";

const ENV_SEPARATOR: &str = "__";

/// Loads, validates and saves [`CaseGenConfig`]
///
/// Sources are layered lowest first: built-in defaults, the TOML file when it
/// exists, then environment variables.
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a manager for the per-user config file
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Create with custom config path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Path of the TOML file this manager reads and writes
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("casegen")
            .join("config.toml")
    }

    /// Load and validate the layered configuration
    pub fn load_config(&self) -> Result<CaseGenConfig> {
        let builder = Config::builder()
            .add_source(File::from(self.config_path.clone()).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let casegen_config: CaseGenConfig = config.try_deserialize()?;
        self.validate_config(&casegen_config)?;

        info!(
            path = %self.config_path.display(),
            taxonomy_version = %casegen_config.taxonomy.version,
            "Configuration loaded"
        );
        Ok(casegen_config)
    }

    /// Write `config` to the TOML file, creating parent directories
    pub fn save_config(&self, config: &CaseGenConfig) -> Result<()> {
        let toml = toml::to_string(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        debug!(path = %self.config_path.display(), "Configuration saved");
        Ok(())
    }

    /// Check every section and their cross references
    pub fn validate_config(&self, config: &CaseGenConfig) -> Result<()> {
        config
            .taxonomy
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        config
            .scoring
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        let catalog = config.templates.load_catalog()?;
        catalog
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        config
            .generation
            .validate(&catalog)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if config.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Log level cannot be empty".to_string(),
            ));
        }
        EnvFilter::try_new(&config.logging.level).map_err(|e| {
            ConfigError::Validation(format!("Invalid log level '{}': {}", config.logging.level, e))
        })?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
