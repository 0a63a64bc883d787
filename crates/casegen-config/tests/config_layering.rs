use std::sync::Arc;

use casegen_config::{CaseGenConfig, ConfigError, ConfigManager};
use casegen_domain::{NewRequirement, PipelineStore, RunStatus};
use casegen_generation::TemplateCatalog;
use casegen_persistence::InMemoryPipelineStore;

#[test]
fn test_file_overrides_selected_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[logging]
level = "debug"

[scoring]
ready_threshold = 90.0

[generation]
extra_test_types = ["performance"]

[taxonomy]
version = "2"
"#,
    )
    .unwrap();

    let config = ConfigManager::with_path(&path)
        .with_env_prefix("CASEGEN_ITEST_FILE")
        .load_config()
        .unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.scoring.ready_threshold, 90.0);
    assert_eq!(config.scoring.suggestion_threshold, 80.0);
    assert_eq!(config.generation.extra_test_types, vec!["performance"]);
    assert_eq!(config.taxonomy.version, "2");
    assert_eq!(config.taxonomy.categories.len(), 6);
}

#[test]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[scoring]\nready_threshold = 90.0\n").unwrap();

    std::env::set_var("CASEGEN_ITEST_ENV_SCORING__READY_THRESHOLD", "70");
    let loaded = ConfigManager::with_path(&path)
        .with_env_prefix("CASEGEN_ITEST_ENV")
        .load_config();
    std::env::remove_var("CASEGEN_ITEST_ENV_SCORING__READY_THRESHOLD");

    assert_eq!(loaded.unwrap().scoring.ready_threshold, 70.0);
}

#[test]
fn test_invalid_weights_in_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[scoring.weights]\ncompleteness = 0.9\n").unwrap();

    let result = ConfigManager::with_path(&path)
        .with_env_prefix("CASEGEN_ITEST_WEIGHTS")
        .load_config();
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_save_then_load_preserves_config() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::with_path(dir.path().join("config.toml"))
        .with_env_prefix("CASEGEN_ITEST_SAVE");

    let mut config = CaseGenConfig::default();
    config.scoring.ready_threshold = 88.0;
    config.generation.default_max_value = "250".to_string();
    manager.save_config(&config).unwrap();

    let loaded = manager.load_config().unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_catalog_file_drives_generation() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("templates.yaml");
    let mut catalog = TemplateCatalog::builtin();
    catalog.version = "2".to_string();
    if let Some(function) = catalog.templates.get_mut("function") {
        function.title = "{feature_name}基本功能验证".to_string();
    }
    std::fs::write(&catalog_path, catalog.to_yaml().unwrap()).unwrap();

    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!("[templates]\ncatalog_file = '{}'\n", catalog_path.display()),
    )
    .unwrap();

    let config = ConfigManager::with_path(&config_path)
        .with_env_prefix("CASEGEN_ITEST_CATALOG")
        .load_config()
        .unwrap();

    let store = Arc::new(InMemoryPipelineStore::new());
    let requirement = store
        .insert_requirement(NewRequirement::new(
            "记忆",
            "座椅需要支持记忆功能，支持3组记忆位置存储。",
            "tester",
        ))
        .unwrap();
    let orchestrator = config.build_orchestrator(store.clone()).unwrap();

    let history = orchestrator.run_full_workflow(requirement.id).unwrap();
    assert_eq!(history.status, RunStatus::Completed);

    let titles: Vec<String> = store
        .list_test_cases(requirement.id)
        .unwrap()
        .into_iter()
        .map(|case| case.title)
        .collect();
    assert!(titles.contains(&"记忆功能基本功能验证".to_string()));
}

#[test]
fn test_missing_catalog_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = CaseGenConfig::default();
    config.templates.catalog_file = Some(dir.path().join("missing.yaml"));

    let store = Arc::new(InMemoryPipelineStore::new());
    assert!(matches!(
        config.build_orchestrator(store),
        Err(ConfigError::Template(_))
    ));
}
