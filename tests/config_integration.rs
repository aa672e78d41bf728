use kg_schema_registry::config::{AppConfig, PersistenceProvider};
use kg_schema_registry::schema::DuplicateScope;
use serial_test::serial;
use std::env;
use std::fs;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("KGS_REGISTRY__DUPLICATE_SCOPE");
        env::remove_var("KGS_PERSISTENCE__CONNECTION");
        env::remove_var("KGS_PERSISTENCE__PROVIDER");
        env::remove_var("KGS_TELEMETRY__JSON");
        env::remove_var("CONFIG_FILE");
    }
}

fn load(args: &[&str]) -> AppConfig {
    let mut argv = vec!["kg-schema"];
    argv.extend_from_slice(args);
    AppConfig::load_from_args(argv).expect("Failed to load config")
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = load(&[]);
    assert_eq!(config.registry.duplicate_scope, DuplicateScope::Origin);
    assert_eq!(config.persistence.provider, PersistenceProvider::File);
    assert_eq!(config.persistence.connection, "default");
    assert!(config.catalog.path.is_none());
    assert!(!config.telemetry.json);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("KGS_REGISTRY__DUPLICATE_SCOPE", "combined");
        env::set_var("KGS_PERSISTENCE__CONNECTION", "neo4j://graph:7687");
        env::set_var("KGS_TELEMETRY__JSON", "true");
    }

    let config = load(&[]);
    assert_eq!(config.registry.duplicate_scope, DuplicateScope::Combined);
    assert_eq!(config.persistence.connection, "neo4j://graph:7687");
    assert!(config.telemetry.json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("registry.yaml");
    let config_content = r#"
persistence:
  provider: memory
  connection: bolt://files:7687
catalog:
  path: /srv/catalog.yaml
    "#;
    fs::write(&file_path, config_content).expect("Failed to write temp config");

    let config = load(&["--config", file_path.to_str().unwrap()]);
    assert_eq!(config.persistence.provider, PersistenceProvider::Memory);
    assert_eq!(config.persistence.connection, "bolt://files:7687");
    assert_eq!(config.catalog.path.as_deref(), Some("/srv/catalog.yaml"));
    // Untouched keys keep their defaults.
    assert_eq!(config.persistence.directory, ".kg-schema");
}

#[test]
#[serial]
fn test_missing_explicit_file_fails() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["kg-schema", "--config", "/no/such/registry.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cli_beats_env_and_file() {
    clear_env_vars();

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("registry.yaml");
    fs::write(&file_path, "persistence:\n  connection: from-file\n").unwrap();
    unsafe {
        env::set_var("KGS_PERSISTENCE__CONNECTION", "from-env");
    }

    let env_wins = load(&["--config", file_path.to_str().unwrap()]);
    assert_eq!(env_wins.persistence.connection, "from-env");

    let cli_wins = load(&[
        "--config",
        file_path.to_str().unwrap(),
        "--connection",
        "from-cli",
        "--duplicate-scope",
        "combined",
    ]);
    assert_eq!(cli_wins.persistence.connection, "from-cli");
    assert_eq!(cli_wins.registry.duplicate_scope, DuplicateScope::Combined);

    clear_env_vars();
}

#[test]
#[serial]
fn test_invalid_scope_rejected() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["kg-schema", "--duplicate-scope", "everywhere"]);
    assert!(result.is_err());
}
