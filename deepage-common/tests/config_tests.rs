//! Unit tests for configuration resolution and graceful degradation
//!
//! Tests that manipulate DEEPAGE_CONFIG or DEEPAGE_INFERENCE_API_KEY are
//! marked with #[serial] so they never race on process environment.

use deepage_common::config::{
    load_config, load_toml_config, resolve_config_path, ConfigSource, TomlConfig,
    API_KEY_ENV_VAR, CONFIG_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/deepage-env.toml");
    let cli = PathBuf::from("/tmp/deepage-cli.toml");

    let resolved = resolve_config_path(Some(&cli));

    assert_eq!(resolved, Some(cli));
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/deepage-env.toml");

    let resolved = resolve_config_path(None);

    assert_eq!(resolved, Some(PathBuf::from("/tmp/deepage-env.toml")));
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_degrades_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let (config, source) = load_config(Some(&missing)).unwrap();

    assert_eq!(source, ConfigSource::Missing(missing));
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.logging.level, "info");
    assert!(config.inference.models.is_empty());
}

#[test]
fn test_full_config_parses() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
database_path = "/var/lib/deepage/deepage.db"

[logging]
level = "debug"

[inference]
base_url = "http://localhost:8080/v1"
models = ["primary-model", "backup-model"]
requests_per_minute = 10

[engine]
off_flavor_threshold = 35.0
top_k = 3

[engine.environment]
ocean_temp_c = 6.0
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.inference.models, vec!["primary-model", "backup-model"]);
    assert_eq!(config.inference.requests_per_minute, 10);
    assert_eq!(config.engine.off_flavor_threshold, 35.0);
    assert_eq!(config.engine.top_k, 3);
    assert_eq!(config.engine.environment.ocean_temp_c, 6.0);
    assert_eq!(config.engine.environment.cellar_temp_c, 12.0);
    assert_eq!(
        config.database_path,
        Some(PathBuf::from("/var/lib/deepage/deepage.db"))
    );
}

#[test]
fn test_existing_file_reports_its_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let (config, source) = load_config(Some(&path)).unwrap();

    assert_eq!(source, ConfigSource::File(path));
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_malformed_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[engine\ntop_k = ").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
fn test_invalid_engine_values_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[engine]\noff_flavor_threshold = 150.0\n").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
#[serial]
fn test_api_key_env_wins_over_toml() {
    let mut config = TomlConfig::default();
    config.inference.api_key = Some("toml-key".to_string());

    env::set_var(API_KEY_ENV_VAR, "env-key");
    assert_eq!(config.resolve_api_key(), Some("env-key".to_string()));

    env::remove_var(API_KEY_ENV_VAR);
    assert_eq!(config.resolve_api_key(), Some("toml-key".to_string()));
}

#[test]
#[serial]
fn test_blank_api_key_ignored() {
    env::remove_var(API_KEY_ENV_VAR);
    let mut config = TomlConfig::default();
    config.inference.api_key = Some("   ".to_string());

    assert_eq!(config.resolve_api_key(), None);
}
