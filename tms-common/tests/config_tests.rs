//! Integration tests for configuration resolution and graceful degradation
//!
//! Tests cover:
//! - Explicit config files (command line, environment) load and must exist
//! - Priority order: command line over environment
//! - Missing platform config falls back to built-in defaults
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate TMS_CONFIG are marked with #[serial].

use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tms_common::config::{resolve_config_source, ConfigSource, TomlConfig, CONFIG_ENV_VAR};
use tms_common::debounce::DebounceMode;
use tms_common::Error;

/// Test helper: write a config file into a fresh temp dir
fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn test_load_from_full_file() {
    let (_dir, path) = write_config(
        r#"
[debounce]
typing_ms = 250
paste_ms = 50
idle_ms = 2000

[search]
case_sensitive = true

[follow]
poll_interval_ms = 100
paste_threshold = 10

[logging]
level = "debug"
"#,
    );

    let config = TomlConfig::load_from(&path).unwrap();
    assert_eq!(config.debounce.typing_ms, 250);
    assert_eq!(config.debounce.delay(DebounceMode::Paste).as_millis(), 50);
    assert_eq!(config.debounce.delay(DebounceMode::Idle).as_millis(), 2000);
    assert!(config.search.case_sensitive);
    assert!(!config.search.whole_word);
    assert_eq!(config.follow.poll_interval_ms, 100);
    assert_eq!(config.follow.paste_threshold, 10);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_from_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = TomlConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_load_from_malformed_file() {
    let (_dir, path) = write_config("this is = = not toml");
    let err = TomlConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, Error::TomlParse(_)));
}

#[test]
#[serial]
fn test_env_var_names_config_file() {
    let (_dir, path) = write_config("[debounce]\nidle_ms = 1500\n");
    env::set_var(CONFIG_ENV_VAR, &path);

    let (config, source) = TomlConfig::load(None).unwrap();
    assert_eq!(source, ConfigSource::Environment(path.clone()));
    assert_eq!(config.debounce.idle_ms, 1500);

    // Cleanup
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_takes_precedence_over_env_var() {
    let (_env_dir, env_path) = write_config("[debounce]\nidle_ms = 1500\n");
    let (_cli_dir, cli_path) = write_config("[debounce]\nidle_ms = 700\n");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let (config, source) = TomlConfig::load(Some(&cli_path)).unwrap();
    assert_eq!(source, ConfigSource::CommandLine(cli_path.clone()));
    assert_eq!(config.debounce.idle_ms, 700);

    // Cleanup
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_pointing_nowhere_is_an_error() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/tms-test-does-not-exist/config.toml");

    let result = TomlConfig::load(None);
    assert!(matches!(result, Err(Error::NotFound(_))));

    // Cleanup
    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_config_does_not_error() {
    // Missing config files SHALL NOT cause termination
    env::remove_var(CONFIG_ENV_VAR);

    match resolve_config_source(None) {
        ConfigSource::BuiltIn => {
            let (config, _) = TomlConfig::load(None).unwrap();
            assert_eq!(config, TomlConfig::default());
        }
        // A developer machine may have a real config file installed
        ConfigSource::DefaultFile(path) => assert!(path.exists()),
        other => panic!("unexpected config source {:?}", other),
    }
}

#[test]
#[serial]
fn test_empty_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "");

    let source = resolve_config_source(None);
    assert!(!matches!(source, ConfigSource::Environment(_)));

    // Cleanup
    env::remove_var(CONFIG_ENV_VAR);
}
