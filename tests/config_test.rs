//! Integration tests for layered Settings loading.
//!
//! These tests assume no global config file exists on the machine, so the
//! explicit file layers directly over the compiled defaults.

use std::fs;

use tempfile::TempDir;

use outliner::application::ApplicationError;
use outliner::config::Settings;
use outliner::domain::RootFallback;

#[test]
fn given_no_config_file_when_load_then_returns_defaults() {
    let settings = Settings::load(None).expect("load settings");

    assert_eq!(settings.root_fallback, RootFallback::Strict);
    assert!(settings.expand_new_nodes);
}

#[test]
fn given_partial_config_file_when_load_then_overrides_only_given_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("outliner.toml");
    fs::write(
        &path,
        r#"
root_fallback = "first_record"
expand_new_nodes = false
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(path.as_path())).expect("load settings");

    assert_eq!(settings.root_fallback, RootFallback::FirstRecord);
    assert!(!settings.expand_new_nodes);
}

#[test]
fn given_missing_config_file_when_load_then_reports_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let result = Settings::load(Some(path.as_path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_unknown_fallback_value_when_load_then_reports_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("outliner.toml");
    fs::write(&path, r#"root_fallback = "guess""#).unwrap();

    let result = Settings::load(Some(path.as_path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

/// Only this test touches the environment, and only a field the others don't assert.
#[test]
fn given_env_var_when_load_then_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("outliner.toml");
    fs::write(&path, "select_parent_on_delete = true\n").unwrap();

    std::env::set_var("OUTLINER_SELECT_PARENT_ON_DELETE", "false");
    let result = Settings::load(Some(path.as_path()));
    std::env::remove_var("OUTLINER_SELECT_PARENT_ON_DELETE");

    assert!(!result.expect("load settings").select_parent_on_delete);
}

#[test]
fn given_template_when_written_and_loaded_then_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("outliner.toml");
    fs::write(&path, Settings::template()).unwrap();

    let settings = Settings::load(Some(path.as_path())).expect("load settings");

    assert_eq!(settings.root_fallback, Settings::default().root_fallback);
    assert_eq!(settings.expand_new_nodes, Settings::default().expand_new_nodes);
}
