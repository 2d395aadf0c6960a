//! Integration tests for the Cloudwire configuration system
//!
//! These tests verify:
//! - Loading configuration from TOML, YAML, and JSON files
//! - Layering of user and project files
//! - Environment variable overrides
//! - Default values for all configuration sections
//! - Conversion into stack builder settings

use cloudwire::app::TemplateFormat;
use cloudwire::config::Config;
use cloudwire::stacks::{StackSettings, DEFAULT_ROUTER_AMI, DEFAULT_ROUTER_USER_DATA};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::tempdir;

const ENV_VARS: [&str; 6] = [
    "CLOUDWIRE_CONFIG",
    "CLOUDWIRE_OUTPUT_DIR",
    "CLOUDWIRE_FORMAT",
    "CLOUDWIRE_LOG_LEVEL",
    "CLOUDWIRE_ROUTER_USER_DATA",
    "NO_COLOR",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

// ============================================================================
// File Loading Tests
// ============================================================================

#[test]
fn test_load_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cloudwire.toml");
    std::fs::write(
        &path,
        r#"
[synth]
output_dir = "out"
format = "yaml"

[router.images]
eu-west-1 = "ami-0eu"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.synth.output_dir, PathBuf::from("out"));
    assert_eq!(config.synth.format, TemplateFormat::Yaml);
    assert_eq!(config.router.images["eu-west-1"], "ami-0eu");
    // Defaults are kept alongside file entries
    assert_eq!(config.router.images["us-east-1"], DEFAULT_ROUTER_AMI);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_load_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cloudwire.yml");
    std::fs::write(
        &path,
        "logging:\n  format: json\ncolors:\n  enabled: false\n",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(config.logging.is_json());
    assert!(!config.colors.enabled);
    assert_eq!(config.synth.format, TemplateFormat::Json);
}

#[test]
fn test_load_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cloudwire.json");
    std::fs::write(
        &path,
        r#"{"router": {"images": {"ap-south-1": "ami-0ap"}}}"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.router.images.len(), 2);
    assert_eq!(config.router.images["ap-south-1"], "ami-0ap");
}

#[test]
fn test_invalid_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[synth\noutput_dir = ").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}

#[test]
fn test_missing_file_is_error() {
    assert!(Config::from_file("/nonexistent/cloudwire.toml").is_err());
}

// ============================================================================
// Environment Override Tests
// ============================================================================

#[test]
#[serial]
fn test_explicit_path_and_env_overrides() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("cloudwire.toml");
    std::fs::write(&path, "[logging]\nlevel = \"info\"\n").unwrap();

    std::env::set_var("CLOUDWIRE_OUTPUT_DIR", "/tmp/assembly");
    std::env::set_var("CLOUDWIRE_FORMAT", "yaml");
    std::env::set_var("NO_COLOR", "1");

    let config = Config::load(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.synth.output_dir, PathBuf::from("/tmp/assembly"));
    assert_eq!(config.synth.format, TemplateFormat::Yaml);
    assert!(!config.colors.enabled);
}

#[test]
#[serial]
fn test_config_path_from_env() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.yaml");
    std::fs::write(&path, "logging:\n  level: trace\n").unwrap();

    std::env::set_var("CLOUDWIRE_CONFIG", &path);
    std::env::set_var("CLOUDWIRE_LOG_LEVEL", "error");
    let config = Config::load(None).unwrap();
    clear_env();

    // Environment beats the file
    assert_eq!(config.logging.level, "error");
}

#[test]
#[serial]
fn test_unknown_format_env_ignored() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("cloudwire.toml");
    std::fs::write(&path, "").unwrap();

    std::env::set_var("CLOUDWIRE_FORMAT", "xml");
    let config = Config::load(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.synth.format, TemplateFormat::Json);
}

#[test]
#[serial]
fn test_project_file_layers_over_user_file() {
    clear_env();
    let home = tempdir().unwrap();
    let project = tempdir().unwrap();
    std::fs::write(
        home.path().join(".cloudwire.toml"),
        r#"
[synth]
format = "yaml"

[router.images]
us-east-1 = "ami-custom"

[logging]
level = "debug"
"#,
    )
    .unwrap();
    std::fs::write(
        project.path().join("cloudwire.toml"),
        r#"
[synth]
format = "json"

[router.images]
eu-west-1 = "ami-eu"

[logging]
level = "warn"
"#,
    )
    .unwrap();

    let previous_home = std::env::var_os("HOME");
    let previous_dir = std::env::current_dir().unwrap();
    std::env::set_var("HOME", home.path());
    std::env::set_current_dir(project.path()).unwrap();

    let config = Config::load(None);

    std::env::set_current_dir(previous_dir).unwrap();
    match previous_home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }
    let config = config.unwrap();

    // Later files win, including values equal to the defaults
    assert_eq!(config.synth.format, TemplateFormat::Json);
    assert_eq!(config.logging.level, "warn");
    // Image tables accumulate across files
    assert_eq!(config.router.images["us-east-1"], "ami-custom");
    assert_eq!(config.router.images["eu-west-1"], "ami-eu");
}

// ============================================================================
// Stack Settings Tests
// ============================================================================

#[test]
fn test_default_stack_settings() {
    let settings = Config::default().stack_settings().unwrap();
    assert_eq!(settings, StackSettings::default());
    assert_eq!(settings.router_user_data, DEFAULT_ROUTER_USER_DATA);
}

#[test]
#[serial]
fn test_router_user_data_override() {
    clear_env();
    let dir = tempdir().unwrap();
    let script = dir.path().join("router.sh");
    std::fs::write(&script, "#!/bin/bash\necho custom\n").unwrap();
    let path = dir.path().join("cloudwire.toml");
    std::fs::write(&path, "").unwrap();

    std::env::set_var("CLOUDWIRE_ROUTER_USER_DATA", &script);
    let config = Config::load(Some(&path)).unwrap();
    clear_env();

    let settings = config.stack_settings().unwrap();
    assert_eq!(settings.router_user_data, "#!/bin/bash\necho custom\n");
}

#[test]
fn test_missing_user_data_file_is_error() {
    let mut config = Config::default();
    config.router.user_data_path = Some(PathBuf::from("/nonexistent/router.sh"));
    let err = config.stack_settings().unwrap_err();
    assert!(format!("{err:#}").contains("router.sh"));
}
