//! CLI tests for Cloudwire
//!
//! This test suite covers:
//! - Subcommand parsing and help output
//! - Listing, ordering and graphing stacks
//! - Writing a cloud assembly with `synth`
//! - JSON output mode
//! - Exit codes for unknown stacks and bad arguments

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

// Helper to get a command isolated from the user's config and environment
fn cloudwire_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cloudwire").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("CLOUDWIRE_CONFIG")
        .env_remove("CLOUDWIRE_OUTPUT_DIR")
        .env_remove("CLOUDWIRE_FORMAT")
        .env_remove("CLOUDWIRE_ROUTER_USER_DATA")
        .env("HOME", dir.path())
        .env("NO_COLOR", "1");
    cmd
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_lists_subcommands() {
    let dir = tempdir().unwrap();
    cloudwire_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("order"));
}

#[test]
fn test_version() {
    let dir = tempdir().unwrap();
    cloudwire_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_subcommand_fails() {
    let dir = tempdir().unwrap();
    cloudwire_cmd(&dir).assert().failure();
}

// ============================================================================
// List Tests
// ============================================================================

#[test]
fn test_list_human() {
    let dir = tempdir().unwrap();
    cloudwire_cmd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("PrivateVpcWithTgwStack"))
        .stdout(predicate::str::contains("SimulatedOnpremiseNetworkStack"));
}

#[test]
fn test_list_json() {
    let dir = tempdir().unwrap();
    let output = cloudwire_cmd(&dir)
        .args(["--output", "json", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = value["stacks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["PrivateVpcWithTgwStack", "SimulatedOnpremiseNetworkStack"]
    );
}

// ============================================================================
// Synth Tests
// ============================================================================

#[test]
fn test_synth_writes_assembly() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("assembly");

    cloudwire_cmd(&dir)
        .arg("synth")
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("assembly written"));

    assert!(out.join("manifest.json").exists());
    assert!(out.join("PrivateVpcWithTgwStack.template.json").exists());
    assert!(out.join("SimulatedOnpremiseNetworkStack.template.json").exists());

    let template: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.join("PrivateVpcWithTgwStack.template.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        template["Resources"]["TGWDefaultRoute"]["DependsOn"][0],
        "TGWVPC"
    );
}

#[test]
fn test_synth_single_stack_yaml_json_output() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("assembly");

    let output = cloudwire_cmd(&dir)
        .args(["--output", "json", "synth", "SimulatedOnpremiseNetworkStack"])
        .args(["--format", "yaml", "-o"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    let manifest: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(manifest["version"], "1.0");
    assert_eq!(
        manifest["artifacts"]["SimulatedOnpremiseNetworkStack"]["templateFile"],
        "SimulatedOnpremiseNetworkStack.template.yaml"
    );
    assert!(manifest["artifacts"].get("PrivateVpcWithTgwStack").is_none());
    assert!(out.join("SimulatedOnpremiseNetworkStack.template.yaml").exists());
}

#[test]
fn test_synth_unknown_stack_exits_one() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("assembly");

    cloudwire_cmd(&dir)
        .args(["synth", "NoSuchStack", "-o"])
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("NoSuchStack"));

    assert!(!out.exists());
}

#[test]
fn test_synth_uses_config_output_dir() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("cloudwire.toml"),
        "[synth]\noutput_dir = \"from-config\"\n",
    )
    .unwrap();

    cloudwire_cmd(&dir).arg("synth").assert().success();
    assert!(dir.path().join("from-config").join("manifest.json").exists());
}

// ============================================================================
// Order and Graph Tests
// ============================================================================

#[test]
fn test_order_creation() {
    let dir = tempdir().unwrap();
    let output = cloudwire_cmd(&dir)
        .args(["--output", "json", "order", "PrivateVpcWithTgwStack"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["direction"], "creation");
    let order: Vec<&str> = value["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let position = |id: &str| order.iter().position(|x| *x == id).unwrap();
    assert!(position("TGWVPC") < position("TGWDefaultRoute"));
}

#[test]
fn test_order_teardown() {
    let dir = tempdir().unwrap();
    cloudwire_cmd(&dir)
        .args(["order", "SimulatedOnpremiseNetworkStack", "--teardown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("teardown order"));
}

#[test]
fn test_order_unknown_stack() {
    let dir = tempdir().unwrap();
    cloudwire_cmd(&dir)
        .args(["order", "Missing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_graph_dot() {
    let dir = tempdir().unwrap();
    cloudwire_cmd(&dir)
        .args(["graph", "SimulatedOnpremiseNetworkStack"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph"))
        .stdout(predicate::str::contains("ROUTER1ENIPRIVATE"));
}

// ============================================================================
// Validate Tests
// ============================================================================

#[test]
fn test_validate_succeeds() {
    let dir = tempdir().unwrap();
    cloudwire_cmd(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("10.16.0.0/16"))
        .stdout(predicate::str::contains("192.168.8.0/21"));
}

#[test]
fn test_validate_json() {
    let dir = tempdir().unwrap();
    let output = cloudwire_cmd(&dir)
        .args(["--output", "json", "validate"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["valid"], true);
    assert_eq!(value["networks"].as_array().unwrap().len(), 2);
}
