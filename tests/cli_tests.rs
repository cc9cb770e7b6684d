//! Integration tests for the CLI application
//!
//! These run the compiled binary against a tiny IDX dataset.

mod common;

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn digitclf(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_digitclf"))
        .args(args)
        .output()
        .expect("Failed to run digitclf")
}

/// Dataset plus a config file selecting it; returns the config path
fn setup(dir: &Path) -> String {
    common::write_idx_dataset(dir).expect("Failed to write dataset");
    let path = dir.join("config.json");
    std::fs::write(&path, common::config_json(dir, None)).expect("Failed to write config");
    path.to_str().unwrap().to_string()
}

#[test]
fn test_cli_run_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = setup(temp_dir.path());
    let report = temp_dir.path().join("summary.json");

    let output = digitclf(&["run", "--config", &config, "--report", report.to_str().unwrap()]);

    assert!(
        output.status.success(),
        "Run command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Training set Accuracy:").count(), 4);
    assert!(stdout.contains("--------------SVM-------------------"));
    assert!(stdout.contains("\n Using linear kernel(all other parameters are kept default)"));
    assert!(report.exists(), "Report file was not created");
}

#[test]
fn test_cli_skip_flags() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = setup(temp_dir.path());

    let output = digitclf(&[
        "run",
        "--config",
        &config,
        "--skip-svm",
        "--skip-multiclass",
        "--max-iterations",
        "20",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("set Accuracy:").count(), 3);
    assert!(!stdout.contains("SVM"));
}

#[test]
fn test_cli_dataset_override() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = setup(temp_dir.path());

    let output = digitclf(&[
        "run",
        "--config",
        &config,
        "--dataset",
        "/nonexistent/dataset",
        "--skip-svm",
    ]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_inspect_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = setup(temp_dir.path());

    let output = digitclf(&["inspect", "--config", &config, "--format", "idx"]);

    assert!(
        output.status.success(),
        "Inspect command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Classes: 3"));
    assert!(stdout.contains("Features: 3 retained of 4"));
    assert!(stdout.contains("Validation: 6"));
}

#[test]
fn test_cli_configs_command() {
    let output = digitclf(&["configs"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("14. kernel=rbf gamma=auto C=100"));
    assert!(stdout.contains("set to 1(all other parameters are kept default)"));
}

#[test]
fn test_cli_missing_config_file() {
    let output = digitclf(&["run", "--config", "/nonexistent/config.json"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cli_invalid_format() {
    let output = digitclf(&["inspect", "--format", "csv"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("csv"));
}

#[test]
fn test_cli_help() {
    let output = digitclf(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("inspect"));
    assert!(stdout.contains("configs"));
}
