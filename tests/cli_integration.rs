//! Integration tests for the querylinker binary
//!
//! Only offline commands are exercised here: the feature catalog, config
//! handling, and completions need no backend. Network behavior is covered by
//! the pipeline unit tests against mock transports.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Helper to get the querylinker binary path
fn querylinker_binary() -> PathBuf {
    // When running tests, the binary is in target/debug/querylinker
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps
    path.push("querylinker");
    path
}

/// Helper to run querylinker with an isolated config directory
fn run_querylinker(config_dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(querylinker_binary())
        .env("QUERYLINKER_DIR", config_dir)
        .env("HOME", config_dir)
        .env_remove("QUERYLINKER_CONFIG")
        .env_remove("XDG_CONFIG_HOME")
        .args(args)
        .output()
        .expect("Failed to execute querylinker")
}

fn run_stdout(config_dir: &Path, args: &[&str]) -> String {
    let output = run_querylinker(config_dir, args);
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_features_catalog_is_offline() {
    let dir = TempDir::new().unwrap();
    let output = run_querylinker(dir.path(), &["features", "catalog", "-o", "json"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let catalog: serde_json::Value = serde_json::from_str(&stdout).expect("catalog output is JSON");
    let entries = catalog.as_array().expect("catalog is an array");
    assert!(!entries.is_empty());

    // declaration order: the overview dashboard leads the catalog
    assert_eq!(entries[0]["id"], "dashboard-overview");

    // every dependency tag is a known or preserved system tag
    for entry in entries {
        assert!(entry["id"].is_string());
        assert!(entry["dependencies"].is_array());
    }
}

#[test]
fn test_features_catalog_contains_advanced_marker_features() {
    let dir = TempDir::new().unwrap();
    let stdout = run_stdout(dir.path(), &["features", "catalog", "-o", "json"]);
    let catalog: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let ids: Vec<&str> = catalog
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"advanced-analytics"));
    assert!(ids.contains(&"cross-platform-reports"));
}

#[test]
fn test_config_show_uses_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let stdout = run_stdout(dir.path(), &["config", "show", "-o", "json"]);
    let config: serde_json::Value = serde_json::from_str(&stdout).expect("config output is JSON");
    assert_eq!(config["backend"]["base_url"], "http://localhost:5000");
    assert_eq!(config["backend"]["on_unauthorized"], "surface");
}

#[test]
fn test_config_show_reads_file_from_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("querylinker.yaml"),
        "backend:\n  base_url: https://ql.example.com\n  on_unauthorized: ignore\n",
    )
    .unwrap();

    let stdout = run_stdout(dir.path(), &["config", "show", "-o", "json"]);
    let config: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(config["backend"]["base_url"], "https://ql.example.com");
    assert_eq!(config["backend"]["on_unauthorized"], "ignore");
    // unset fields keep defaults
    assert_eq!(config["backend"]["timeout_secs"], 30);
}

#[test]
fn test_config_path_points_into_dir() {
    let dir = TempDir::new().unwrap();
    let stdout = run_stdout(dir.path(), &["config", "path"]);
    assert!(stdout.trim().ends_with("querylinker.yaml"));
    assert!(stdout.contains(dir.path().to_str().unwrap()));
}

#[test]
fn test_explicit_config_flag_wins() {
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("custom.yaml");
    fs::write(&custom, "backend:\n  base_url: https://flag.example.com\n").unwrap();

    let stdout = run_stdout(
        dir.path(),
        &["--config", custom.to_str().unwrap(), "config", "show", "-o", "json"],
    );
    let config: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(config["backend"]["base_url"], "https://flag.example.com");
}

#[test]
fn test_completions_generate() {
    let dir = TempDir::new().unwrap();
    let output = run_querylinker(dir.path(), &["completions", "bash"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("querylinker"));
}

#[test]
fn test_unreachable_backend_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    // port 9 (discard) refuses connections; the command must fail with a
    // normalized message, not a panic
    fs::write(
        dir.path().join("querylinker.yaml"),
        "backend:\n  base_url: http://127.0.0.1:9\n  timeout_secs: 2\n",
    )
    .unwrap();

    let output = run_querylinker(dir.path(), &["systems"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("request failed") || stderr.contains("Command failed"));
}
