// SPDX-License-Identifier: Apache-2.0

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `scout` command isolated from the user's config and data directories.
fn scout(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("scout");
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version() {
    let mut cmd = cargo_bin_cmd!("scout");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scout"));
}

#[test]
fn test_help_contains_all_commands() {
    let mut cmd = cargo_bin_cmd!("scout");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("find"))
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("rate-limit"));
}

#[test]
fn test_find_help_lists_filters() {
    let mut cmd = cargo_bin_cmd!("scout");
    cmd.args(["find", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--good-first"))
        .stdout(predicate::str::contains("--exclude"));
}

#[test]
fn test_projects_json_output() {
    let home = TempDir::new().unwrap();
    let output = scout(&home)
        .args(["projects", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let projects = json["projects"].as_array().unwrap();
    assert!(projects.len() > 100);
    assert!(projects[0]["stars"].as_u64() >= projects[1]["stars"].as_u64());
}

#[test]
fn test_projects_category_filter() {
    let home = TempDir::new().unwrap();
    let output = scout(&home)
        .args(["projects", "--category", "kubernetes", "-o", "json"])
        .output()
        .unwrap();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let projects = json["projects"].as_array().unwrap();
    assert!(!projects.is_empty());
    assert!(projects.iter().all(|p| p["category"] == "Kubernetes"));
}

#[test]
fn test_projects_text_output() {
    let home = TempDir::new().unwrap();
    scout(&home)
        .args(["projects", "-c", "Kubernetes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("projects:"))
        .stdout(predicate::str::contains("kubernetes/kubernetes"));
}

#[test]
fn test_history_empty() {
    let home = TempDir::new().unwrap();
    scout(&home)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues discovered yet"));
}

#[test]
fn test_history_empty_json() {
    let home = TempDir::new().unwrap();
    scout(&home)
        .args(["history", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"records\": []"));
}

#[test]
fn test_invalid_config_reports_error() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("config").join("scout");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "[scheduler]\nbatch_size = \"many\"\n").unwrap();

    scout(&home)
        .arg("projects")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}
