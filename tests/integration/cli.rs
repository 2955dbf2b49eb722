//! Tests for the `hacs-data` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn hacs_data_command(temp: &TempDir) -> Command {
    let config = temp.path().join("config.yaml");
    fs::write(
        &config,
        "api_url: http://127.0.0.1:9\ndata_url: http://127.0.0.1:9\nreference_repository: test/lists\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("hacs-data").unwrap();
    cmd.arg("--config").arg(config).env_remove("GITHUB_TOKEN");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("hacs-data")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_generate_unknown_category_fails() {
    let temp = TempDir::new().unwrap();
    hacs_data_command(&temp)
        .args(["generate", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category 'nonsense'"));
}

#[test]
fn test_config_show_uses_config_file() {
    let temp = TempDir::new().unwrap();
    hacs_data_command(&temp)
        .env("DATA_GENERATOR_OUTPUT_DIR", "/srv/hacs-output")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reference_repository: test/lists"))
        .stdout(predicate::str::contains("/srv/hacs-output"));
}

#[test]
fn test_missing_config_file_fails() {
    let temp = TempDir::new().unwrap();
    Command::cargo_bin("hacs-data")
        .unwrap()
        .arg("--config")
        .arg(temp.path().join("missing.yaml"))
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
