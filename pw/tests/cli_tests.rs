//! Binary smoke tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pw(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pw").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    pw(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    pw(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve").and(predicate::str::contains("generate")));
}

#[test]
fn test_generate_blank_input_fails_before_config_check() {
    let home = TempDir::new().unwrap();
    pw(&home)
        .args(["generate", "--description", "  ", "--deadline", "3 months"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing input"));
}

#[test]
fn test_generate_without_api_key_fails() {
    let home = TempDir::new().unwrap();
    pw(&home)
        .args(["generate", "--description", "CRM", "--deadline", "3 months"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_explicit_missing_config_is_fatal() {
    let home = TempDir::new().unwrap();
    pw(&home)
        .args(["--config", "nope.yml", "models"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.yml"));
}
