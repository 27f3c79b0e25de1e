#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/errisnil/testdata.json")
}

fn errisnil() -> Command {
    let mut cmd = Command::cargo_bin("errisnil").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Run from an empty directory so no stray errisnil.toml is picked up.
fn check_in_tempdir(args: &[&str]) -> (tempfile::TempDir, Command) {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = errisnil();
    cmd.current_dir(dir.path()).arg("check").arg(fixture()).args(args);
    (dir, cmd)
}

#[test]
fn test_version() {
    errisnil()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"errisnil \d+\.\d+\.\d+").unwrap());
}

#[test]
fn test_check_human_reports_findings() {
    let (_dir, mut cmd) = check_in_tempdir(&["--no-color"]);
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains(
            "tests.go:30:14: error [ERRNIL001] use of error variable that is known to be nil",
        ))
        .stdout(predicate::str::contains("tests.go:122:9: warning [ERRNIL002]"))
        .stdout(predicate::str::contains("Found 8 issue(s): 7 error, 1 warning"));
}

#[test]
fn test_check_json() {
    let (_dir, mut cmd) = check_in_tempdir(&["--format", "json"]);
    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let diags: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let diags = diags.as_array().unwrap();
    assert_eq!(diags.len(), 8);
    assert_eq!(diags[0]["rule"], "ERRNIL001");
    assert_eq!(diags[0]["category"], "errisnil");
    assert_eq!(diags[0]["location"]["line"], 30);
    assert_eq!(diags[7]["rule"], "ERRNIL002");
    assert_eq!(
        diags[7]["message"],
        "use of error variable that is nil in some branches, not in others. do a nil check earlier"
    );
}

#[test]
fn test_check_sarif() {
    let (_dir, mut cmd) = check_in_tempdir(&["--format", "sarif"]);
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("\"version\": \"2.1.0\""))
        .stdout(predicate::str::contains("\"ruleId\": \"ERRNIL002\""));
}

#[test]
fn test_check_severity_filter() {
    let (_dir, mut cmd) = check_in_tempdir(&["--format", "json", "--severity", "error"]);
    let output = cmd.output().unwrap();
    let diags: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(diags.as_array().unwrap().len(), 7);
}

#[test]
fn test_check_severity_critical_is_clean() {
    let (_dir, mut cmd) = check_in_tempdir(&["--no-color", "--severity", "critical"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_check_max_diagnostics() {
    let (_dir, mut cmd) = check_in_tempdir(&["--format", "json", "--max-diagnostics", "2"]);
    let output = cmd.output().unwrap();
    let diags: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(diags.as_array().unwrap().len(), 2);
}

#[test]
fn test_check_honors_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("errisnil.toml"),
        "[rules.known_nil]\nenabled = false\n",
    )
    .unwrap();
    let output = errisnil()
        .current_dir(dir.path())
        .args(["check", "--format", "json"])
        .arg(fixture())
        .output()
        .unwrap();
    let diags: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let diags = diags.as_array().unwrap();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0]["rule"], "ERRNIL002");
}

#[test]
fn test_check_missing_file() {
    errisnil()
        .args(["check", "/nonexistent/ir.json"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("failed to load IR"));
}

#[test]
fn test_check_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    errisnil()
        .current_dir(dir.path())
        .arg("check")
        .arg(&path)
        .assert()
        .code(2);
}

#[test]
fn test_check_requires_files() {
    errisnil().arg("check").assert().failure().code(2);
}

#[test]
fn test_explain_known_nil() {
    errisnil()
        .args(["explain", "ERRNIL001"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ERRNIL001: use of error variable that is known to be nil",
        ))
        .stdout(predicate::str::contains("[rules.known_nil]"));
}

#[test]
fn test_explain_maybe_nil_lowercase() {
    errisnil()
        .args(["explain", "errnil002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nil in some branches"));
}

#[test]
fn test_explain_unknown_rule() {
    errisnil()
        .args(["explain", "FAKE999"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Known rules: ERRNIL001, ERRNIL002"));
}

#[test]
fn test_init_creates_config() {
    let dir = tempfile::tempdir().unwrap();
    errisnil()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created errisnil.toml"));
    let content = std::fs::read_to_string(dir.path().join("errisnil.toml")).unwrap();
    assert!(content.contains("[rules.known_nil]"));
}

#[test]
fn test_init_fails_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("errisnil.toml"), "").unwrap();
    errisnil()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .failure()
        .code(2);
    let content = std::fs::read_to_string(dir.path().join("errisnil.toml")).unwrap();
    assert!(content.is_empty());
}

#[test]
fn test_no_subcommand_shows_help() {
    errisnil()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
