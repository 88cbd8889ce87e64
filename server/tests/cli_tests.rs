use assert_cmd::Command;
use predicates::prelude::*;

fn parley() -> Command {
    let mut cmd = Command::cargo_bin("parley").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_help() {
    parley()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("errors"));
}

#[test]
fn test_cli_version() {
    parley()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("parley"));
}

#[test]
fn test_errors_lists_taxonomy() {
    parley()
        .arg("errors")
        .assert()
        .success()
        .stdout(predicate::str::contains("UNKNOWN"))
        .stdout(predicate::str::contains("OVER_LIMIT"))
        .stdout(predicate::str::contains("Can't have more than {} {}."));
}

#[test]
fn test_errors_json() {
    let output = parley()
        .args(["errors", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let entries: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 33);
    assert_eq!(entries[0]["name"], "UNKNOWN");
    assert_eq!(entries[32]["code"], 33);
}

#[test]
fn test_errors_lookup_by_code() {
    parley()
        .args(["errors", "--code", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REQUIRED"))
        .stdout(predicate::str::contains("{} is required."));
}

#[test]
fn test_errors_lookup_by_name() {
    parley()
        .args(["errors", "--name", "not_owner", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"code\": 23"));
}

#[test]
fn test_unknown_code_fails() {
    parley()
        .args(["errors", "--code", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown error code: 99"));
}

#[test]
fn test_unknown_name_fails() {
    parley()
        .args(["errors", "--name", "NOT_A_THING"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown error name"));
}
