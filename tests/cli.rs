//! CLI behavior that does not need a live management service

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn wmiq() -> Command {
    let mut cmd = Command::cargo_bin("wmiq").unwrap();
    for var in ["WMIQ_SERVER", "WMIQ_NAMESPACE", "WMIQ_USER", "WMIQ_PASSWORD", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn explain_lists_columns() {
    wmiq()
        .args(["explain", "SELECT Name, ProcessId FROM Win32_Process"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Name"))
        .stdout(predicate::str::contains("2. ProcessId"));
}

#[test]
fn explain_json() {
    wmiq()
        .args(["--json", "explain", "select a,b from T"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"columns\""))
        .stdout(predicate::str::contains("\"a\""));
}

#[test]
fn malformed_query_fails_before_execution() {
    wmiq()
        .args(["query", "SELECT Name"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing from"));

    wmiq()
        .args(["query", "FROM Win32_Process"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing select"));
}

#[test]
fn build_prints_query() {
    wmiq()
        .args(["build", "Win32_Service", "-c", "Name", "-c", "State", "-w", "StartMode=Auto"])
        .assert()
        .success()
        .stdout("SELECT Name, State FROM Win32_Service WHERE StartMode = 'Auto'\n");
}

#[test]
fn build_rejects_bad_filter() {
    wmiq()
        .args(["build", "Win32_Service", "-w", "StartMode"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn run_validates_whole_batch_first() {
    let mut file = tempfile::Builder::new().suffix(".wql").tempfile().unwrap();
    writeln!(file, "-- inventory").unwrap();
    writeln!(file, "SELECT Name FROM Win32_Process").unwrap();
    writeln!(file, "SELECT Caption").unwrap();

    wmiq()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn run_requires_wql_extension() {
    let file = tempfile::Builder::new().suffix(".sql").tempfile().unwrap();
    wmiq()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(".wql"));
}

#[cfg(not(windows))]
#[test]
fn query_reports_unsupported_host() {
    wmiq()
        .args(["query", "SELECT Name FROM Win32_Process"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only available on Windows"));
}
