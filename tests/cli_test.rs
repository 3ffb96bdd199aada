//! Integration tests for the CLI.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_project(manifest: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("belay.yml"), manifest).unwrap();
    temp
}

const EMPTY_MANIFEST: &str = "components: {}\n";

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("CI pipeline orchestration"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_run_on_empty_manifest_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(EMPTY_MANIFEST);
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.current_dir(temp.path());
    cmd.arg("run");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("succeeded"));
    Ok(())
}

#[test]
fn cli_no_args_runs_the_pipeline() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(EMPTY_MANIFEST);
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.current_dir(temp.path());
    cmd.assert().success();
    Ok(())
}

#[test]
fn cli_run_json_emits_report() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(EMPTY_MANIFEST);
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.current_dir(temp.path());
    cmd.args(["run", "--json", "--quiet"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"succeeded\""));
    Ok(())
}

#[test]
fn cli_graph_lists_seeded_phases() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(EMPTY_MANIFEST);
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.current_dir(temp.path());
    cmd.args(["graph", "--no-color"]);
    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("install")
                .and(predicate::str::contains("lint"))
                .and(predicate::str::contains("test")),
        );
    Ok(())
}

#[test]
fn cli_graph_json_marks_aggregators() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        r#"
components:
  app:
    kind: python
    path: app
"#,
    );
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.current_dir(temp.path());
    cmd.args(["graph", "--json"]);
    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("\"aggregator\": true")
                .and(predicate::str::contains("install-app")),
        );
    Ok(())
}

#[test]
fn cli_missing_manifest_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new().unwrap();
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.current_dir(temp.path());
    cmd.arg("run");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Manifest not found"));
    Ok(())
}

#[test]
fn cli_invalid_manifest_fails_with_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project("components: [broken]\n");
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.current_dir(temp.path());
    cmd.arg("graph");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse manifest"));
    Ok(())
}

#[test]
fn cli_explicit_manifest_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pipeline.yml");
    fs::write(&path, EMPTY_MANIFEST).unwrap();
    let mut cmd = Command::new(cargo_bin("belay"));
    cmd.current_dir(temp.path());
    cmd.args(["--manifest", path.to_str().unwrap(), "run"]);
    cmd.assert().success();
    Ok(())
}
