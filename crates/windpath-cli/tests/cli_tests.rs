use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .canonicalize()
        .expect("fixture directory present")
}

fn cli() -> Command {
    cargo_bin_cmd!("windpath-cli")
}

fn prepare_command() -> Command {
    let dir = fixtures_dir();
    let mut cmd = cli();
    cmd.env("WINDPATH_GEOMETRY", dir.join("urban_geometry.json"))
        .env("WINDPATH_VELOCITY", dir.join("urban_velocity.csv"))
        .env("RUST_LOG", "error")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("route"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn inspect_reports_fixture_shape() {
    prepare_command()
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Grid: 11 x 11 cells"))
        .stdout(predicate::str::contains("Traversable: 104 of 121"));
}

#[test]
fn inspect_json_is_parseable() {
    let output = prepare_command()
        .args(["--format", "json", "inspect"])
        .output()
        .expect("command runs");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["cells"], 121);
    assert_eq!(value["traversable"], 104);
    assert_eq!(value["obstacles"], 17);
}

#[test]
fn explicit_flags_override_environment_variables() {
    let dir = fixtures_dir();
    cli()
        .env_remove("WINDPATH_GEOMETRY")
        .env_remove("WINDPATH_VELOCITY")
        .env("RUST_LOG", "error")
        .arg("--geometry")
        .arg(dir.join("urban_geometry.json"))
        .arg("--velocity")
        .arg(dir.join("urban_velocity.csv"))
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Traversable: 104 of 121"));
}

#[test]
fn missing_geometry_source_is_reported() {
    cli()
        .env_remove("WINDPATH_GEOMETRY")
        .env("WINDPATH_VELOCITY", fixtures_dir().join("urban_velocity.csv"))
        .env("RUST_LOG", "error")
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no --geometry file given"));
}

#[test]
fn nonexistent_geometry_file_fails_to_load() {
    prepare_command()
        .arg("--geometry")
        .arg(fixtures_dir().join("missing_geometry.json"))
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load environment"))
        .stderr(predicate::str::contains("dataset not found"));
}
