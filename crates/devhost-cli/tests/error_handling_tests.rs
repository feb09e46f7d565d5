//! Tests for error handling, suggestions and exit codes.

use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

fn devhost() -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("devhost");
    cmd.env_remove("RUST_LOG")
        .env_remove("DEVHOST_CONFIG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn invalid_project_name_exits_2_with_suggestions() {
    devhost()
        .args(["new", ".hidden", "--stack", "static", "--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid project name"))
        .stderr(predicate::str::contains("Suggestions:"));
}

#[test]
fn unknown_stack_is_rejected_by_the_parser() {
    devhost()
        .args(["new", "blog", "--stack", "rails"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("rails"));
}

#[test]
fn unknown_spa_variant_is_rejected() {
    devhost()
        .args(["new", "dash", "--stack", "node-spa:angular"])
        .assert()
        .code(2);
}

#[test]
fn port_out_of_range_exits_2() {
    devhost()
        .args(["new", "blog", "--stack", "static", "--port", "70000", "--dry-run"])
        .assert()
        .code(2);
}

#[test]
fn missing_explicit_config_exits_4() {
    devhost()
        .args(["-c", "/nonexistent/devhost.toml", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn malformed_config_exits_4() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("devhost.toml");
    std::fs::write(&path, "[ports]\nstart = \"soon\"\n").unwrap();

    devhost().arg("-c").arg(&path).arg("list").assert().code(4);
}

#[test]
fn publish_without_token_exits_4() {
    let temp = TempDir::new().unwrap();

    devhost()
        .env_remove("GITHUB_TOKEN")
        .current_dir(temp.path())
        .args(["publish", "."])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn quiet_and_verbose_conflict() {
    devhost().args(["-q", "-v", "list"]).assert().code(2);
}

#[test]
fn no_subcommand_prints_help_and_fails() {
    devhost()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
