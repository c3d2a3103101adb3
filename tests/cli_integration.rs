//! End-to-end runs of the `retouch` binary in temporary repositories.

#![cfg(unix)]

mod common;

use common::GitRepoFixture;
use std::process::{Command, Output};

/// Spaces out `name=value`, leaving already spaced assignments alone.
const FORMATTER: &str = r"sed -e 's/\([a-z0-9]\)=\([a-z0-9]\)/\1 = \2/'";

fn fixture() -> GitRepoFixture {
    let repo = GitRepoFixture::create();
    repo.add(&[("a.py", Some("a=1\n\nb=2\n"))], Some("Initial commit"));
    repo.write("a.py", "a=1\n\nb=22\n");
    repo
}

fn retouch(repo: &GitRepoFixture, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_retouch"))
        .args(args)
        .current_dir(repo.root())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("PRE_COMMIT_FROM_REF")
        .env_remove("PRE_COMMIT_TO_REF")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn reformats_edited_lines_in_place() {
    let repo = fixture();
    let output = retouch(&repo, &["--formatter", FORMATTER]);

    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("Reformatted a.py"));
    assert_eq!(repo.read("a.py"), "a=1\n\nb = 22\n");

    // Nothing left to do on a second run
    let output = retouch(&repo, &["--formatter", FORMATTER]);
    assert!(output.status.success());
    assert_eq!(repo.read("a.py"), "a=1\n\nb = 22\n");
}

#[test]
fn check_reports_without_writing() {
    let repo = fixture();
    let output = retouch(&repo, &["--check", "--formatter", FORMATTER]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Would reformat a.py"));
    assert_eq!(repo.read("a.py"), "a=1\n\nb=22\n");
}

#[test]
fn diff_shows_changes_without_writing() {
    let repo = fixture();
    let output = retouch(&repo, &["--diff", "--formatter", FORMATTER]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("-b=22"));
    assert!(out.contains("+b = 22"));
    assert!(!out.contains("+a = 1"));
    assert_eq!(repo.read("a.py"), "a=1\n\nb=22\n");
}

#[test]
fn committed_target_requires_diff_or_check() {
    let repo = fixture();
    let output = retouch(&repo, &["-r", "HEAD~1..HEAD", "--formatter", FORMATTER]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--diff or --check"));
}

#[test]
fn pre_commit_without_refs_exits_123() {
    let repo = fixture();
    let output = retouch(&repo, &["-r", ":PRE-COMMIT:", "--formatter", FORMATTER]);
    assert_eq!(output.status.code(), Some(123));
    assert!(String::from_utf8_lossy(&output.stderr).contains("PRE_COMMIT_FROM_REF"));
    assert_eq!(repo.read("a.py"), "a=1\n\nb=22\n");
}

#[test]
fn linter_reports_on_edited_lines_only() {
    let repo = fixture();

    let output = retouch(&repo, &["--formatter", "cat", "-L", "echo a.py:3:"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("a.py:3: "));

    let output = retouch(&repo, &["--formatter", "cat", "-L", "echo a.py:1:"]);
    assert!(output.status.success());
    assert!(!stdout(&output).contains("a.py:1:"));
}

#[test]
fn settings_come_from_pyproject() {
    let repo = fixture();
    repo.write(
        "pyproject.toml",
        "[tool.retouch]\nformatter = \"sed -e 's/=/ = /'\"\ncheck = true\n",
    );

    let output = retouch(&repo, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Would reformat a.py"));
    assert_eq!(repo.read("a.py"), "a=1\n\nb=22\n");
}

#[test]
fn invalid_pyproject_is_an_error() {
    let repo = fixture();
    repo.write("pyproject.toml", "[tool.retouch]\nunknown = 1\n");

    let output = retouch(&repo, &["--formatter", FORMATTER]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("pyproject.toml"));
    assert_eq!(repo.read("a.py"), "a=1\n\nb=22\n");
}
