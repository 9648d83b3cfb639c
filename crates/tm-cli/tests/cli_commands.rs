#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable
#![allow(missing_docs)] // integration test crate, no public API to document

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Create a temp directory holding a markdown file with two tables.
fn test_vault() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("encounters.md");
    fs::write(
        &path,
        "# Encounters\n\n\
```perchance\n\
title\n  Wilderness Encounters\n\
output\n  You meet [disposition] [creature].\n\
creature\n  a goblin\n  an orc\n\
disposition\n  a friendly\n  a hostile\n\
```\n\n\
```perchance\n\
title\n  Treasure\n\
output\n  {2d6} silver pieces\n\
```\n",
    )
    .unwrap();
    (dir, path)
}

fn tablemancer() -> Command {
    Command::cargo_bin("tablemancer").unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_parsed_tables() {
    let (_dir, path) = test_vault();
    tablemancer()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tables parsed"))
        .stdout(predicate::str::contains("Wilderness Encounters"));
}

#[test]
fn check_fails_on_structural_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.md");
    fs::write(&path, "```perchance\noutput\nmonster\n```\n").unwrap();

    tablemancer()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no section has any entries"));
}

#[test]
fn check_warns_about_empty_sections_but_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("warn.md");
    fs::write(&path, "```perchance\noutput\n  a wolf\ngems\n```\n").unwrap();

    tablemancer()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("has no entries"));
}

#[test]
fn check_missing_file_fails() {
    tablemancer()
        .arg("check")
        .arg("does-not-exist.md")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[test]
fn list_shows_titles_and_references() {
    let (_dir, path) = test_vault();
    tablemancer()
        .arg("list")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wilderness Encounters"))
        .stdout(predicate::str::contains("Treasure"))
        .stdout(predicate::str::contains("creature"))
        .stdout(predicate::str::contains("2 tables"));
}

// ---------------------------------------------------------------------------
// roll
// ---------------------------------------------------------------------------

#[test]
fn roll_by_title_produces_text() {
    let (_dir, path) = test_vault();
    tablemancer()
        .args(["roll"])
        .arg(&path)
        .arg("wilderness encounters")
        .args(["--seed", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You meet"));
}

#[test]
fn roll_with_seed_is_deterministic() {
    let (_dir, path) = test_vault();
    let run = || {
        tablemancer()
            .arg("roll")
            .arg(&path)
            .arg("Treasure")
            .args(["--seed", "7"])
            .output()
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn roll_json_emits_the_result_object() {
    let (_dir, path) = test_vault();
    let output = tablemancer()
        .arg("roll")
        .arg(&path)
        .arg("Treasure")
        .args(["--seed", "3", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["text"].as_str().unwrap().contains("silver pieces"));
    assert!(json["subrolls"].as_array().is_some());
}

#[test]
fn roll_spans_prints_the_span_table() {
    let (_dir, path) = test_vault();
    tablemancer()
        .arg("roll")
        .arg(&path)
        .arg("wilderness encounters")
        .args(["--seed", "42", "--spans"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Source"))
        .stdout(predicate::str::contains("output"))
        .stdout(predicate::str::contains("creature"));
}

#[test]
fn roll_unknown_table_fails() {
    let (_dir, path) = test_vault();
    tablemancer()
        .arg("roll")
        .arg(&path)
        .arg("nonsense")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no table named"));
}

#[test]
fn roll_requires_a_name_when_ambiguous() {
    let (_dir, path) = test_vault();
    tablemancer()
        .arg("roll")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("pick one"));
}

#[test]
fn roll_interactive_rerolls_by_index() {
    let (_dir, path) = test_vault();
    tablemancer()
        .arg("roll")
        .arg(&path)
        .arg("wilderness encounters")
        .args(["--seed", "42", "--interactive"])
        .write_stdin("1\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("reroll>"));
}
