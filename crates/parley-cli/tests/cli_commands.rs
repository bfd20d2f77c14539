//! End-to-end tests of the `parley` binary.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ZYX: &str = "\
=== start ===
zyx: Greetings, human.
- Ask about the weather
# id: weather
# set: story.asked_weather
nate: Nice night, huh?
zyx: Indeed.
> weather_followup
- Leave
nate: Goodbye.
> END

=== weather_followup ===
zyx: The stars are bright tonight.
- Back
> start
- Leave
> END
";

/// Create a temp directory with a dialogue folder holding `zyx.txt`.
fn test_dialogue() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("zyx.txt"), ZYX).unwrap();
    dir
}

fn script(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn parley() -> Command {
    Command::cargo_bin("parley").unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_clean_script() {
    let dir = test_dialogue();
    parley()
        .args(["check", dir.path().join("zyx.txt").to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("2 nodes, 4 options")
                .and(predicate::str::contains("All checks passed")),
        );
}

#[test]
fn check_reports_skipped_lines() {
    let dir = TempDir::new().unwrap();
    let path = script(
        &dir,
        "bad.txt",
        "=== start ===\n~~ what is this\n- Leave\n> END\n",
    );
    parley()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("unrecognized intro line"))
        .stdout(predicate::str::contains("0 errors, 1 warning"));
}

#[test]
fn check_reports_unknown_route() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "route.txt", "=== start ===\n- Go\n> nowhere\n");
    parley()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown node `nowhere`"));
}

#[test]
fn check_strict_fails_on_warnings() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "route.txt", "=== start ===\n- Go\n> nowhere\n");
    parley()
        .args(["check", "--strict", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--strict"));
}

#[test]
fn check_fails_without_sections() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "prose.txt", "Once upon a time.\n");
    parley()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 error, 0 warnings"))
        .stderr(
            predicate::str::contains("no `=== node ===` sections")
                .and(predicate::str::contains("expected a `=== start ===` header")),
        );
}

#[test]
fn check_reports_empty_sections_as_error() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "hollow.txt", "=== start ===\n\n=== other ===\n");
    parley()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 error"))
        .stderr(predicate::str::contains("every section in this script is empty"));
}

#[test]
fn check_fails_on_missing_file() {
    parley()
        .args(["check", "/nonexistent/path/zyx.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ---------------------------------------------------------------------------
// outline
// ---------------------------------------------------------------------------

#[test]
fn outline_table_lists_options() {
    let dir = test_dialogue();
    parley()
        .args(["outline", dir.path().join("zyx.txt").to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Ask about the weather")
                .and(predicate::str::contains("weather_followup"))
                .and(predicate::str::contains("set story.asked_weather"))
                .and(predicate::str::contains("2 nodes, 4 options")),
        );
}

#[test]
fn outline_table_marks_staying_options_with_ascii_dash() {
    let dir = TempDir::new().unwrap();
    let path = script(
        &dir,
        "stay.txt",
        "=== start ===\n- Ask again\nzyx: Sure.\n- Leave\n> END\n",
    );
    parley()
        .args(["outline", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Ask again")
                .and(predicate::str::contains("—").not()),
        );
}

#[test]
fn outline_plain() {
    let dir = test_dialogue();
    parley()
        .args([
            "outline",
            "--plain",
            dir.path().join("zyx.txt").to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("=== start ===")
                .and(predicate::str::contains("  2. Leave -> END")),
        );
}

#[test]
fn outline_json_is_valid() {
    let dir = test_dialogue();
    let output = parley()
        .args([
            "outline",
            "--json",
            dir.path().join("zyx.txt").to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["start"]["options"][1]["exit"], serde_json::json!(true));
    assert_eq!(
        json["start"]["options"][0]["next_node"],
        serde_json::json!("weather_followup")
    );
}

#[test]
fn outline_json_and_plain_conflict() {
    let dir = test_dialogue();
    parley()
        .args([
            "outline",
            "--json",
            "--plain",
            dir.path().join("zyx.txt").to_str().unwrap(),
        ])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_leave() {
    let dir = test_dialogue();
    parley()
        .args(["play", "zyx", "-d", dir.path().to_str().unwrap()])
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Greetings, human.")
                .and(predicate::str::contains("1. Ask about the weather"))
                .and(predicate::str::contains("Goodbye."))
                .and(predicate::str::contains("conversation over: goodbye")),
        );
}

#[test]
fn play_follows_routes() {
    let dir = test_dialogue();
    parley()
        .args(["play", "zyx", "-d", dir.path().to_str().unwrap()])
        .write_stdin("1\n2\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Indeed.")
                .and(predicate::str::contains("The stars are bright tonight.")),
        );
}

#[test]
fn play_rejects_bad_input_then_continues() {
    let dir = test_dialogue();
    parley()
        .args(["play", "zyx", "-d", dir.path().to_str().unwrap()])
        .write_stdin("7\nfoo\n2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pick 1-2").and(predicate::str::contains("Goodbye.")));
}

#[test]
fn play_eof_walks_away() {
    let dir = test_dialogue();
    parley()
        .args(["play", "zyx", "-d", dir.path().to_str().unwrap()])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("walked away"));
}

#[test]
fn play_missing_script_uses_fallback() {
    let dir = TempDir::new().unwrap();
    parley()
        .args(["play", "nobody", "-d", dir.path().to_str().unwrap()])
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("The words won't come."));
}

#[test]
fn play_saves_state() {
    let dir = test_dialogue();
    let state = dir.path().join("state.json");
    parley()
        .args([
            "play",
            "zyx",
            "-d",
            dir.path().to_str().unwrap(),
            "--state",
            state.to_str().unwrap(),
            "--item",
            "lamp",
        ])
        .write_stdin("1\n2\n")
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(json["flags"]["story"]["asked_weather"], serde_json::json!(true));
    assert_eq!(json["asked"], serde_json::json!(["weather"]));
    assert_eq!(json["inventory"], serde_json::json!(["lamp"]));
}

#[test]
fn play_flags_gate_options() {
    let dir = TempDir::new().unwrap();
    script(
        &dir,
        "guard.txt",
        "=== start ===\n- Show badge\n# requires: has:badge, story.sworn_in\nguard: Go ahead.\n> END\n- Leave\n> END\n",
    );
    parley()
        .args(["play", "guard", "-d", dir.path().to_str().unwrap()])
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Show badge").not());

    parley()
        .args([
            "play",
            "guard",
            "-d",
            dir.path().to_str().unwrap(),
            "--item",
            "badge",
            "--set",
            "story.sworn_in",
        ])
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Go ahead."));
}

#[test]
fn play_rejects_bad_flag() {
    let dir = test_dialogue();
    parley()
        .args([
            "play",
            "zyx",
            "-d",
            dir.path().to_str().unwrap(),
            "--set",
            "=5",
        ])
        .assert()
        .failure();
}
