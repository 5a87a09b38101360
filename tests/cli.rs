//! Integration tests for the hexboard binary.
//!
//! Spawns the binary against board files written to a scratch directory and
//! checks its stdout and exit status.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

const VALID: &str = "\
size 3 3
hex 0101 0 \"\" \"\"
hex 0201 0 \"woods:1\" \"\"
hex 0301 0 \"\" \"\"
hex 0102 0 \"road:1\" \"\"
hex 0202 1 \"\" \"\"
hex 0302 0 \"water:2\" \"\"
tag \"demo\"
end
";

const INVALID: &str = "size 2 1\nhex 0101 0 \"woods:9\" \"\"\nend\n";

/// Writes `contents` to a file unique to this test and returns its path.
fn scratch(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hexboard-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hexboard"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to start hexboard")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn check_reports_a_valid_board() {
    let path = scratch("valid.board", VALID);
    let output = run(&["check", path.to_str().unwrap()]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.first().map(String::as_str), Some("size 3x3"));
    assert!(lines.iter().any(|l| l == "elevation 0..1"));
    assert_eq!(lines.last().map(String::as_str), Some("valid"));
}

#[test]
fn check_lists_problems_and_fails() {
    let path = scratch("invalid.board", INVALID);
    let output = run(&["check", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let lines = stdout_lines(&output);
    assert!(lines.iter().any(|l| l.starts_with("error Hex (0, 0)")), "{lines:?}");
    assert_eq!(lines.last().map(String::as_str), Some("invalid"));
}

#[test]
fn strict_check_refuses_to_load() {
    let path = scratch("strict.board", INVALID);
    let output = run(&["check", path.to_str().unwrap(), "--strict"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn resave_writes_canonical_form() {
    let path = scratch("resave.board", VALID);
    let output = run(&["resave", path.to_str().unwrap()]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "size 3 3");
    assert_eq!(lines.iter().filter(|l| l.starts_with("hex ")).count(), 9);
    assert!(lines.iter().any(|l| l == "tag \"demo\""));
    assert!(!lines.iter().any(|l| l.contains("incline")));
    assert_eq!(lines.last().map(String::as_str), Some("end"));
}

#[test]
fn resave_to_file_round_trips() {
    let path = scratch("source.board", VALID);
    let target = path.with_file_name("target.board");
    let output = run(&["resave", path.to_str().unwrap(), target.to_str().unwrap()]);
    assert!(output.status.success());

    let first = fs::read_to_string(&target).unwrap();
    let again = run(&["resave", target.to_str().unwrap()]);
    assert_eq!(String::from_utf8_lossy(&again.stdout), first);
}

#[test]
fn elevations_for_vtol() {
    let path = scratch("vtol.board", VALID);
    let output = run(&["elevations", path.to_str().unwrap(), "0", "0", "vtol"]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "OnGround 0");
    assert_eq!(lines[10], "ElevationsAbove 10");
}

#[test]
fn elevations_in_water() {
    let path = scratch("water.board", VALID);
    let output = run(&["elevations", path.to_str().unwrap(), "2", "1", "biped", "1"]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["Seafloor -2"]);
}

#[test]
fn bad_usage_exits_with_two() {
    let output = run(&["frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
    let output = run(&["elevations", "missing.board", "0", "0", "hovercraft"]);
    assert!(!output.status.success());
}
