#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_creates_and_shows_shifts() {
    run_cli("add 1 10:00 11:00 2 Reading\nshow\nquit\n")
        .success()
        .stdout(str_contains("Saved shift 1 (10:00 - 11:00)."))
        .stdout(str_contains("[ok] Shift created"))
        .stdout(str_contains("Room A"));
}

#[test]
fn cli_marks_conflicting_shifts() {
    run_cli("add 1 09:00 10:00\nadd 1 09:30 10:30\nadd 1 09:15 09:45\nshow\nweek\nquit\n")
        .success()
        .stdout(str_contains("conflict"))
        .stdout(str_contains("1 conflict(s)"));
}

#[test]
fn cli_rejects_invalid_ranges_locally() {
    run_cli("add 1 11:00 10:00\nquit\n")
        .success()
        .stdout(str_contains("Invalid shift:"));
}

#[test]
fn cli_reports_double_booking() {
    run_cli("add 1 10:00 11:00 2\nadd 1 10:30 11:30 2\nquit\n")
        .success()
        .stdout(str_contains("[error] Failed to save shift"));
}

#[test]
fn cli_resolves_clicks() {
    run_cli("click 1 0.5\nquit\n")
        .success()
        .stdout(str_contains("slot 13:30 -> draft 13:30 - 14:30"));
}

#[test]
fn cli_lists_teacher_availability() {
    run_cli("add 1 10:00 11:00 2\nteachers 1 10:30 11:30\nquit\n")
        .success()
        .stdout(str_contains("available"))
        .stdout(str_contains("busy (10:00 - 11:00 Room A)"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "add 1 10:00 11:00 1 Persisted\nsave json {path}\nadd 2 12:00 13:00\nload json {path}\nshow\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Grid loaded from"));
    let after_reload = output.split("Grid loaded from").last().unwrap_or_default();
    assert!(after_reload.contains("10:00 - 11:00"));
    assert!(!after_reload.contains("12:00 - 13:00"));
}

#[test]
fn cli_delete_command_removes_shift() {
    run_cli("add 1 10:00 11:00\ndelete 1\ndelete 1\nquit\n")
        .success()
        .stdout(str_contains("Deleted shift 1."))
        .stdout(str_contains("Error: not found: shift 1"));
}
