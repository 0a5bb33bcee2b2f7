//! CLI smoke tests: commands that need no directory round-trip.

use std::io;
use std::process::{Command, Output};

fn checkin(args: &[&str]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_checkin"));
    for (key, _) in std::env::vars().filter(|(key, _)| key.starts_with("CHECKIN_")) {
        command.env_remove(key);
    }
    command.args(args).env("RUST_LOG", "off").output()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn info_is_deterministic() -> io::Result<()> {
    let first = checkin(&["--output", "json", "info"])?;
    let second = checkin(&["--output", "json", "info"])?;

    assert!(first.status.success());
    assert_eq!(stdout_of(&first), stdout_of(&second));
    assert!(stdout_of(&first).contains("\"name\": \"checkin-cli\""));
    Ok(())
}

#[test]
fn validate_reports_each_sync_field() -> io::Result<()> {
    let email = checkin(&["validate", "email", "lars@gate.m72"])?;
    assert!(email.status.success());
    assert_eq!(stdout_of(&email), "Email: VALID\n");

    let name = checkin(&["validate", "fullName", "   "])?;
    assert_eq!(stdout_of(&name), "Full Name: INVALID: Full Name is required\n");
    Ok(())
}

#[test]
fn validate_refuses_username() -> io::Result<()> {
    let output = checkin(&["--no-progress", "validate", "username", "lars"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout_of(&output).contains("check-username"));
    Ok(())
}

#[test]
fn config_show_prints_defaults_as_toml() -> io::Result<()> {
    let output = checkin(&["config", "show"])?;
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("debounceMs = 400"));
    assert!(stdout.contains("lookupDelayMs = 500"));
    Ok(())
}

#[test]
fn bad_env_override_is_an_input_error() -> io::Result<()> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_checkin"));
    let output = command
        .args(["--output", "json", "config", "check"])
        .env("CHECKIN_DEBOUNCE_MS", "soon")
        .env("RUST_LOG", "off")
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout_of(&output).contains("\"status\": \"error\""));
    Ok(())
}
