//! CLI session tests: username bursts, scripts, and file persistence.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

struct TempDir(PathBuf);

impl TempDir {
    fn new() -> io::Result<Self> {
        let path = std::env::temp_dir().join(format!("checkin-e2e-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path)?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn fast_command(storage: Option<&Path>) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_checkin"));
    for (key, _) in std::env::vars().filter(|(key, _)| key.starts_with("CHECKIN_")) {
        command.env_remove(key);
    }
    command
        .env("CHECKIN_DEBOUNCE_MS", "40")
        .env("CHECKIN_LOOKUP_DELAY_MS", "20")
        .env("RUST_LOG", "off");
    if let Some(path) = storage {
        command.env("CHECKIN_STORAGE_PATH", path);
    }
    command
}

fn json_stdout(output: &Output) -> io::Result<serde_json::Value> {
    serde_json::from_slice(&output.stdout).map_err(io::Error::other)
}

fn run_with_stdin(mut command: Command, stdin: &str) -> io::Result<Output> {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut pipe) = child.stdin.take() {
        pipe.write_all(stdin.as_bytes())?;
    }
    child.wait_with_output()
}

#[test]
fn taken_username_ends_invalid() -> io::Result<()> {
    let output = fast_command(None)
        .args(["--output", "json", "--no-progress", "check-username", "Kirk"])
        .output()?;
    assert!(output.status.success());

    let value = json_stdout(&output)?;
    assert_eq!(
        value.pointer("/report/state/username/message"),
        Some(&serde_json::json!("Username taken at Gate M72"))
    );
    let first = value.pointer("/report/transitions/0/result/status");
    assert_eq!(first, Some(&serde_json::json!("checking")));
    Ok(())
}

#[test]
fn burst_only_reports_the_final_value() -> io::Result<()> {
    let output = fast_command(None)
        .args([
            "--output", "json", "--no-progress", "check-username", "j", "ja", "jam", "jame",
            "james", "jamesh", "--gap-ms", "5",
        ])
        .output()?;
    assert!(output.status.success());

    let value = json_stdout(&output)?;
    let transitions = value
        .pointer("/report/transitions")
        .and_then(serde_json::Value::as_array)
        .map_or(0, Vec::len);
    assert_eq!(transitions, 2);
    assert_eq!(
        value.pointer("/report/state/username/status"),
        Some(&serde_json::json!("valid"))
    );
    Ok(())
}

#[test]
fn script_from_stdin_checks_in_and_persists() -> io::Result<()> {
    let dir = TempDir::new()?;
    let storage = dir.path().join("passengers.json");

    let mut command = fast_command(Some(&storage));
    command.args(["--output", "ndjson", "run"]);
    let script = "fullName=Cliff Burton\nemail=cliff@gate.m72\nseat=3A\nusername=cliff\nwait 200\ncomplete\n";
    let output = run_with_stdin(command, script)?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let summary = stdout.lines().last().unwrap_or_default();
    assert!(summary.contains("\"outcome\":\"checkedIn\""), "{summary}");

    let listed = fast_command(Some(&storage))
        .args(["--output", "json", "passengers", "list"])
        .output()?;
    let value = json_stdout(&listed)?;
    assert_eq!(
        value.pointer("/passengers/0/displayName"),
        Some(&serde_json::json!("Cliff Burton"))
    );
    Ok(())
}

#[test]
fn malformed_script_reports_the_line() -> io::Result<()> {
    let dir = TempDir::new()?;
    let script = dir.path().join("bad.script");
    std::fs::write(&script, "username=lars\nboard now\n")?;

    let output = fast_command(None)
        .args(["--no-progress", "run", "--script"])
        .arg(&script)
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(stdout.contains("code: script:unknown_step"));
    assert!(stdout.contains("line: 2"));
    Ok(())
}
