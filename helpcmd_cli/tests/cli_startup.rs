//! End-to-end checks of the helpcmd binary against a scratch data directory

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn helpcmd(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_helpcmd"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("helpcmd binary should start")
}

fn corrupt_data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("history.json"), "[broken").unwrap();
    dir
}

#[test]
fn test_corrupt_files_warn_on_stderr() {
    let dir = corrupt_data_dir();

    let output = helpcmd(dir.path(), &["--log-stderr", "info"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[WARN] [config] Invalid JSON"), "stderr: {}", stderr);
    assert!(stderr.contains("using defaults"), "stderr: {}", stderr);
    assert!(stderr.contains("[WARN] [history] Invalid JSON"), "stderr: {}", stderr);
    assert!(dir.path().join("history.json.bak").exists());
}

#[test]
fn test_corrupt_config_warning_reaches_log_file() {
    let dir = corrupt_data_dir();

    let output = helpcmd(dir.path(), &["info"]);
    assert!(output.status.success());

    let log = std::fs::read_to_string(dir.path().join("helpcmd.log")).unwrap();
    assert!(log.contains("[config]"), "log: {}", log);
    assert!(log.contains("using defaults"), "log: {}", log);
}

#[cfg(unix)]
#[test]
fn test_exec_keeps_corrupt_history_aside() {
    let dir = corrupt_data_dir();

    let output = helpcmd(dir.path(), &["--log-stderr", "exec", "true"]);
    assert!(output.status.success());

    let backup = std::fs::read_to_string(dir.path().join("history.json.bak")).unwrap();
    assert_eq!(backup, "[broken");
    let history = std::fs::read_to_string(dir.path().join("history.json")).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&history).unwrap();
    assert_eq!(entries.as_array().map(|a| a.len()), Some(1));
}

#[cfg(unix)]
#[test]
fn test_exec_passes_command_line_verbatim() {
    let dir = TempDir::new().unwrap();

    let output = helpcmd(
        dir.path(),
        &["--log-stderr", "exec", "--", r#"printf '[%s]\n' "a b""#],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[a b]"), "stdout: {}", stdout);
}

#[test]
fn test_exec_rejects_blank_command() {
    let dir = TempDir::new().unwrap();
    let output = helpcmd(dir.path(), &["--log-stderr", "exec", "   "]);
    assert!(!output.status.success());
}

#[test]
fn test_guide_topics() {
    let dir = TempDir::new().unwrap();

    let output = helpcmd(dir.path(), &["--log-stderr", "guide", "about"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ABOUT - HELP COMMANDS"));

    let unknown = helpcmd(dir.path(), &["--log-stderr", "guide", "nope"]);
    assert!(!unknown.status.success());
}
