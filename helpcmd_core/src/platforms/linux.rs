//! Elevation by prefixing an interactive escalation tool (`sudo` and friends)
//! and running the wrapped string through the regular process runner.

use std::path::PathBuf;

use crate::elevation::ElevationResult;
use crate::runner::ProcessRunner;
use crate::types::ElevationPath;

/// Locate `tool` the way the shell would: as a path when it contains a
/// separator, otherwise on `PATH`.
pub fn resolve_tool(tool: &str) -> Option<PathBuf> {
    let tool = tool.trim();
    if tool.is_empty() {
        return None;
    }
    which::which(tool).ok()
}

/// Build `"<tool> <command>"`.
pub fn wrap_command(tool: &str, command: &str) -> String {
    format!("{} {}", tool.trim(), command)
}

/// Run `command` under `tool`, synchronously, capturing output like any
/// other run. A non-zero exit of the wrapper counts as a failed elevation.
pub fn run_with_tool(tool: &str, command: &str, runner: &dyn ProcessRunner) -> ElevationResult {
    if resolve_tool(tool).is_none() {
        log::warn!("[elevation] '{}' not found on PATH", tool);
        return ElevationResult::ToolUnavailable(format!("'{}' was not found on PATH", tool));
    }

    let wrapped = wrap_command(tool, command);
    log::info!("[elevation] Running with {}: {}", tool, command);
    let outcome = runner.run(&wrapped);

    if outcome.success {
        log::info!("[elevation] Elevated command succeeded: {}", command);
        return ElevationResult::Succeeded(outcome.with_elevation(ElevationPath::ElevatedSucceeded));
    }

    match outcome.exit_code {
        Some(code) => {
            log::warn!("[elevation] {} returned {}: {}", tool, code, command);
            let mut detail = format!("{} exited with code {}", tool, code);
            if let Some(last) = outcome.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
                detail.push_str(": ");
                detail.push_str(last.trim());
            }
            ElevationResult::Denied(detail)
        }
        None => {
            let detail = outcome
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("{} did not report an exit code", tool));
            log::error!("[elevation] {} failed: {}", tool, detail);
            ElevationResult::LaunchError(detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;

    #[test]
    fn test_wrap_command() {
        assert_eq!(wrap_command("sudo", "ufw status"), "sudo ufw status");
        assert_eq!(wrap_command(" doas ", "dmesg"), "doas dmesg");
    }

    #[test]
    fn test_resolve_missing_tool() {
        assert!(resolve_tool("").is_none());
        assert!(resolve_tool("helpcmd-no-such-escalation-tool").is_none());
        assert!(resolve_tool("/nonexistent/dir/sudo").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_tool_on_path() {
        let found = resolve_tool("sh").expect("sh should be on PATH");
        assert!(found.ends_with("sh"));

        let absolute = resolve_tool(&found.to_string_lossy()).expect("absolute path resolves");
        assert_eq!(absolute, found);
        assert!(resolve_tool("  sh  ").is_some());
    }

    #[test]
    fn test_unavailable_tool_never_runs() {
        let runner = ScriptedRunner::new();
        let result = run_with_tool("helpcmd-no-such-escalation-tool", "id", &runner);
        assert!(matches!(result, ElevationResult::ToolUnavailable(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_wrapper_exit_codes() {
        let runner = ScriptedRunner::new()
            .then_output(0, "root\n", "")
            .then_output(1, "", "Sorry, try again.\n")
            .then_spawn_failure("sh missing");

        match run_with_tool("sh", "whoami", &runner) {
            ElevationResult::Succeeded(outcome) => {
                assert_eq!(outcome.elevation, ElevationPath::ElevatedSucceeded);
                assert_eq!(outcome.stdout, "root\n");
            }
            other => panic!("expected success, got {:?}", other),
        }

        match run_with_tool("sh", "whoami", &runner) {
            ElevationResult::Denied(detail) => {
                assert!(detail.contains("exited with code 1"));
                assert!(detail.contains("Sorry, try again."));
            }
            other => panic!("expected denial, got {:?}", other),
        }

        assert!(matches!(
            run_with_tool("sh", "whoami", &runner),
            ElevationResult::LaunchError(_)
        ));
        assert_eq!(runner.calls(), vec!["sh whoami"; 3]);
    }
}
