//! Choosing and invoking the host's elevation mechanism.

use crate::platform::OsFamily;
use crate::platforms::linux;
use crate::runner::ProcessRunner;
use crate::types::{ElevationFailure, ExecutionOutcome};

pub const DEFAULT_ELEVATION_TOOL: &str = "sudo";

/// Tagged result of one elevation attempt. Strategies never panic or return
/// `Err`; the executor decides what to do with a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElevationResult {
    /// The elevated run completed with exit code 0.
    Succeeded(ExecutionOutcome),
    /// The elevated process was started detached; no exit code available.
    LaunchedDetached,
    Denied(String),
    ToolUnavailable(String),
    LaunchError(String),
}

impl ElevationResult {
    /// The failure tag, or `None` when the attempt counts as elevated.
    pub fn failure(&self) -> Option<ElevationFailure> {
        match self {
            ElevationResult::Succeeded(_) | ElevationResult::LaunchedDetached => None,
            ElevationResult::Denied(d) => Some(ElevationFailure::Denied(d.clone())),
            ElevationResult::ToolUnavailable(d) => Some(ElevationFailure::ToolUnavailable(d.clone())),
            ElevationResult::LaunchError(d) => Some(ElevationFailure::LaunchError(d.clone())),
        }
    }
}

/// One variant per mechanism, picked once from the OS family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElevationStrategy {
    /// `ShellExecuteExW` + `runas`, launches detached.
    WindowsRunAs,
    /// Prefix an escalation tool such as `sudo` and run synchronously.
    PrefixTool { tool: String },
    /// No supported mechanism on this host.
    Unavailable,
}

impl ElevationStrategy {
    pub fn for_family(family: OsFamily, tool: &str) -> Self {
        match family {
            OsFamily::Windows => ElevationStrategy::WindowsRunAs,
            OsFamily::Linux => ElevationStrategy::PrefixTool {
                tool: tool.to_string(),
            },
            OsFamily::MacOs | OsFamily::Unknown => ElevationStrategy::Unavailable,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ElevationStrategy::WindowsRunAs => "UAC (runas)".to_string(),
            ElevationStrategy::PrefixTool { tool } => format!("{} prefix", tool),
            ElevationStrategy::Unavailable => "unavailable".to_string(),
        }
    }

    pub fn attempt(&self, command: &str, runner: &dyn ProcessRunner) -> ElevationResult {
        match self {
            ElevationStrategy::WindowsRunAs => runner.launch_elevated(command),
            ElevationStrategy::PrefixTool { tool } => linux::run_with_tool(tool, command, runner),
            ElevationStrategy::Unavailable => ElevationResult::ToolUnavailable(
                "no elevation mechanism is supported on this platform".to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;

    #[test]
    fn test_strategy_per_family() {
        assert_eq!(
            ElevationStrategy::for_family(OsFamily::Windows, "sudo"),
            ElevationStrategy::WindowsRunAs
        );
        assert_eq!(
            ElevationStrategy::for_family(OsFamily::Linux, "doas"),
            ElevationStrategy::PrefixTool {
                tool: "doas".to_string()
            }
        );
        assert_eq!(
            ElevationStrategy::for_family(OsFamily::MacOs, "sudo"),
            ElevationStrategy::Unavailable
        );
        assert_eq!(
            ElevationStrategy::for_family(OsFamily::Unknown, "sudo"),
            ElevationStrategy::Unavailable
        );
    }

    #[test]
    fn test_unavailable_strategy_does_not_run() {
        let runner = ScriptedRunner::new();
        let result = ElevationStrategy::Unavailable.attempt("id", &runner);
        assert!(matches!(
            result.failure(),
            Some(ElevationFailure::ToolUnavailable(_))
        ));
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_runas_goes_through_runner_launch() {
        let runner = ScriptedRunner::new().then_launch(ElevationResult::LaunchedDetached);
        let result = ElevationStrategy::WindowsRunAs.attempt("ipconfig /flushdns", &runner);
        assert_eq!(result, ElevationResult::LaunchedDetached);
        assert_eq!(runner.launch_calls(), vec!["ipconfig /flushdns"]);
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_failure_tags() {
        let ok = ElevationResult::Succeeded(ExecutionOutcome::from_exit(
            Some(0),
            String::new(),
            String::new(),
        ));
        assert!(ok.failure().is_none());
        assert!(ElevationResult::LaunchedDetached.failure().is_none());
        assert_eq!(
            ElevationResult::LaunchError("x".into()).failure(),
            Some(ElevationFailure::LaunchError("x".into()))
        );
    }
}
