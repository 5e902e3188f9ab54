use helpcmd_core::elevation::{ElevationResult, ElevationStrategy};
use helpcmd_core::executor::{CommandExecutor, MemoryAuditSink};
use helpcmd_core::platform::{HostContext, OsFamily, PlatformInfo};
use helpcmd_core::platforms::windows::{classify_launch_error, ERROR_CANCELLED_CODE};
use helpcmd_core::runner::{ScriptedRunner, Shell, ShellRunner};
use helpcmd_core::types::{CommandSpec, ElevationFailure, ElevationPath, ExecutionError};
use std::cell::Cell;
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn host(family: OsFamily, elevated: bool) -> HostContext {
    HostContext::new(
        PlatformInfo {
            family,
            version: "integration".to_string(),
        },
        elevated,
    )
}

#[cfg(unix)]
#[test]
fn test_scenario_a_echo_hello() {
    init_logging();
    let executor = CommandExecutor::new(
        host(OsFamily::Linux, false),
        ElevationStrategy::Unavailable,
        ShellRunner::new(Shell::Posix),
    );
    let spec = CommandSpec::new("A", "Echo", "echo hello", "Test");

    let outcome = executor.execute(&spec, |_| false);

    assert!(outcome.success);
    assert_eq!(outcome.exit_code, Some(0));
    assert!(outcome.stdout.contains("hello"));
    assert_eq!(outcome.elevation, ElevationPath::None);
}

#[test]
fn test_scenario_b_already_elevated_skips_elevation() {
    init_logging();
    let executor = CommandExecutor::new(
        host(OsFamily::Linux, true),
        ElevationStrategy::PrefixTool {
            tool: "sudo".to_string(),
        },
        ScriptedRunner::new().then_exit(0),
    );
    let spec = CommandSpec::new("R5", "Firewall", "ufw status", "Network").admin();

    let outcome = executor.execute(&spec, |_| true);

    assert!(outcome.success);
    assert_eq!(outcome.elevation, ElevationPath::None);
    assert_eq!(executor.runner().calls(), vec!["ufw status"]);
}

#[test]
fn test_scenario_c_declined_confirmation_spawns_nothing() {
    init_logging();
    let sink = Arc::new(MemoryAuditSink::new());
    let executor = CommandExecutor::new(
        host(OsFamily::Linux, false),
        ElevationStrategy::PrefixTool {
            tool: "sudo".to_string(),
        },
        ScriptedRunner::new(),
    )
    .with_audit_sink(sink.clone());
    let spec = CommandSpec::new("8", "Reboot", "systemctl reboot", "System")
        .admin()
        .critical();

    let outcome = executor.execute(&spec, |_| false);

    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ExecutionError::OperatorCancelled));
    assert_eq!(outcome.error.as_ref().unwrap().to_string(), "cancelled by operator");
    assert_eq!(outcome.exit_code, None);
    assert_eq!(executor.runner().call_count(), 0);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert!(!records[0].success);
}

#[cfg(unix)]
#[test]
fn test_scenario_d_failed_wrapper_falls_back() {
    init_logging();
    // `sh` stands in for sudo: any tool on PATH works with a scripted runner
    let executor = CommandExecutor::new(
        host(OsFamily::Linux, false),
        ElevationStrategy::PrefixTool {
            tool: "sh".to_string(),
        },
        ScriptedRunner::new()
            .then_output(1, "", "sudo: 1 incorrect password attempt\n")
            .then_output(5, "partial\n", "permission denied\n"),
    );
    let spec = CommandSpec::new("4", "Hardware", "lshw -short", "System").admin();

    let outcome = executor.execute(&spec, |_| true);

    assert_eq!(executor.runner().calls(), vec!["sh lshw -short", "lshw -short"]);
    assert_eq!(outcome.exit_code, Some(5));
    assert!(!outcome.success);
    assert_eq!(outcome.stdout, "partial\n");
    match &outcome.elevation {
        ElevationPath::ElevatedFailedFellBack(ElevationFailure::Denied(detail)) => {
            assert!(detail.contains("incorrect password"));
        }
        other => panic!("expected fallback after denial, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_scenario_d_with_real_shell() {
    init_logging();
    // `false` accepts and ignores arguments, exiting 1 like a rejected sudo
    let executor = CommandExecutor::new(
        host(OsFamily::Linux, false),
        ElevationStrategy::PrefixTool {
            tool: "false".to_string(),
        },
        ShellRunner::new(Shell::Posix),
    );

    let outcome = executor.execute_free("echo fallback", true);

    assert!(outcome.success);
    assert!(outcome.stdout.contains("fallback"));
    assert!(outcome.fell_back());
}

#[cfg(unix)]
#[test]
fn test_elevation_success_is_final() {
    init_logging();
    let executor = CommandExecutor::new(
        host(OsFamily::Linux, false),
        ElevationStrategy::PrefixTool {
            tool: "sh".to_string(),
        },
        ScriptedRunner::new().then_output(0, "Status: active\n", ""),
    );
    let spec = CommandSpec::new("R5", "Firewall", "ufw status", "Network").admin();

    let outcome = executor.execute(&spec, |_| true);

    assert!(outcome.success);
    assert_eq!(outcome.elevation, ElevationPath::ElevatedSucceeded);
    assert_eq!(outcome.stdout, "Status: active\n");
    assert_eq!(executor.runner().calls(), vec!["sh ufw status"]);
}

#[test]
fn test_exactly_one_elevation_attempt_before_fallback() {
    init_logging();
    let executor = CommandExecutor::new(
        host(OsFamily::Linux, false),
        ElevationStrategy::PrefixTool {
            tool: "helpcmd-missing-escalation-tool".to_string(),
        },
        ScriptedRunner::new().then_exit(0),
    );
    let spec = CommandSpec::new("R6", "Sockets", "netstat -tulpn", "Network").admin();

    let outcome = executor.execute(&spec, |_| true);

    assert!(matches!(
        outcome.elevation,
        ElevationPath::ElevatedFailedFellBack(ElevationFailure::ToolUnavailable(_))
    ));
    assert_eq!(executor.runner().calls(), vec!["netstat -tulpn"]);
    assert!(outcome.success);
}

#[test]
fn test_scenario_e_free_form_never_confirms() {
    init_logging();
    let sink = Arc::new(MemoryAuditSink::new());
    let executor = CommandExecutor::new(
        host(OsFamily::MacOs, false),
        ElevationStrategy::Unavailable,
        ScriptedRunner::new().then_exit(0),
    )
    .with_audit_sink(sink.clone());

    let outcome = executor.execute_free("shutdown -h now", true);

    assert!(outcome.success);
    assert!(outcome.fell_back());
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "FREE");
    assert!(records[0].is_free_command);
}

#[test]
fn test_confirmed_critical_command_runs_once() {
    init_logging();
    let executor = CommandExecutor::new(
        host(OsFamily::Linux, false),
        ElevationStrategy::Unavailable,
        ScriptedRunner::new().then_exit(0),
    );
    let spec = CommandSpec::new("P2", "Update", "apt upgrade -y", "Programs").critical();
    let prompts = Cell::new(0);

    let outcome = executor.execute(&spec, |_| {
        prompts.set(prompts.get() + 1);
        true
    });

    assert!(outcome.success);
    assert_eq!(prompts.get(), 1);
    assert_eq!(executor.runner().call_count(), 1);
}

#[test]
fn test_spawn_failure_is_distinct_from_nonzero_exit() {
    init_logging();
    let executor = CommandExecutor::new(
        host(OsFamily::Linux, false),
        ElevationStrategy::Unavailable,
        ScriptedRunner::new()
            .then_spawn_failure("No such file or directory")
            .then_exit(127),
    );

    let spawn = executor.execute_free("anything", false);
    assert_eq!(spawn.exit_code, None);
    assert!(matches!(spawn.error, Some(ExecutionError::SpawnFailure(_))));

    let missing = executor.execute_free("missing-binary", false);
    assert_eq!(missing.exit_code, Some(127));
    assert_eq!(missing.error, Some(ExecutionError::NonZeroExit(127)));
}

#[cfg(not(target_os = "windows"))]
#[test]
fn test_runas_strategy_off_windows_falls_back() {
    init_logging();
    let executor = CommandExecutor::new(
        host(OsFamily::Windows, false),
        ElevationStrategy::WindowsRunAs,
        ScriptedRunner::new().then_exit(0),
    );

    let outcome = executor.execute_free("ipconfig /flushdns", true);

    assert!(matches!(
        outcome.elevation,
        ElevationPath::ElevatedFailedFellBack(ElevationFailure::LaunchError(_))
    ));
    assert_eq!(executor.runner().calls(), vec!["ipconfig /flushdns"]);
}

#[cfg(unix)]
#[test]
fn test_concurrent_invocations_are_independent() {
    init_logging();
    let sink = Arc::new(MemoryAuditSink::new());
    let executor = Arc::new(
        CommandExecutor::new(
            host(OsFamily::Linux, false),
            ElevationStrategy::Unavailable,
            ShellRunner::new(Shell::Posix),
        )
        .with_audit_sink(sink.clone()),
    );

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let executor = Arc::clone(&executor);
            std::thread::spawn(move || (i, executor.execute_free(&format!("echo worker-{}", i), false)))
        })
        .collect();

    for handle in handles {
        let (i, outcome) = handle.join().unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.stdout.trim(), format!("worker-{}", i));
    }
    assert_eq!(sink.records().len(), 6);
}

#[test]
fn test_detached_launch_is_final_and_audited() {
    init_logging();
    let sink = Arc::new(MemoryAuditSink::new());
    let executor = CommandExecutor::new(
        host(OsFamily::Windows, false),
        ElevationStrategy::WindowsRunAs,
        ScriptedRunner::new().then_launch(ElevationResult::LaunchedDetached),
    )
    .with_audit_sink(sink.clone());
    let spec = CommandSpec::new("R3", "Flush DNS Cache", "ipconfig /flushdns", "Network").admin();

    let outcome = executor.execute(&spec, |_| true);

    assert!(outcome.is_detached());
    assert_eq!(outcome.elevation, ElevationPath::ElevatedLaunchedDetached);
    assert!(!outcome.success);
    assert_eq!(outcome.exit_code, None);
    assert_eq!(outcome.error, None);
    assert_eq!(executor.runner().launch_calls(), vec!["ipconfig /flushdns"]);
    assert_eq!(executor.runner().call_count(), 0);

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].elevation, ElevationPath::ElevatedLaunchedDetached);
    assert!(!records[0].success);
}

#[test]
fn test_declined_uac_prompt_falls_back() {
    init_logging();
    let cancelled = std::io::Error::from_raw_os_error(ERROR_CANCELLED_CODE);
    let executor = CommandExecutor::new(
        host(OsFamily::Windows, false),
        ElevationStrategy::WindowsRunAs,
        ScriptedRunner::new()
            .then_launch(classify_launch_error(&cancelled))
            .then_output(1, "", "Access is denied.\r\n"),
    );

    let outcome = executor.execute_free("ipconfig /flushdns", true);

    assert!(matches!(
        outcome.elevation,
        ElevationPath::ElevatedFailedFellBack(ElevationFailure::Denied(_))
    ));
    assert_eq!(outcome.exit_code, Some(1));
    assert!(!outcome.success);
    assert_eq!(executor.runner().launch_calls(), vec!["ipconfig /flushdns"]);
    assert_eq!(executor.runner().calls(), vec!["ipconfig /flushdns"]);
}
