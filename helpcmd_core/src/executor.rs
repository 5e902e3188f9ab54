//! Command executor: confirmation, elevation decision, execution and audit.
//!
//! Every call returns exactly one `ExecutionOutcome` and emits exactly one
//! audit record, whatever happened along the way.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::elevation::{ElevationResult, ElevationStrategy};
use crate::platform::HostContext;
use crate::runner::{ProcessRunner, ShellRunner};
use crate::types::{CommandSpec, ElevationFailure, ElevationPath, ExecutionError, ExecutionOutcome};

/// Key recorded for operator-typed commands.
pub const FREE_COMMAND_KEY: &str = "FREE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    ConfirmationPending,
    ElevationDecision,
    Elevating,
    Running,
    Completed,
}

/// What gets recorded for each invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Local>,
    pub key: String,
    pub name: String,
    pub command: String,
    pub success: bool,
    pub is_free_command: bool,
    pub elevation: ElevationPath,
}

/// Receives one record per invocation. Implementations must serialize their
/// own writes; the executor may be called from many workers at once.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// Keeps records in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
    }
}

struct Invocation<'a> {
    key: &'a str,
    name: &'a str,
    command: &'a str,
    is_free_command: bool,
}

pub struct CommandExecutor<R: ProcessRunner = ShellRunner> {
    host: HostContext,
    elevation: ElevationStrategy,
    runner: R,
    audit: Option<Arc<dyn AuditSink>>,
}

impl CommandExecutor<ShellRunner> {
    /// Executor wired to the real shell and the host's elevation mechanism.
    pub fn for_host(host: HostContext, elevation_tool: &str) -> Self {
        let elevation = ElevationStrategy::for_family(host.family(), elevation_tool);
        let runner = ShellRunner::for_family(host.family());
        Self::new(host, elevation, runner)
    }
}

impl<R: ProcessRunner> CommandExecutor<R> {
    pub fn new(host: HostContext, elevation: ElevationStrategy, runner: R) -> Self {
        Self {
            host,
            elevation,
            runner,
            audit: None,
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    pub fn elevation(&self) -> &ElevationStrategy {
        &self.elevation
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a catalog command. `confirm` is consulted only for critical
    /// commands; returning `false` ends the invocation without spawning.
    pub fn execute<F>(&self, spec: &CommandSpec, confirm: F) -> ExecutionOutcome
    where
        F: FnOnce(&CommandSpec) -> bool,
    {
        let invocation = Invocation {
            key: &spec.key,
            name: &spec.name,
            command: &spec.command,
            is_free_command: false,
        };
        self.transition(&invocation, ExecutionState::Idle);

        if spec.is_critical {
            self.transition(&invocation, ExecutionState::ConfirmationPending);
            if !confirm(spec) {
                log::info!("[executor] Execution cancelled: {}", spec.name);
                return self.complete(&invocation, ExecutionOutcome::cancelled());
            }
        }

        let outcome = self.dispatch(&invocation, spec.requires_admin);
        self.complete(&invocation, outcome)
    }

    /// Run an operator-typed command. Never asks for confirmation.
    pub fn execute_free(&self, command: &str, requires_admin: bool) -> ExecutionOutcome {
        let invocation = Invocation {
            key: FREE_COMMAND_KEY,
            name: command,
            command,
            is_free_command: true,
        };
        self.transition(&invocation, ExecutionState::Idle);
        let outcome = self.dispatch(&invocation, requires_admin);
        self.complete(&invocation, outcome)
    }

    fn dispatch(&self, invocation: &Invocation<'_>, requires_admin: bool) -> ExecutionOutcome {
        log::info!(
            "[executor] Executing {}: {} ({})",
            if invocation.is_free_command { "free command" } else { "command" },
            invocation.name,
            invocation.command
        );

        self.transition(invocation, ExecutionState::ElevationDecision);
        if !requires_admin || self.host.elevated {
            return self.run_unprivileged(invocation, ElevationPath::None);
        }

        self.transition(invocation, ExecutionState::Elevating);
        let result = self.elevation.attempt(invocation.command, &self.runner);
        self.settle(invocation, result)
    }

    /// Turn one elevation attempt into the final outcome: elevated success and
    /// detached launches stand, every failure falls back exactly once.
    fn settle(&self, invocation: &Invocation<'_>, result: ElevationResult) -> ExecutionOutcome {
        match result {
            ElevationResult::Succeeded(outcome) => outcome.with_elevation(ElevationPath::ElevatedSucceeded),
            ElevationResult::LaunchedDetached => ExecutionOutcome::launched_detached(),
            ElevationResult::Denied(detail) => self.fall_back(invocation, ElevationFailure::Denied(detail)),
            ElevationResult::ToolUnavailable(detail) => {
                self.fall_back(invocation, ElevationFailure::ToolUnavailable(detail))
            }
            ElevationResult::LaunchError(detail) => {
                self.fall_back(invocation, ElevationFailure::LaunchError(detail))
            }
        }
    }

    fn fall_back(&self, invocation: &Invocation<'_>, reason: ElevationFailure) -> ExecutionOutcome {
        log::warn!(
            "[executor] {}; running '{}' without elevated privileges",
            reason,
            invocation.name
        );
        self.run_unprivileged(invocation, ElevationPath::ElevatedFailedFellBack(reason))
    }

    fn run_unprivileged(&self, invocation: &Invocation<'_>, path: ElevationPath) -> ExecutionOutcome {
        self.transition(invocation, ExecutionState::Running);
        self.runner.run(invocation.command).with_elevation(path)
    }

    fn complete(&self, invocation: &Invocation<'_>, outcome: ExecutionOutcome) -> ExecutionOutcome {
        self.transition(invocation, ExecutionState::Completed);

        match &outcome.error {
            None if outcome.is_detached() => {
                log::info!("[executor] Elevated process launched detached: {}", invocation.name)
            }
            None => log::info!("[executor] Command succeeded: {}", invocation.name),
            Some(ExecutionError::NonZeroExit(code)) => {
                log::warn!("[executor] Command returned {}: {}", code, invocation.command)
            }
            Some(ExecutionError::NoExitCode) => {
                log::warn!("[executor] Command terminated without exit code: {}", invocation.command)
            }
            Some(ExecutionError::SpawnFailure(detail)) => {
                log::error!("[executor] Could not run '{}': {}", invocation.command, detail)
            }
            Some(ExecutionError::OperatorCancelled) => {}
        }

        let record = AuditRecord {
            timestamp: Local::now(),
            key: invocation.key.to_string(),
            name: invocation.name.to_string(),
            command: invocation.command.to_string(),
            success: outcome.success,
            is_free_command: invocation.is_free_command,
            elevation: outcome.elevation.clone(),
        };
        log::info!(
            target: "audit",
            "key={} name={:?} command={:?} success={} elevation={}",
            record.key,
            record.name,
            record.command,
            record.success,
            record.elevation.label()
        );
        if let Some(sink) = &self.audit {
            sink.record(&record);
        }

        outcome
    }

    fn transition(&self, invocation: &Invocation<'_>, state: ExecutionState) {
        log::debug!("[executor] {} -> {:?}", invocation.key, state);
    }
}
