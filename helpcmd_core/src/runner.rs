//! Shell process execution with fully buffered output.

use std::collections::VecDeque;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use crate::elevation::ElevationResult;
use crate::platform::OsFamily;
use crate::platforms::windows;
use crate::types::ExecutionOutcome;

/// Starts processes for the executor.
pub trait ProcessRunner: Send + Sync {
    /// Run one command string through the host command interpreter and block
    /// until it exits.
    fn run(&self, command: &str) -> ExecutionOutcome;

    /// Start `command` elevated in its own console without waiting for it.
    fn launch_elevated(&self, command: &str) -> ElevationResult {
        windows::launch_elevated(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// `cmd.exe /C`
    Cmd,
    /// `sh -c`
    Posix,
}

impl Shell {
    pub fn for_family(family: OsFamily) -> Self {
        match family {
            OsFamily::Windows => Shell::Cmd,
            _ => Shell::Posix,
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            Shell::Cmd => "cmd",
            Shell::Posix => "sh",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Shell::Cmd => "/C",
            Shell::Posix => "-c",
        }
    }

    fn command(&self, command_line: &str) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.arg(self.flag());
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            // cmd.exe does its own parsing; Rust's argv quoting would mangle it
            cmd.raw_arg(command_line);
        }
        #[cfg(not(windows))]
        {
            cmd.arg(command_line);
        }
        cmd
    }
}

/// The real runner: one shell invocation per call, no timeout.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: Shell,
}

impl ShellRunner {
    pub fn new(shell: Shell) -> Self {
        Self { shell }
    }

    pub fn for_family(family: OsFamily) -> Self {
        Self::new(Shell::for_family(family))
    }

    pub fn shell(&self) -> Shell {
        self.shell
    }
}

impl ProcessRunner for ShellRunner {
    fn run(&self, command: &str) -> ExecutionOutcome {
        log::debug!(
            "[runner] {} {} {}",
            self.shell.program(),
            self.shell.flag(),
            command
        );

        let output = self
            .shell
            .command(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(output) => ExecutionOutcome::from_exit(
                output.status.code(),
                String::from_utf8_lossy(&output.stdout).to_string(),
                String::from_utf8_lossy(&output.stderr).to_string(),
            ),
            Err(e) => {
                // reported once, by the executor
                ExecutionOutcome::spawn_failure(format!(
                    "failed to execute '{}': {}",
                    self.shell.program(),
                    e
                ))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedResponse {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    SpawnFailure(String),
}

/// Test double that records every command and replays queued responses.
/// With an empty queue every run exits 0 with no output, and every elevated
/// launch goes to the real launcher.
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    calls: Mutex<Vec<String>>,
    launches: Mutex<VecDeque<ElevationResult>>,
    launch_calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            launches: Mutex::new(VecDeque::new()),
            launch_calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue the result of the next elevated launch.
    pub fn then_launch(self, result: ElevationResult) -> Self {
        self.launches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
        self
    }

    /// Commands handed to `launch_elevated`, in order.
    pub fn launch_calls(&self) -> Vec<String> {
        self.launch_calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn then_exit(self, code: i32) -> Self {
        self.then_output(code, "", "")
    }

    pub fn then_output(self, code: i32, stdout: &str, stderr: &str) -> Self {
        self.push(ScriptedResponse::Exit {
            code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        })
    }

    pub fn then_spawn_failure(self, detail: &str) -> Self {
        self.push(ScriptedResponse::SpawnFailure(detail.to_string()))
    }

    fn push(self, response: ScriptedResponse) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &str) -> ExecutionOutcome {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(command.to_string());

        let next = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(ScriptedResponse::Exit {
                code,
                stdout,
                stderr,
            }) => ExecutionOutcome::from_exit(Some(code), stdout, stderr),
            Some(ScriptedResponse::SpawnFailure(detail)) => ExecutionOutcome::spawn_failure(detail),
            None => ExecutionOutcome::from_exit(Some(0), String::new(), String::new()),
        }
    }

    fn launch_elevated(&self, command: &str) -> ElevationResult {
        self.launch_calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(command.to_string());

        let next = self
            .launches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        next.unwrap_or_else(|| windows::launch_elevated(command))
    }
}
