use serde::{Deserialize, Serialize};

fn default_description() -> String {
    "No description available.".to_string()
}

/// A catalog entry: one named shell command the operator can run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub key: String,
    pub name: String,
    pub command: String,
    pub category: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default)]
    pub requires_admin: bool,
    #[serde(default)]
    pub is_critical: bool,
}

impl CommandSpec {
    pub fn new(key: &str, name: &str, command: &str, category: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            command: command.to_string(),
            category: category.to_string(),
            description: default_description(),
            requires_admin: false,
            is_critical: false,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn admin(mut self) -> Self {
        self.requires_admin = true;
        self
    }

    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }

    /// Case-insensitive key comparison, the catalog's lookup rule.
    pub fn matches_key(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key.trim())
    }
}

/// Why an elevation attempt did not produce an elevated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ElevationFailure {
    #[error("elevation denied: {0}")]
    Denied(String),
    #[error("elevation unavailable: {0}")]
    ToolUnavailable(String),
    #[error("elevated launch failed: {0}")]
    LaunchError(String),
}

/// How privileges were handled for one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "path", content = "reason", rename_all = "snake_case")]
pub enum ElevationPath {
    /// Ran as the current user without trying to elevate.
    #[default]
    None,
    /// Ran to completion under the elevation tool.
    ElevatedSucceeded,
    /// Elevated process was launched and detached; its exit code is unknown.
    ElevatedLaunchedDetached,
    /// Elevation failed and the command was run unprivileged instead.
    ElevatedFailedFellBack(ElevationFailure),
}

impl ElevationPath {
    pub fn label(&self) -> &'static str {
        match self {
            ElevationPath::None => "none",
            ElevationPath::ElevatedSucceeded => "elevated",
            ElevationPath::ElevatedLaunchedDetached => "elevated (detached)",
            ElevationPath::ElevatedFailedFellBack(_) => "unprivileged after elevation failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("failed to spawn process: {0}")]
    SpawnFailure(String),
    #[error("process exited with code {0}")]
    NonZeroExit(i32),
    #[error("process terminated without an exit code")]
    NoExitCode,
    #[error("cancelled by operator")]
    OperatorCancelled,
}

/// Result of exactly one invocation of the executor.
///
/// `success` is true iff the process started and exited with code 0. Build
/// outcomes through the constructors so that rule holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elevation: ElevationPath,
    pub success: bool,
    pub error: Option<ExecutionError>,
}

impl ExecutionOutcome {
    /// Outcome of a process that started. `exit_code` is `None` when the OS
    /// reported no code (e.g. killed by a signal).
    pub fn from_exit(exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        let error = match exit_code {
            Some(0) => None,
            Some(code) => Some(ExecutionError::NonZeroExit(code)),
            None => Some(ExecutionError::NoExitCode),
        };
        Self {
            exit_code,
            stdout,
            stderr,
            elevation: ElevationPath::None,
            success: exit_code == Some(0),
            error,
        }
    }

    pub fn spawn_failure(detail: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            elevation: ElevationPath::None,
            success: false,
            error: Some(ExecutionError::SpawnFailure(detail.into())),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            elevation: ElevationPath::None,
            success: false,
            error: Some(ExecutionError::OperatorCancelled),
        }
    }

    pub fn launched_detached() -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            elevation: ElevationPath::ElevatedLaunchedDetached,
            success: false,
            error: None,
        }
    }

    pub fn with_elevation(mut self, elevation: ElevationPath) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, Some(ExecutionError::OperatorCancelled))
    }

    pub fn is_detached(&self) -> bool {
        self.elevation == ElevationPath::ElevatedLaunchedDetached
    }

    pub fn fell_back(&self) -> bool {
        matches!(self.elevation, ElevationPath::ElevatedFailedFellBack(_))
    }

    pub fn spawned(&self) -> bool {
        !matches!(
            self.error,
            Some(ExecutionError::SpawnFailure(_)) | Some(ExecutionError::OperatorCancelled)
        )
    }
}
