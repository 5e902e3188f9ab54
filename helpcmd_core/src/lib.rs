// Core of the help-desk command runner: platform detection, privilege
// elevation, shell execution and the executor that ties them together.

// Execution core
pub mod types;
pub mod privilege;
pub mod platform;
pub mod platforms;
pub mod elevation;
pub mod runner;
pub mod executor;

// Collaborators
pub mod atomic;
pub mod catalog;
pub mod config;
pub mod help;
pub mod history;

pub use executor::{AuditRecord, AuditSink, CommandExecutor, FREE_COMMAND_KEY};
pub use types::{CommandSpec, ElevationFailure, ElevationPath, ExecutionError, ExecutionOutcome};

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
