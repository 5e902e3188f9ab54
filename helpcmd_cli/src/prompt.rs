//! Operator confirmation for critical commands.

use helpcmd_core::CommandSpec;
use std::io::{BufRead, Write};

/// Word the operator must type to run a critical command.
pub const CONFIRM_WORD: &str = "CONFIRM";

/// Ask the operator to type `CONFIRM`. Anything else, including a read
/// error or end of input, declines.
pub fn confirm_critical<R: BufRead, W: Write>(spec: &CommandSpec, input: &mut R, out: &mut W) -> bool {
    let _ = writeln!(out, "WARNING: '{}' is a critical command.", spec.name);
    let _ = writeln!(out, "  {}", spec.command);
    let _ = write!(out, "Type '{}' to execute: ", CONFIRM_WORD);
    let _ = out.flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => line.trim() == CONFIRM_WORD,
    }
}
