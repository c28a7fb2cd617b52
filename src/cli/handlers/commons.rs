// src/cli/handlers/commons.rs

// This module contains shared functions used by multiple handlers.

use crate::core::errors::ShellError;
use crate::models::{Command, JobRecord};
use crate::state::Shell;
use std::fmt::Display;
use std::io::Write;

/// Writes one line to the shell's current stdout (terminal, file, or pipe).
pub fn emit(shell: &mut Shell, line: impl Display) -> Result<(), ShellError> {
    writeln!(shell.streams.stdout, "{line}")
        .and_then(|()| shell.streams.stdout.flush())
        .map_err(|e| ShellError::syscall("write", e))
}

/// Rejects a command with more than `max` words (the name included).
pub fn check_max_args(
    command: &Command,
    max: usize,
    name: &'static str,
    detail: &'static str,
) -> Result<(), ShellError> {
    if command.arg_count() > max {
        return Err(ShellError::argument(name, detail));
    }
    Ok(())
}

/// Hands the foreground slot to `record` and blocks until it exits or stops.
/// The record's id must still be reserved in the job table.
pub fn run_in_foreground(shell: &mut Shell, record: JobRecord) {
    shell.foreground.fill(record);
    shell
        .foreground
        .wait(&mut shell.jobs, &mut shell.streams.stdout);
}
