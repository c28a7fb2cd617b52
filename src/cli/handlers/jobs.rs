// src/cli/handlers/jobs.rs

use crate::cli::handlers::commons;
use crate::core::errors::ShellError;
use crate::models::{Command, Flow, JobRecord};
use crate::state::Shell;

/// Lists tracked jobs in ascending id order.
pub fn handle(shell: &mut Shell, _command: &Command) -> Result<Flow, ShellError> {
    let entries: Vec<String> = shell.jobs.iter().map(JobRecord::to_string).collect();
    for entry in entries {
        commons::emit(shell, entry)?;
    }
    Ok(Flow::Continue)
}
