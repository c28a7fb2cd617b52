// src/cli/handlers/kill.rs

use crate::cli::handlers::commons;
use crate::core::arg_parser::{self, JobIdArg};
use crate::core::errors::ShellError;
use crate::models::{Command, Flow};
use crate::state::Shell;
use crate::system::executor;

/// `kill -<signum> <job-id>`: sends a signal to the job's process.
pub fn handle(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    let (Some(signal_token), Some(job_token), 3) =
        (command.arg(1), command.arg(2), command.arg_count())
    else {
        return Err(ShellError::invalid_arguments("kill"));
    };

    let signum = arg_parser::parse_signal_token(signal_token)
        .ok_or_else(|| ShellError::invalid_arguments("kill"))?;
    let job_id = match arg_parser::parse_job_id(job_token) {
        JobIdArg::Id(id) => id,
        JobIdArg::Invalid => return Err(ShellError::invalid_arguments("kill")),
    };

    let pid = shell
        .jobs
        .get(job_id)
        .map(|record| record.pid)
        .ok_or_else(|| ShellError::lookup("kill", format!("job-id {job_id} does not exist")))?;

    executor::send_signal(pid, signum).map_err(|e| ShellError::syscall("kill", e))?;
    commons::emit(shell, format!(t!("kill.sent"), signal = signum, pid = pid))?;
    Ok(Flow::Continue)
}
