// src/cli/handlers/fg.rs

use crate::cli::handlers::commons;
use crate::core::errors::ShellError;
use crate::models::{Command, Flow, JobId};
use crate::state::Shell;
use crate::system::executor;
use nix::sys::signal::Signal;
use nix::unistd::Pid;

/// `fg [job-id]`: moves a job to the foreground, continuing it if stopped.
pub fn handle(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    commons::check_max_args(command, 2, "fg", "invalid arguments")?;
    let job_id = select_job(shell, command)?;

    let Some(mut record) = shell.jobs.detach(job_id) else {
        return Err(ShellError::lookup("fg", format!("job-id {job_id} does not exist")));
    };

    if record.stopped {
        let pids: Vec<Pid> = record.pids().collect();
        if let Err(e) = executor::signal_job(&pids, Signal::SIGCONT) {
            // Put it back untouched so the id does not leak.
            shell.jobs.insert(record);
            return Err(ShellError::syscall("kill", e));
        }
        record.stopped = false;
    }

    let resumed = format!(t!("fg.resumed"), text = record.display_text, pid = record.pid);
    if let Err(e) = commons::emit(shell, resumed) {
        // The job keeps running; it goes back to the table instead of the slot.
        shell.jobs.insert(record);
        return Err(e);
    }
    commons::run_in_foreground(shell, record);
    Ok(Flow::Continue)
}

fn select_job(shell: &Shell, command: &Command) -> Result<JobId, ShellError> {
    let Some(token) = command.arg(1) else {
        return shell
            .jobs
            .last_job()
            .map(|record| record.job_id)
            .ok_or_else(|| ShellError::lookup("fg", "jobs list is empty"));
    };

    let requested: i64 = token
        .parse()
        .map_err(|_| ShellError::invalid_arguments("fg"))?;
    usize::try_from(requested)
        .ok()
        .filter(|id| shell.jobs.get(*id).is_some())
        .ok_or_else(|| ShellError::lookup("fg", format!("job-id {requested} does not exist")))
}

#[cfg(test)]
mod tests {
    use crate::cli::dispatcher::dispatch;
    use crate::state::test_support::Harness;

    #[test]
    fn test_fg_argument_errors() {
        let mut harness = Harness::new();

        dispatch("fg", &mut harness.shell);
        dispatch("fg 1 2", &mut harness.shell);
        dispatch("fg abc", &mut harness.shell);
        dispatch("fg 3", &mut harness.shell);

        assert_eq!(
            harness.stderr(),
            "smash error: fg: jobs list is empty\n\
             smash error: fg: invalid arguments\n\
             smash error: fg: invalid arguments\n\
             smash error: fg: job-id 3 does not exist\n"
        );
    }

    #[test]
    fn test_fg_waits_for_running_job() {
        let mut harness = Harness::new();
        dispatch("sleep 0.2&", &mut harness.shell);
        let pid = harness.shell.jobs.get(1).unwrap().pid;

        dispatch("fg 1", &mut harness.shell);

        assert_eq!(harness.stdout(), format!("sleep 0.2& {pid}\n"));
        assert!(harness.shell.jobs.is_empty());
        assert!(!harness.shell.jobs.is_id_used(1));
        assert!(!harness.shell.foreground.is_busy());
    }

    #[test]
    fn test_fg_write_failure_keeps_job_tracked() {
        // --- Setup ---
        let mut harness = Harness::new();
        dispatch("sleep 5&", &mut harness.shell);
        let pid = harness.shell.jobs.get(1).unwrap().pid;

        // --- Execute ---
        dispatch("fg > /dev/full", &mut harness.shell);

        // --- Assert ---
        assert!(harness.stderr().starts_with("smash error: write failed"));
        let record = harness.shell.jobs.get(1).unwrap();
        assert_eq!(record.pid, pid);
        assert!(!harness.shell.foreground.is_busy());

        dispatch("sleep 6&", &mut harness.shell);
        assert!(harness.shell.jobs.get(2).is_some());
    }

    #[test]
    fn test_fg_without_argument_takes_highest_id() {
        let mut harness = Harness::new();
        dispatch("sleep 5&", &mut harness.shell);
        dispatch("sleep 0.1&", &mut harness.shell);

        dispatch("fg", &mut harness.shell);

        assert!(harness.stdout().starts_with("sleep 0.1& "));
        assert!(harness.shell.jobs.get(1).is_some());
        assert!(harness.shell.jobs.get(2).is_none());
    }
}
