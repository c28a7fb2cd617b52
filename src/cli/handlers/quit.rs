// src/cli/handlers/quit.rs

use crate::cli::handlers::commons;
use crate::core::errors::ShellError;
use crate::models::{Command, Flow};
use crate::state::Shell;

/// `quit [kill]`: ends the read loop. With `kill`, every job is listed and
/// SIGKILLed first.
pub fn handle(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    if command.arg(1) == Some("kill") {
        let mut victims: Vec<_> = shell
            .jobs
            .iter()
            .chain(shell.foreground.current())
            .map(|record| (record.job_id, record.pid, record.display_text.clone()))
            .collect();
        victims.sort_by_key(|(job_id, _, _)| *job_id);

        commons::emit(shell, format!(t!("quit.sending_sigkill"), count = victims.len()))?;
        for (_, pid, text) in victims {
            commons::emit(shell, format!(t!("quit.job_line"), pid = pid, text = text))?;
        }
        shell.jobs.kill_all();
    }

    if let Some(record) = shell.foreground.terminate(&mut shell.jobs) {
        log::debug!("quit: killed foreground job [{}]", record.job_id);
    }
    Ok(Flow::Exit)
}

#[cfg(test)]
mod tests {
    use crate::cli::dispatcher::dispatch;
    use crate::models::{Flow, JobRecord};
    use crate::state::test_support::Harness;
    use crate::system::executor::{self, ChildState};

    #[test]
    fn test_quit_without_kill_just_exits() {
        let mut harness = Harness::new();
        dispatch("sleep 5&", &mut harness.shell);
        assert_eq!(dispatch("quit", &mut harness.shell), Flow::Exit);
        assert!(harness.stdout().is_empty());
        assert_eq!(harness.shell.jobs.len(), 1);
    }

    #[test]
    fn test_quit_kill_lists_table_and_foreground_by_id() {
        // --- Setup: jobs 1 and 3 in the table, job 2 in the foreground slot ---
        let mut harness = Harness::new();
        dispatch("sleep 5&", &mut harness.shell);
        dispatch("sleep 6&", &mut harness.shell);
        dispatch("sleep 7&", &mut harness.shell);
        let middle = harness.shell.jobs.detach(2).unwrap();
        let middle_pid = middle.pid;
        harness.shell.foreground.fill(JobRecord::new(2, middle_pid, "sleep 6"));
        let first = harness.shell.jobs.get(1).unwrap().pid;
        let third = harness.shell.jobs.get(3).unwrap().pid;

        // --- Execute ---
        let flow = dispatch("quit kill", &mut harness.shell);

        // --- Assert ---
        assert_eq!(flow, Flow::Exit);
        assert_eq!(
            harness.stdout(),
            format!(
                "smash: sending SIGKILL signal to 3 jobs:\n\
                 {first}: sleep 5&\n\
                 {middle_pid}: sleep 6\n\
                 {third}: sleep 7&\n"
            )
        );
        assert!(harness.shell.jobs.is_empty());
        assert!(!harness.shell.foreground.is_busy());
        assert_eq!(executor::poll(middle_pid), Ok(ChildState::Exited));
        for pid in [first, third] {
            executor::reap(pid);
        }
    }
}
