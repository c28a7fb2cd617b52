// src/core/foreground.rs

use crate::CancellationToken;
use crate::core::jobs::JobTable;
use crate::models::{JobId, JobRecord};
use crate::system::executor::{self, ChildState};
use crate::system::signals;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use std::io::Write;
use std::thread;
use std::time::{Duration, SystemTime};

/// How a foreground wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every process of the job exited. The slot is clear and the id is free.
    Finished,
    /// The job stopped and now sits in the job table under this id.
    Stopped(JobId),
    /// Ctrl-C killed the job whose leader had this pid.
    Interrupted(Pid),
}

/// The single foreground slot and the loop that waits on it.
#[derive(Debug)]
pub struct ForegroundController {
    current: Option<JobRecord>,
    interrupt: CancellationToken,
    poll_interval: Duration,
}

impl ForegroundController {
    pub fn new(interrupt: CancellationToken, poll_interval: Duration) -> Self {
        Self {
            current: None,
            interrupt,
            poll_interval,
        }
    }

    pub fn current(&self) -> Option<&JobRecord> {
        self.current.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    /// Puts `record` in the slot. Its id must already be reserved in the table.
    pub fn fill(&mut self, record: JobRecord) {
        log::debug!("Foreground: [{}] pid {}", record.job_id, record.pid);
        self.current = Some(record);
    }

    /// Drops an interrupt that arrived while nothing ran in the foreground.
    /// The Ctrl-C notice is still printed on `out`.
    pub fn discard_pending_interrupt(&self, out: &mut dyn Write) {
        if signals::take_interrupt(&self.interrupt) {
            log::debug!("Discarding Ctrl-C received while idle");
            notify(out, t!("signal.got_ctrl_c"));
        }
    }

    /// Blocks until the foreground job exits, stops, or is interrupted.
    ///
    /// The record stays in the slot for the whole wait and leaves it on every
    /// outcome. `out` receives the Ctrl-C notices; a failed write is logged
    /// and never keeps the job alive.
    pub fn wait(&mut self, table: &mut JobTable, out: &mut dyn Write) -> WaitOutcome {
        let Some(record) = self.current.as_ref() else {
            return WaitOutcome::Finished;
        };
        let mut outstanding: Vec<Pid> = record.pids().collect();

        loop {
            if signals::take_interrupt(&self.interrupt) {
                return self.interrupt_job(&outstanding, table, out);
            }

            let mut still_running = Vec::with_capacity(outstanding.len());
            let mut stopped = false;
            for &pid in &outstanding {
                match executor::poll(pid) {
                    Ok(ChildState::Exited) => {}
                    Ok(ChildState::Stopped) => {
                        stopped = true;
                        still_running.push(pid);
                    }
                    Ok(ChildState::Running | ChildState::Continued) => still_running.push(pid),
                    Err(e) => {
                        log::warn!("waitpid({}) failed in foreground wait: {}", pid, e);
                        still_running.push(pid);
                    }
                }
            }
            outstanding = still_running;

            if outstanding.is_empty() {
                if let Some(record) = self.current.take() {
                    log::debug!("Foreground: [{}] finished", record.job_id);
                    table.release_id(record.job_id);
                }
                return WaitOutcome::Finished;
            }

            if stopped {
                let Some(mut record) = self.current.take() else {
                    return WaitOutcome::Finished;
                };
                let leader = record.pid;
                record.followers = outstanding.into_iter().filter(|&pid| pid != leader).collect();
                record.stopped = true;
                record.insertion_time = SystemTime::now();
                let id = record.job_id;
                log::debug!("Foreground: [{}] stopped, moving to job table", id);
                table.insert(record);
                return WaitOutcome::Stopped(id);
            }

            thread::sleep(self.poll_interval);
        }
    }

    /// Ctrl-C path: the job is killed, reaped and its id freed before
    /// anything is printed.
    fn interrupt_job(
        &mut self,
        outstanding: &[Pid],
        table: &mut JobTable,
        out: &mut dyn Write,
    ) -> WaitOutcome {
        let Some(record) = self.current.take() else {
            return WaitOutcome::Finished;
        };
        let pids: Vec<Pid> = record.pids().collect();
        if let Err(e) = executor::signal_job(&pids, Signal::SIGKILL) {
            log::warn!("SIGKILL to foreground job [{}] failed: {}", record.job_id, e);
        }
        for &pid in outstanding {
            executor::reap(pid);
        }
        table.release_id(record.job_id);

        notify(out, t!("signal.got_ctrl_c"));
        notify(out, &format!(t!("signal.process_killed"), pid = record.pid));
        WaitOutcome::Interrupted(record.pid)
    }

    /// SIGKILLs and reaps a job left in the slot. Used when the shell quits.
    pub fn terminate(&mut self, table: &mut JobTable) -> Option<JobRecord> {
        let record = self.current.take()?;
        let pids: Vec<Pid> = record.pids().collect();
        if let Err(e) = executor::signal_job(&pids, Signal::SIGKILL) {
            log::debug!("SIGKILL to foreground job [{}] failed: {}", record.job_id, e);
        }
        for &pid in &pids {
            executor::reap(pid);
        }
        table.release_id(record.job_id);
        Some(record)
    }
}

fn notify(out: &mut dyn Write, message: &str) {
    let written = writeln!(out, "{message}").and_then(|()| out.flush());
    if let Err(e) = written {
        log::warn!("Could not print '{}': {}", message, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::environment::Environment;
    use crate::system::executor::{ChildStdio, LaunchContext};
    use std::path::Path;
    use std::process::Stdio;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn spawn_sleep(seconds: &str) -> Pid {
        let env = Environment::from_process();
        let cwd = std::env::temp_dir();
        let context = LaunchContext {
            interpreter: Path::new("/bin/sh"),
            cwd: &cwd,
            env: &env,
        };
        let stdio = ChildStdio {
            stdin: Stdio::null(),
            stdout: Stdio::null(),
            stderr: Stdio::null(),
        };
        executor::spawn(&format!("sleep {seconds}"), &context, stdio, None).unwrap()
    }

    fn controller() -> (ForegroundController, CancellationToken) {
        let token: CancellationToken = Arc::new(AtomicBool::new(false));
        (
            ForegroundController::new(Arc::clone(&token), Duration::from_millis(5)),
            token,
        )
    }

    #[test]
    fn test_finished_job_clears_slot_and_frees_id() {
        // --- Setup ---
        let (mut fg, _token) = controller();
        let mut table = JobTable::new(100);
        let id = table.reserve_id().unwrap();
        let pid = spawn_sleep("0.05");
        fg.fill(JobRecord::new(id, pid, "sleep 0.05"));
        let mut out = Vec::new();

        // --- Execute ---
        let outcome = fg.wait(&mut table, &mut out);

        // --- Assert ---
        assert_eq!(outcome, WaitOutcome::Finished);
        assert!(!fg.is_busy());
        assert!(!table.is_id_used(id));
        assert!(out.is_empty());
    }

    #[test]
    fn test_stopped_job_moves_to_table() {
        let (mut fg, _token) = controller();
        let mut table = JobTable::new(100);
        let id = table.reserve_id().unwrap();
        let pid = spawn_sleep("5");
        fg.fill(JobRecord::new(id, pid, "sleep 5"));

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            executor::send_signal(pid, Signal::SIGSTOP as i32).unwrap();
        });
        let outcome = fg.wait(&mut table, &mut Vec::new());
        stopper.join().unwrap();

        assert_eq!(outcome, WaitOutcome::Stopped(id));
        assert!(!fg.is_busy());
        let record = table.get(id).unwrap();
        assert!(record.stopped);
        assert_eq!(record.pid, pid);
        assert_eq!(table.last_stopped_job().unwrap().job_id, id);

        table.kill_all();
        executor::reap(pid);
    }

    #[test]
    fn test_interrupt_kills_foreground_job() {
        let (mut fg, token) = controller();
        let mut table = JobTable::new(100);
        let id = table.reserve_id().unwrap();
        let pid = spawn_sleep("5");
        fg.fill(JobRecord::new(id, pid, "sleep 5"));

        let raiser = {
            let token = Arc::clone(&token);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                token.store(true, Ordering::SeqCst);
            })
        };
        let mut out = Vec::new();
        let outcome = fg.wait(&mut table, &mut out);
        raiser.join().unwrap();

        assert_eq!(outcome, WaitOutcome::Interrupted(pid));
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed,
            format!("smash: got ctrl-C\nsmash: process {pid} was killed\n")
        );
        assert!(!table.is_id_used(id));
        assert!(table.is_empty());
        assert!(!token.load(Ordering::SeqCst));
    }

    #[test]
    fn test_interrupt_kills_even_when_output_fails() {
        // --- Setup: notices go to a device that rejects every write ---
        let (mut fg, token) = controller();
        let mut table = JobTable::new(100);
        let id = table.reserve_id().unwrap();
        let pid = spawn_sleep("5");
        fg.fill(JobRecord::new(id, pid, "sleep 5"));
        let mut full = std::fs::OpenOptions::new().write(true).open("/dev/full").unwrap();

        // --- Execute ---
        let raiser = {
            let token = Arc::clone(&token);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                token.store(true, Ordering::SeqCst);
            })
        };
        let outcome = fg.wait(&mut table, &mut full);
        raiser.join().unwrap();

        // --- Assert ---
        assert_eq!(outcome, WaitOutcome::Interrupted(pid));
        assert!(!fg.is_busy());
        assert!(!table.is_id_used(id));
        assert!(executor::send_signal(pid, 0).is_err());
    }

    #[test]
    fn test_slot_keeps_record_until_outcome() {
        let (mut fg, _token) = controller();
        let mut table = JobTable::new(100);
        let id = table.reserve_id().unwrap();
        let pid = spawn_sleep("0.05");
        fg.fill(JobRecord::new(id, pid, "sleep 0.05"));
        assert_eq!(fg.current().map(|record| record.pid), Some(pid));

        // A job stopped before the wait starts is found on the first poll
        // and leaves the slot for the table.
        executor::send_signal(pid, Signal::SIGSTOP as i32).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(fg.wait(&mut table, &mut Vec::new()), WaitOutcome::Stopped(id));
        assert!(fg.current().is_none());
        assert!(table.get(id).is_some());

        table.kill_all();
        executor::reap(pid);
    }

    #[test]
    fn test_idle_interrupt_is_discarded() {
        let (fg, token) = controller();
        token.store(true, Ordering::SeqCst);
        let mut out = Vec::new();
        fg.discard_pending_interrupt(&mut out);
        assert!(!token.load(Ordering::SeqCst));
        assert_eq!(String::from_utf8(out).unwrap(), "smash: got ctrl-C\n");

        let mut quiet = Vec::new();
        fg.discard_pending_interrupt(&mut quiet);
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_empty_slot_returns_immediately() {
        let (mut fg, _token) = controller();
        let mut table = JobTable::new(100);
        assert_eq!(
            fg.wait(&mut table, &mut Vec::new()),
            WaitOutcome::Finished
        );
    }
}
