// src/system/executor.rs

use crate::core::arg_parser;
use crate::system::environment::Environment;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("invalid command: unbalanced quotes in '{0}'")]
    Unparsable(String),
    #[error("execvp failed: {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("execl failed: {source}")]
    Interpreter {
        #[source]
        source: io::Error,
    },
    #[error("dup failed: {0}")]
    Dup(#[source] io::Error),
    #[error("spawned process id {0} does not fit a pid")]
    PidOutOfRange(u32),
}

/// Everything about the shell a child inherits besides its streams.
#[derive(Debug, Clone, Copy)]
pub struct LaunchContext<'a> {
    /// Receives `-c <line>` for lines containing wildcards.
    pub interpreter: &'a Path,
    pub cwd: &'a Path,
    pub env: &'a Environment,
}

/// The three standard streams handed to a child.
#[derive(Debug)]
pub struct ChildStdio {
    pub stdin: Stdio,
    pub stdout: Stdio,
    pub stderr: Stdio,
}

/// What a non-blocking wait observed for one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Running,
    Stopped,
    Continued,
    /// Exited, killed by a signal, or already reaped elsewhere.
    Exited,
}

/// Spawns `command_line` and returns the child's pid without waiting for it.
///
/// Lines with an unescaped `*` or `?` go whole to the context's interpreter;
/// everything else is tokenized and looked up on the child's `PATH`.
/// The child joins `process_group`, or leads a new group when it is `None`.
pub fn spawn(
    command_line: &str,
    context: &LaunchContext<'_>,
    stdio: ChildStdio,
    process_group: Option<Pid>,
) -> Result<Pid, LaunchError> {
    let via_interpreter = arg_parser::has_wildcards(command_line);

    let (mut command, program) = if via_interpreter {
        let mut command = StdCommand::new(context.interpreter);
        command.arg("-c").arg(command_line);
        (command, context.interpreter.display().to_string())
    } else {
        let parts = arg_parser::tokenize(command_line)
            .ok_or_else(|| LaunchError::Unparsable(command_line.to_string()))?;
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| LaunchError::Unparsable(command_line.to_string()))?;
        let mut command = StdCommand::new(program);
        command.args(args);
        (command, program.clone())
    };

    command
        .current_dir(dunce::simplified(context.cwd))
        .env_clear()
        .envs(context.env.iter())
        .stdin(stdio.stdin)
        .stdout(stdio.stdout)
        .stderr(stdio.stderr)
        .process_group(process_group.map_or(0, Pid::as_raw));

    let spawned = match command.spawn() {
        // The group leader may already be gone; fall back to a group of our own.
        Err(e) if process_group.is_some() && e.raw_os_error() == Some(Errno::EPERM as i32) => {
            log::debug!(
                "Could not join process group {:?} for '{}': {}. Starting a new group.",
                process_group,
                command_line,
                e
            );
            command.process_group(0).spawn()
        }
        other => other,
    };

    let child = spawned.map_err(|source| {
        if via_interpreter {
            LaunchError::Interpreter { source }
        } else {
            LaunchError::Exec { program, source }
        }
    })?;

    let raw_pid = child.id();
    // The handle is not needed: status is collected with `waitpid` on the pid.
    drop(child);
    let pid = i32::try_from(raw_pid)
        .map(Pid::from_raw)
        .map_err(|_| LaunchError::PidOutOfRange(raw_pid))?;

    log::debug!(
        "Spawned '{}' as pid {} (group: {:?})",
        command_line,
        pid,
        process_group.unwrap_or(pid)
    );
    Ok(pid)
}

/// One non-blocking `waitpid` on `pid` that also reports stops and continues.
pub fn poll(pid: Pid) -> Result<ChildState, Errno> {
    let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
    match waitpid(pid, Some(flags)) {
        Ok(WaitStatus::Exited(..) | WaitStatus::Signaled(..)) => Ok(ChildState::Exited),
        Ok(WaitStatus::Stopped(..)) => Ok(ChildState::Stopped),
        Ok(WaitStatus::Continued(_)) => Ok(ChildState::Continued),
        Ok(_) => Ok(ChildState::Running),
        Err(Errno::ECHILD) => Ok(ChildState::Exited),
        Err(e) => Err(e),
    }
}

/// Blocks until `pid` has terminated and is reaped.
pub fn reap(pid: Pid) {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(..) | WaitStatus::Signaled(..)) | Err(Errno::ECHILD) => return,
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(e) => {
                log::warn!("Failed to reap pid {}: {}", pid, e);
                return;
            }
        }
    }
}

/// Sends signal number `signum` to a single process. `0` only probes for existence.
pub fn send_signal(pid: Pid, signum: i32) -> Result<(), Errno> {
    let signal = if signum == 0 {
        None
    } else {
        Some(Signal::try_from(signum)?)
    };
    log::debug!("Sending signal {} to pid {}", signum, pid);
    signal::kill(pid, signal)
}

/// Signals a whole job. The first pid is the process group leader; when the
/// group cannot be signaled the members are signaled one by one.
pub fn signal_job(pids: &[Pid], signal: Signal) -> Result<(), Errno> {
    let Some(&leader) = pids.first() else {
        return Ok(());
    };
    match signal::killpg(leader, signal) {
        Ok(()) => Ok(()),
        Err(group_error) => {
            log::debug!(
                "killpg({}, {}) failed: {}. Signaling members.",
                leader,
                signal,
                group_error
            );
            let delivered = pids
                .iter()
                .filter(|&&pid| signal::kill(pid, signal).is_ok())
                .count();
            if delivered > 0 { Ok(()) } else { Err(group_error) }
        }
    }
}
