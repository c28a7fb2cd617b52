// src/core/task_executor.rs

//! Runs the non-builtin shapes of a command line: plain external commands,
//! pipes, and redirections.
//!
//! Pipe sides and redirected commands are segments. Each segment is resolved
//! through the alias table and classified again, so a builtin can sit on
//! either side of a pipe or in front of a `>`. Builtin segments run in-process
//! with the shell's streams swapped. External segments are spawned into the
//! job's process group.

use crate::cli::dispatcher;
use crate::core::arg_parser::{self, trim};
use crate::core::command;
use crate::core::errors::ShellError;
use crate::models::{Command, CommandKind, Flow, PipeChannel, RedirectMode};
use crate::state::Shell;
use crate::system::executor;
use crate::system::plumbing::{self, StreamSlot, StreamTarget};
use nix::unistd::Pid;

/// What running a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launched {
    /// Everything ran in-process; nothing to wait for.
    Inline(Flow),
    /// Processes that now form one job, group leader first.
    Spawned(Vec<Pid>),
}

impl Launched {
    fn pids(self) -> Vec<Pid> {
        match self {
            Self::Inline(_) => Vec::new(),
            Self::Spawned(pids) => pids,
        }
    }
}

/// Launches a parsed command without waiting for it.
///
/// `group` is the process group new children join; `None` makes the first
/// spawned child a new group leader.
pub fn launch(
    shell: &mut Shell,
    command: &Command,
    group: Option<Pid>,
) -> Result<Launched, ShellError> {
    match &command.kind {
        CommandKind::Builtin(builtin) => {
            dispatcher::run_builtin(shell, *builtin, command).map(Launched::Inline)
        }
        CommandKind::External => launch_external(shell, &command.text, group),
        CommandKind::Pipe {
            left,
            right,
            channel,
        } => launch_pipe(shell, left, right, *channel, group),
        CommandKind::Redirection {
            command: inner,
            target,
            mode,
        } => launch_redirection(shell, inner, target, *mode, group),
    }
}

fn launch_external(
    shell: &mut Shell,
    text: &str,
    group: Option<Pid>,
) -> Result<Launched, ShellError> {
    let stdio = shell.streams.child_stdio()?;
    let pid = executor::spawn(text, &shell.launch_context(), stdio, group)?;
    Ok(Launched::Spawned(vec![pid]))
}

/// Resolves one segment (alias, background marker) and launches it.
/// A segment's own background marker is ignored.
fn launch_segment(
    shell: &mut Shell,
    text: &str,
    group: Option<Pid>,
) -> Result<Launched, ShellError> {
    let expanded = shell.aliases.expand(text);
    match command::parse(&expanded) {
        Some(segment) => launch(shell, &segment, group),
        None => Ok(Launched::Inline(Flow::Continue)),
    }
}

fn is_builtin_segment(shell: &Shell, text: &str) -> bool {
    let expanded = shell.aliases.expand(text);
    matches!(
        command::parse(&expanded).map(|segment| segment.kind),
        Some(CommandKind::Builtin(_))
    )
}

fn launch_pipe(
    shell: &mut Shell,
    left: &str,
    right: &str,
    channel: PipeChannel,
    group: Option<Pid>,
) -> Result<Launched, ShellError> {
    let left = arg_parser::strip_background(trim(left));
    let right = arg_parser::strip_background(trim(right));
    if left.is_empty() || right.is_empty() {
        return Err(ShellError::parse("pipe", "invalid syntax"));
    }

    let (reader, writer) = plumbing::os_pipe().map_err(|e| ShellError::syscall("pipe", e))?;
    let left_slot = match channel {
        PipeChannel::Stdout => StreamSlot::Stdout,
        PipeChannel::Stderr => StreamSlot::Stderr,
    };
    let run_left = move |shell: &mut Shell, group: Option<Pid>| {
        shell.with_stream(left_slot, StreamTarget::File(writer), |shell| {
            launch_segment(shell, left, group)
        })
    };
    let run_right = move |shell: &mut Shell, group: Option<Pid>| {
        shell.with_stream(StreamSlot::Stdin, StreamTarget::File(reader), |shell| {
            launch_segment(shell, right, group)
        })
    };

    // A builtin writer runs to completion in-process, so its reader must
    // already be running or a full pipe would block the shell.
    let mut pids = Vec::new();
    if is_builtin_segment(shell, left) {
        let first = run_right(shell, group);
        let group = group.or_else(|| leader_of(&first));
        collect_segment(shell, first, &mut pids);
        let second = run_left(shell, group);
        collect_segment(shell, second, &mut pids);
    } else {
        let first = run_left(shell, group);
        let group = group.or_else(|| leader_of(&first));
        collect_segment(shell, first, &mut pids);
        let second = run_right(shell, group);
        collect_segment(shell, second, &mut pids);
    }

    log::debug!("Pipe '{} | {}' launched {:?}", left, right, pids);
    if pids.is_empty() {
        Ok(Launched::Inline(Flow::Continue))
    } else {
        Ok(Launched::Spawned(pids))
    }
}

fn leader_of(result: &Result<Launched, ShellError>) -> Option<Pid> {
    match result {
        Ok(Launched::Spawned(pids)) => pids.first().copied(),
        _ => None,
    }
}

/// Keeps the processes a pipe side spawned. A failing side is reported on
/// the spot and the other side still runs.
fn collect_segment(shell: &mut Shell, result: Result<Launched, ShellError>, pids: &mut Vec<Pid>) {
    match result {
        Ok(launched) => pids.extend(launched.pids()),
        Err(e) => dispatcher::report(shell, &e),
    }
}

fn launch_redirection(
    shell: &mut Shell,
    inner: &str,
    target: &str,
    mode: RedirectMode,
    group: Option<Pid>,
) -> Result<Launched, ShellError> {
    if target.is_empty() {
        return Err(ShellError::argument("redirection", "missing output file"));
    }
    if inner.is_empty() {
        return Err(ShellError::parse("redirection", "invalid command"));
    }

    let path = shell.resolve_path(target);
    let file =
        plumbing::open_redirect(&path, mode).map_err(|e| ShellError::syscall("open", e))?;
    log::debug!("Redirecting '{}' to '{}' ({:?})", inner, path.display(), mode);

    shell.with_stream(StreamSlot::Stdout, StreamTarget::File(file), |shell| {
        launch_segment(shell, inner, group)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::Harness;

    fn run(harness: &mut Harness, line: &str) -> Launched {
        let command = command::parse(line).unwrap();
        launch(&mut harness.shell, &command, None).unwrap()
    }

    fn wait_all(launched: Launched) {
        for pid in launched.pids() {
            executor::reap(pid);
        }
    }

    #[test]
    fn test_external_command_writes_to_shell_stdout() {
        let mut harness = Harness::new();
        let launched = run(&mut harness, "echo hello");
        assert!(matches!(launched, Launched::Spawned(ref pids) if pids.len() == 1));
        wait_all(launched);
        assert_eq!(harness.stdout(), "hello\n");
    }

    #[test]
    fn test_pipe_connects_both_sides() {
        let mut harness = Harness::new();
        let launched = run(&mut harness, r"printf 'a\nb\nc\n'|wc -l");
        assert!(matches!(launched, Launched::Spawned(ref pids) if pids.len() == 2));
        wait_all(launched);
        assert_eq!(harness.stdout().trim(), "3");
    }

    #[test]
    fn test_stderr_pipe() {
        let mut harness = Harness::new();
        let launched = run(&mut harness, "ls /definitely/not/here |& wc -l");
        wait_all(launched);
        assert_eq!(harness.stdout().trim(), "1");
    }

    #[test]
    fn test_builtin_on_left_of_pipe() {
        let mut harness = Harness::new();
        let launched = run(&mut harness, "showpid | wc -l");
        wait_all(launched);
        assert_eq!(harness.stdout().trim(), "1");
    }

    #[test]
    fn test_redirection_truncates_and_appends() {
        let mut harness = Harness::new();

        wait_all(run(&mut harness, "echo one > out.txt"));
        wait_all(run(&mut harness, "echo one > out.txt"));
        assert_eq!(harness.read("out.txt"), "one\n");

        wait_all(run(&mut harness, "echo two >> log.txt"));
        wait_all(run(&mut harness, "echo two >> log.txt"));
        assert_eq!(harness.read("log.txt"), "two\ntwo\n");

        // Output stays on the terminal stream once the redirection ends.
        assert!(harness.stdout().is_empty());
    }

    #[test]
    fn test_builtin_redirection_runs_inline() {
        let mut harness = Harness::new();
        let launched = run(&mut harness, "pwd > where.txt");
        assert_eq!(launched, Launched::Inline(Flow::Continue));
        assert_eq!(
            harness.read("where.txt").trim(),
            harness.shell.cwd().display().to_string()
        );
    }

    #[test]
    fn test_pipe_into_redirection() {
        let mut harness = Harness::new();
        wait_all(run(&mut harness, "echo hi | wc -c > count.txt"));
        assert_eq!(harness.read("count.txt").trim(), "3");
    }

    #[test]
    fn test_empty_pipe_side_is_rejected() {
        let mut harness = Harness::new();
        let command = command::parse("ls |").unwrap();
        let err = launch(&mut harness.shell, &command, None).unwrap_err();
        assert_eq!(err.to_string(), "pipe: invalid syntax");
    }

    #[test]
    fn test_redirection_errors() {
        let mut harness = Harness::new();
        let command = command::parse("echo hi >").unwrap();
        let err = launch(&mut harness.shell, &command, None).unwrap_err();
        assert_eq!(err.to_string(), "redirection: missing output file");

        let command = command::parse("> out.txt").unwrap();
        let err = launch(&mut harness.shell, &command, None).unwrap_err();
        assert_eq!(err.to_string(), "redirection: invalid command");
    }

    #[test]
    fn test_failing_pipe_side_is_reported_and_other_side_runs() {
        let mut harness = Harness::new();
        let launched = run(&mut harness, "no-such-program-xyz | echo still");
        wait_all(launched);
        assert_eq!(harness.stdout(), "still\n");
        assert!(harness.stderr().starts_with("smash error: execvp failed"));
    }

    #[test]
    fn test_wildcards_go_through_interpreter() {
        let mut harness = Harness::new();
        std::fs::write(harness.dir.path().join("a.txt"), "").unwrap();
        std::fs::write(harness.dir.path().join("b.txt"), "").unwrap();
        wait_all(run(&mut harness, "ls *.txt"));
        assert_eq!(harness.stdout(), "a.txt\nb.txt\n");
    }
}
