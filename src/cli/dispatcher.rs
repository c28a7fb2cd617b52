// src/cli/dispatcher.rs

use crate::cli::handlers;
use crate::core::arg_parser::trim;
use crate::core::command;
use crate::core::errors::ShellError;
use crate::core::task_executor::{self, Launched};
use crate::models::{Builtin, Command, CommandKind, Flow, JobRecord};
use crate::state::Shell;
use std::io::Write;

// --- Builtin Definition and Registry ---

/// Handler signature shared by every builtin.
type BuiltinHandler = fn(&mut Shell, &Command) -> Result<Flow, ShellError>;

/// Binds a builtin to the function that runs it.
struct BuiltinDefinition {
    builtin: Builtin,
    handler: BuiltinHandler,
}

/// The single source of truth for which function runs each builtin.
static BUILTIN_REGISTRY: &[BuiltinDefinition] = &[
    BuiltinDefinition {
        builtin: Builtin::Chprompt,
        handler: handlers::prompt::handle_chprompt,
    },
    BuiltinDefinition {
        builtin: Builtin::Showpid,
        handler: handlers::prompt::handle_showpid,
    },
    BuiltinDefinition {
        builtin: Builtin::Pwd,
        handler: handlers::cd::handle_pwd,
    },
    BuiltinDefinition {
        builtin: Builtin::Cd,
        handler: handlers::cd::handle_cd,
    },
    BuiltinDefinition {
        builtin: Builtin::Jobs,
        handler: handlers::jobs::handle,
    },
    BuiltinDefinition {
        builtin: Builtin::Fg,
        handler: handlers::fg::handle,
    },
    BuiltinDefinition {
        builtin: Builtin::Quit,
        handler: handlers::quit::handle,
    },
    BuiltinDefinition {
        builtin: Builtin::Kill,
        handler: handlers::kill::handle,
    },
    BuiltinDefinition {
        builtin: Builtin::Alias,
        handler: handlers::alias::handle_alias,
    },
    BuiltinDefinition {
        builtin: Builtin::Unalias,
        handler: handlers::alias::handle_unalias,
    },
    BuiltinDefinition {
        builtin: Builtin::Unsetenv,
        handler: handlers::env::handle_unsetenv,
    },
    BuiltinDefinition {
        builtin: Builtin::Watchproc,
        handler: handlers::sysinfo::handle_watchproc,
    },
    BuiltinDefinition {
        builtin: Builtin::Du,
        handler: handlers::sysinfo::handle_du,
    },
    BuiltinDefinition {
        builtin: Builtin::Whoami,
        handler: handlers::sysinfo::handle_whoami,
    },
    BuiltinDefinition {
        builtin: Builtin::Netinfo,
        handler: handlers::sysinfo::handle_netinfo,
    },
];

fn find_handler(builtin: Builtin) -> Option<BuiltinHandler> {
    BUILTIN_REGISTRY
        .iter()
        .find(|definition| definition.builtin == builtin)
        .map(|definition| definition.handler)
}

/// Runs a builtin in-process against the shell's current streams.
pub fn run_builtin(
    shell: &mut Shell,
    builtin: Builtin,
    command: &Command,
) -> Result<Flow, ShellError> {
    log::debug!("Running builtin '{}' with {:?}", builtin.name(), command.args);
    let handler = find_handler(builtin)
        .ok_or_else(|| ShellError::lookup("smash", format!("{} is not implemented", builtin.name())))?;
    handler(shell, command)
}

/// Prints `smash error: <err>` on the shell's current stderr.
pub fn report(shell: &mut Shell, err: &ShellError) {
    log::debug!("Command failed: {:?}", err);
    let written = writeln!(shell.streams.stderr, "{}: {}", t!("error.prefix"), err)
        .and_then(|()| shell.streams.stderr.flush());
    if let Err(e) = written {
        log::warn!("Could not report error '{}': {}", err, e);
    }
}

/// Runs one line read from the user and tells the read loop whether to go on.
pub fn dispatch(raw_line: &str, shell: &mut Shell) -> Flow {
    shell
        .foreground
        .discard_pending_interrupt(&mut shell.streams.stdout);

    let line = trim(raw_line);
    if line.is_empty() {
        return Flow::Continue;
    }

    shell.jobs.remove_finished();

    let expanded = shell.aliases.expand(line);
    let Some(command) = command::parse(&expanded) else {
        return Flow::Continue;
    };
    log::debug!("Dispatching {:?}", command);

    match execute(shell, &command, line) {
        Ok(flow) => flow,
        Err(e) => {
            report(shell, &e);
            Flow::Continue
        }
    }
}

/// Builtins run right away; everything else becomes a job.
/// `original_line` is what `jobs` shows for a background job.
fn execute(shell: &mut Shell, command: &Command, original_line: &str) -> Result<Flow, ShellError> {
    if let CommandKind::Builtin(builtin) = command.kind {
        return run_builtin(shell, builtin, command);
    }

    let job_id = shell.jobs.reserve_id()?;
    let launched = match task_executor::launch(shell, command, None) {
        Ok(launched) => launched,
        Err(e) => {
            shell.jobs.release_id(job_id);
            return Err(e);
        }
    };

    let pids = match launched {
        Launched::Inline(flow) => {
            shell.jobs.release_id(job_id);
            return Ok(flow);
        }
        Launched::Spawned(pids) => pids,
    };
    let Some((&leader, followers)) = pids.split_first() else {
        shell.jobs.release_id(job_id);
        return Ok(Flow::Continue);
    };
    let record = JobRecord::new(job_id, leader, command.text.as_str())
        .with_followers(followers.to_vec());

    if command.background {
        shell.jobs.insert(record.with_display_text(original_line));
    } else {
        shell.foreground.fill(record);
        shell.foreground.wait(&mut shell.jobs, &mut shell.streams.stdout);
    }
    Ok(Flow::Continue)
}
