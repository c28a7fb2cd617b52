// src/cli/handlers/alias.rs

use crate::cli::handlers::commons;
use crate::core::errors::ShellError;
use crate::models::{Command, Flow};
use crate::state::Shell;

/// `alias` lists definitions; `alias name='body'` adds one.
pub fn handle_alias(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    if command.arg_count() <= 1 {
        let entries: Vec<String> = shell.aliases.iter().map(ToString::to_string).collect();
        for entry in entries {
            commons::emit(shell, entry)?;
        }
        return Ok(Flow::Continue);
    }

    shell.aliases.define_from_line(&command.text)?;
    Ok(Flow::Continue)
}

/// `unalias <name>...`: stops at the first unknown name.
pub fn handle_unalias(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    let names = command.args.get(1..).unwrap_or_default();
    if names.is_empty() {
        return Err(ShellError::argument("unalias", "not enough arguments"));
    }
    for name in names {
        shell.aliases.remove(name)?;
    }
    Ok(Flow::Continue)
}
