// src/cli/handlers/cd.rs

use crate::cli::handlers::commons;
use crate::core::errors::ShellError;
use crate::models::{Command, Flow};
use crate::state::Shell;

pub fn handle_pwd(shell: &mut Shell, _command: &Command) -> Result<Flow, ShellError> {
    let cwd = shell.cwd().display().to_string();
    commons::emit(shell, cwd)?;
    Ok(Flow::Continue)
}

/// `cd [dir|-]`. Without an argument nothing changes.
pub fn handle_cd(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    commons::check_max_args(command, 2, "cd", "too many arguments")?;
    let Some(target) = command.arg(1) else {
        return Ok(Flow::Continue);
    };

    if target == "-" {
        let previous = shell
            .previous_dir()
            .map(|dir| dir.to_string_lossy().into_owned())
            .ok_or_else(|| ShellError::lookup("cd", "OLDPWD not set"))?;
        shell.change_dir(&previous)?;
    } else {
        shell.change_dir(target)?;
    }
    Ok(Flow::Continue)
}
