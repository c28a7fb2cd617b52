// src/cli/handlers/prompt.rs

use crate::cli::handlers::commons;
use crate::core::errors::ShellError;
use crate::models::{Command, Flow};
use crate::state::Shell;
use std::process;

pub fn handle_chprompt(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    shell.set_prompt_name(command.arg(1));
    Ok(Flow::Continue)
}

pub fn handle_showpid(shell: &mut Shell, _command: &Command) -> Result<Flow, ShellError> {
    commons::emit(shell, format!(t!("showpid.message"), pid = process::id()))?;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use crate::cli::dispatcher::dispatch;
    use crate::state::test_support::Harness;

    #[test]
    fn test_chprompt_sets_and_resets() {
        let mut harness = Harness::new();
        dispatch("chprompt dev extra", &mut harness.shell);
        assert_eq!(harness.shell.prompt(), "dev> ");
        dispatch("chprompt", &mut harness.shell);
        assert_eq!(harness.shell.prompt(), "smash> ");
    }
}
