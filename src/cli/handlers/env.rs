// src/cli/handlers/env.rs

use crate::core::errors::ShellError;
use crate::models::{Command, Flow};
use crate::state::Shell;

/// `unsetenv <name>...`: later children no longer inherit the removed names.
pub fn handle_unsetenv(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    let names = command.args.get(1..).unwrap_or_default();
    if names.is_empty() {
        return Err(ShellError::argument("unsetenv", "not enough arguments"));
    }
    for name in names {
        if !shell.env.unset(name) {
            return Err(ShellError::lookup("unsetenv", format!("{name} does not exist")));
        }
        log::debug!("unsetenv: removed '{}'", name);
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use crate::cli::dispatcher::dispatch;
    use crate::state::test_support::Harness;

    #[test]
    fn test_unsetenv_hides_variable_from_children() {
        let mut harness = Harness::new();
        harness.shell.env.set("SMASH_PROBE", "visible");
        harness.shell.env.set("SMASH_OTHER", "kept");

        dispatch("printenv SMASH_PROBE", &mut harness.shell);
        dispatch("unsetenv SMASH_PROBE", &mut harness.shell);
        dispatch("printenv SMASH_PROBE", &mut harness.shell);

        assert_eq!(harness.stdout(), "visible\n");
        assert!(!harness.shell.env.exists("SMASH_PROBE"));
        assert!(harness.shell.env.exists("SMASH_OTHER"));
    }

    #[test]
    fn test_unsetenv_errors() {
        let mut harness = Harness::new();
        harness.shell.env.set("SMASH_A", "1");
        harness.shell.env.set("SMASH_C", "3");

        dispatch("unsetenv", &mut harness.shell);
        dispatch("unsetenv SMASH_A SMASH_B SMASH_C", &mut harness.shell);

        assert_eq!(
            harness.stderr(),
            "smash error: unsetenv: not enough arguments\n\
             smash error: unsetenv: SMASH_B does not exist\n"
        );
        assert!(!harness.shell.env.exists("SMASH_A"));
        assert!(harness.shell.env.exists("SMASH_C"));
    }
}
