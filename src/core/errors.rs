// src/core/errors.rs

use crate::system::executor::LaunchError;
use thiserror::Error;

/// Every failure a single command can produce.
///
/// The dispatcher catches these at the command boundary and prints them as
/// `smash error: <message>`. None of them end the read loop.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("{command}: {detail}")]
    Parse {
        command: &'static str,
        detail: String,
    },
    #[error("{command}: {detail}")]
    Argument {
        command: &'static str,
        detail: String,
    },
    #[error("{command}: {detail}")]
    Lookup {
        command: &'static str,
        detail: String,
    },
    #[error("{context} failed: {source}")]
    Syscall {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("jobs: cannot track more than {0} jobs")]
    JobLimit(usize),
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

impl ShellError {
    pub fn parse(command: &'static str, detail: impl Into<String>) -> Self {
        Self::Parse {
            command,
            detail: detail.into(),
        }
    }

    /// The usual `<command>: invalid arguments` rejection.
    pub fn invalid_arguments(command: &'static str) -> Self {
        Self::argument(command, "invalid arguments")
    }

    pub fn argument(command: &'static str, detail: impl Into<String>) -> Self {
        Self::Argument {
            command,
            detail: detail.into(),
        }
    }

    pub fn lookup(command: &'static str, detail: impl Into<String>) -> Self {
        Self::Lookup {
            command,
            detail: detail.into(),
        }
    }

    pub fn syscall(context: &'static str, source: impl Into<std::io::Error>) -> Self {
        Self::Syscall {
            context,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;

    #[test]
    fn test_messages_carry_command_context() {
        assert_eq!(
            ShellError::invalid_arguments("fg").to_string(),
            "fg: invalid arguments"
        );
        assert_eq!(
            ShellError::lookup("kill", "job-id 4 does not exist").to_string(),
            "kill: job-id 4 does not exist"
        );
    }

    #[test]
    fn test_syscall_wraps_errno() {
        let err = ShellError::syscall("chdir", Errno::ENOENT);
        assert!(err.to_string().starts_with("chdir failed: "));
    }
}
