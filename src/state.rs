// src/state.rs

use crate::CancellationToken;
use crate::constants::{DEFAULT_PROMPT, PROMPT_SUFFIX};
use crate::core::aliases::AliasTable;
use crate::core::errors::ShellError;
use crate::core::foreground::ForegroundController;
use crate::core::jobs::JobTable;
use crate::core::paths;
use crate::models::ShellConfig;
use crate::system::environment::Environment;
use crate::system::executor::LaunchContext;
use crate::system::plumbing::{StreamSlot, StreamTarget, Streams};
use std::env;
use std::mem;
use std::path::{Path, PathBuf};

/// The whole mutable state of one shell session.
///
/// Built once at startup and passed by `&mut` to everything that runs a
/// command. Tests build as many isolated instances as they need.
#[derive(Debug)]
pub struct Shell {
    pub config: ShellConfig,
    pub jobs: JobTable,
    pub foreground: ForegroundController,
    pub aliases: AliasTable,
    pub env: Environment,
    pub streams: Streams,
    prompt_name: String,
    cwd: PathBuf,
    previous_dir: Option<PathBuf>,
}

impl Shell {
    /// Creates a session rooted at the process working directory and
    /// registers the aliases from `config`.
    pub fn new(config: ShellConfig, interrupt: CancellationToken) -> Result<Self, ShellError> {
        let cwd = env::current_dir().map_err(|e| ShellError::syscall("getcwd", e))?;
        Self::with_cwd(config, interrupt, cwd)
    }

    pub fn with_cwd(
        config: ShellConfig,
        interrupt: CancellationToken,
        cwd: PathBuf,
    ) -> Result<Self, ShellError> {
        let mut aliases = AliasTable::new();
        for (name, body) in &config.aliases {
            aliases.define(name, body)?;
        }

        Ok(Self {
            jobs: JobTable::new(config.max_jobs),
            foreground: ForegroundController::new(interrupt, config.poll_interval()),
            aliases,
            env: Environment::from_process(),
            streams: Streams::default(),
            prompt_name: config.prompt.clone(),
            cwd,
            previous_dir: None,
            config,
        })
    }

    // --- Prompt ---

    /// The full prompt, e.g. `smash> `.
    pub fn prompt(&self) -> String {
        format!("{}{}", self.prompt_name, PROMPT_SUFFIX)
    }

    /// Sets the prompt name; `None` restores the default.
    pub fn set_prompt_name(&mut self, name: Option<&str>) {
        self.prompt_name = name.unwrap_or(DEFAULT_PROMPT).to_string();
    }

    // --- Working directory ---

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn previous_dir(&self) -> Option<&Path> {
        self.previous_dir.as_deref()
    }

    /// Changes the tracked working directory. The new directory is canonicalized,
    /// so it must exist; on success the old one becomes the previous directory.
    pub fn change_dir(&mut self, target: &str) -> Result<(), ShellError> {
        let candidate = self.resolve_path(target);
        let canonical =
            dunce::canonicalize(&candidate).map_err(|e| ShellError::syscall("chdir", e))?;
        if !canonical.is_dir() {
            return Err(ShellError::syscall(
                "chdir",
                nix::errno::Errno::ENOTDIR,
            ));
        }
        log::debug!("cd: '{}' -> '{}'", self.cwd.display(), canonical.display());
        self.previous_dir = Some(mem::replace(&mut self.cwd, canonical));
        self.env.set("PWD", self.cwd.as_os_str());
        Ok(())
    }

    /// Resolves a user path against the tracked working directory.
    pub fn resolve_path(&self, target: &str) -> PathBuf {
        paths::resolve_against(&self.cwd, target)
    }

    // --- Children and streams ---

    pub fn launch_context(&self) -> LaunchContext<'_> {
        LaunchContext {
            interpreter: &self.config.glob_interpreter,
            cwd: &self.cwd,
            env: &self.env,
        }
    }

    /// Runs `body` with one standard stream replaced by `target`.
    ///
    /// The previous target is restored on every exit path, and the replacement
    /// (a redirection file or pipe end) is closed when it is swapped back out.
    pub fn with_stream<R>(
        &mut self,
        slot: StreamSlot,
        target: StreamTarget,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = mem::replace(self.streams.slot_mut(slot), target);
        let mut guard = scopeguard::guard((self, saved), move |(shell, saved)| {
            *shell.streams.slot_mut(slot) = saved;
        });
        body(&mut *guard.0)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! An isolated shell whose stdout and stderr go to temporary files.

    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use tempfile::{NamedTempFile, TempDir, tempdir};

    pub(crate) struct Harness {
        pub(crate) shell: Shell,
        pub(crate) dir: TempDir,
        pub(crate) token: CancellationToken,
        out: NamedTempFile,
        err: NamedTempFile,
    }

    impl Harness {
        pub(crate) fn new() -> Self {
            Self::with_config(ShellConfig::default())
        }

        pub(crate) fn with_config(mut config: ShellConfig) -> Self {
            config.glob_interpreter = PathBuf::from("/bin/sh");
            config.poll_interval_ms = 5;
            let dir = tempdir().unwrap();
            let token: CancellationToken = Arc::new(AtomicBool::new(false));
            let mut shell = Shell::with_cwd(
                config,
                Arc::clone(&token),
                dunce::canonicalize(dir.path()).unwrap(),
            )
            .unwrap();

            let out = NamedTempFile::new().unwrap();
            let err = NamedTempFile::new().unwrap();
            shell.streams.stdout = StreamTarget::File(out.as_file().try_clone().unwrap());
            shell.streams.stderr = StreamTarget::File(err.as_file().try_clone().unwrap());

            Self {
                shell,
                dir,
                token,
                out,
                err,
            }
        }

        pub(crate) fn stdout(&self) -> String {
            fs::read_to_string(self.out.path()).unwrap()
        }

        pub(crate) fn stderr(&self) -> String {
            fs::read_to_string(self.err.path()).unwrap()
        }

        pub(crate) fn read(&self, name: &str) -> String {
            fs::read_to_string(self.dir.path().join(name)).unwrap()
        }
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            let pids: Vec<_> = self
                .shell
                .jobs
                .iter()
                .flat_map(|job| job.pids().collect::<Vec<_>>())
                .collect();
            self.shell.jobs.kill_all();
            for pid in pids {
                crate::system::executor::reap(pid);
            }
        }
    }
}
