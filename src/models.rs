// src/models.rs

use crate::constants::{
    DEFAULT_GLOB_INTERPRETER, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PROMPT, MAX_JOBS,
};
use nix::unistd::Pid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Small positive integer identifying a tracked job.
pub type JobId = usize;

// --- JOB MODELS ---

/// A tracked external process (or pipeline) with a shell-assigned job id.
///
/// The same record type backs both the job table and the foreground slot, so a
/// job moves between the two by value and keeps its id and display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job_id: JobId,
    /// Process shown to the user and targeted by `kill`. It is also the
    /// process group leader for the whole job.
    pub pid: Pid,
    /// Remaining members of a pipeline, reaped together with the leader.
    pub followers: Vec<Pid>,
    /// The command line that was actually executed (alias-expanded).
    pub command_text: String,
    /// The text shown by `jobs`, `fg` and `quit kill`.
    pub display_text: String,
    pub stopped: bool,
    pub insertion_time: SystemTime,
}

impl JobRecord {
    pub fn new(job_id: JobId, pid: Pid, command_text: impl Into<String>) -> Self {
        let command_text = command_text.into();
        Self {
            job_id,
            pid,
            followers: Vec::new(),
            display_text: command_text.clone(),
            command_text,
            stopped: false,
            insertion_time: SystemTime::now(),
        }
    }

    /// Overrides the printable text. An empty string keeps the command text.
    pub fn with_display_text(mut self, display_text: impl Into<String>) -> Self {
        let display_text = display_text.into();
        if !display_text.is_empty() {
            self.display_text = display_text;
        }
        self
    }

    pub fn with_followers(mut self, followers: Vec<Pid>) -> Self {
        self.followers = followers;
        self
    }

    pub fn with_stopped(mut self, stopped: bool) -> Self {
        self.stopped = stopped;
        self
    }

    /// Every process that belongs to this job, leader first.
    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        iter::once(self.pid).chain(self.followers.iter().copied())
    }

    pub fn contains_pid(&self, pid: Pid) -> bool {
        self.pids().any(|p| p == pid)
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stopped {
            write!(
                f,
                t!("jobs.entry_stopped"),
                id = self.job_id,
                text = self.display_text
            )
        } else {
            write!(f, t!("jobs.entry"), id = self.job_id, text = self.display_text)
        }
    }
}

// --- COMMAND MODELS ---

/// The fixed table of commands the shell executes in-process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Chprompt,
    Showpid,
    Pwd,
    Cd,
    Jobs,
    Fg,
    Quit,
    Kill,
    Alias,
    Unalias,
    Unsetenv,
    Watchproc,
    Du,
    Whoami,
    Netinfo,
}

/// Dispatch keys, matched exactly against the first word of a command line.
static BUILTIN_TABLE: &[(&str, Builtin)] = &[
    ("chprompt", Builtin::Chprompt),
    ("showpid", Builtin::Showpid),
    ("pwd", Builtin::Pwd),
    ("cd", Builtin::Cd),
    ("jobs", Builtin::Jobs),
    ("fg", Builtin::Fg),
    ("quit", Builtin::Quit),
    ("kill", Builtin::Kill),
    ("alias", Builtin::Alias),
    ("unalias", Builtin::Unalias),
    ("unsetenv", Builtin::Unsetenv),
    ("watchproc", Builtin::Watchproc),
    ("du", Builtin::Du),
    ("whoami", Builtin::Whoami),
    ("netinfo", Builtin::Netinfo),
];

impl Builtin {
    /// Looks a builtin up by its exact, case-sensitive name.
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTIN_TABLE
            .iter()
            .find(|(builtin_name, _)| *builtin_name == name)
            .map(|(_, builtin)| *builtin)
    }

    pub fn name(self) -> &'static str {
        BUILTIN_TABLE
            .iter()
            .find(|(_, builtin)| *builtin == self)
            .map_or("", |(name, _)| name)
    }

    /// Builtin names cannot be used as alias names.
    pub fn is_reserved(word: &str) -> bool {
        Self::from_name(word).is_some()
    }
}

/// Which stream of the left side of a pipe feeds the right side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeChannel {
    /// `|`
    Stdout,
    /// `|&`
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>`
    Truncate,
    /// `>>`
    Append,
}

/// The classified shape of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Builtin(Builtin),
    External,
    Pipe {
        left: String,
        right: String,
        channel: PipeChannel,
    },
    Redirection {
        command: String,
        target: String,
        mode: RedirectMode,
    },
}

/// One parsed command line. Built per dispatch and dropped once it has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The command line without its background marker.
    pub text: String,
    /// Whitespace-separated words of `text`.
    pub args: Vec<String>,
    pub background: bool,
    pub kind: CommandKind,
}

impl Command {
    /// Argument `index` (0 is the command name), if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Number of words including the command name.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

/// What the read loop should do after a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

// --- CONFIGURATION MODELS ---

/// Represents the deserialized structure of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt name; the shell displays it followed by `"> "`.
    pub prompt: String,
    /// Interpreter for command lines containing `*` or `?`.
    pub glob_interpreter: PathBuf,
    /// Highest job id that may be allocated.
    pub max_jobs: usize,
    /// Poll interval of the foreground wait loop, in milliseconds.
    pub poll_interval_ms: u64,
    /// Aliases registered at startup, as if defined with `alias`.
    pub aliases: BTreeMap<String, String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            glob_interpreter: PathBuf::from(DEFAULT_GLOB_INTERPRETER),
            max_jobs: MAX_JOBS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            aliases: BTreeMap::new(),
        }
    }
}

impl ShellConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
