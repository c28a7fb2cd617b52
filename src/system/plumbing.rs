// src/system/plumbing.rs

//! Standard-stream targets for builtins and children, OS pipes, and
//! redirection files.

use crate::models::RedirectMode;
use crate::system::executor::{ChildStdio, LaunchError};
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::process::Stdio;

/// Where one standard stream of the shell currently points.
#[derive(Debug)]
pub enum StreamTarget {
    Stdin,
    Stdout,
    Stderr,
    /// A redirection file or one end of a pipe.
    File(File),
}

impl StreamTarget {
    /// A `Stdio` for a child: inherited for the terminal streams, a duplicate otherwise.
    pub fn stdio(&self) -> io::Result<Stdio> {
        match self {
            Self::Stdin | Self::Stdout | Self::Stderr => Ok(Stdio::inherit()),
            Self::File(file) => file.try_clone().map(Stdio::from),
        }
    }
}

impl Write for StreamTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout => io::stdout().write(buf),
            Self::Stderr => io::stderr().write(buf),
            Self::File(file) => file.write(buf),
            Self::Stdin => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "standard input is not writable",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().flush(),
            Self::Stderr => io::stderr().flush(),
            Self::File(file) => file.flush(),
            Self::Stdin => Ok(()),
        }
    }
}

/// Selects one of the three standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSlot {
    Stdin,
    Stdout,
    Stderr,
}

/// The shell's current standard streams. Builtins write here and children
/// inherit from here.
#[derive(Debug)]
pub struct Streams {
    pub stdin: StreamTarget,
    pub stdout: StreamTarget,
    pub stderr: StreamTarget,
}

impl Default for Streams {
    fn default() -> Self {
        Self {
            stdin: StreamTarget::Stdin,
            stdout: StreamTarget::Stdout,
            stderr: StreamTarget::Stderr,
        }
    }
}

impl Streams {
    pub fn slot_mut(&mut self, slot: StreamSlot) -> &mut StreamTarget {
        match slot {
            StreamSlot::Stdin => &mut self.stdin,
            StreamSlot::Stdout => &mut self.stdout,
            StreamSlot::Stderr => &mut self.stderr,
        }
    }

    pub fn child_stdio(&self) -> Result<ChildStdio, LaunchError> {
        Ok(ChildStdio {
            stdin: self.stdin.stdio().map_err(LaunchError::Dup)?,
            stdout: self.stdout.stdio().map_err(LaunchError::Dup)?,
            stderr: self.stderr.stdio().map_err(LaunchError::Dup)?,
        })
    }
}

/// A close-on-exec pipe as `(read end, write end)`.
///
/// Only the explicit stdio duplicates reach a child, so no child holds a
/// stray write end that would keep the reader from seeing end-of-file.
pub fn os_pipe() -> io::Result<(File, File)> {
    let (reader, writer) = pipe2(OFlag::O_CLOEXEC)?;
    Ok((File::from(reader), File::from(writer)))
}

/// Opens a redirection target: created with mode 0666 (before umask),
/// truncated or appended according to `mode`.
pub fn open_redirect(path: &Path, mode: RedirectMode) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).mode(0o666);
    match mode {
        RedirectMode::Truncate => options.truncate(true),
        RedirectMode::Append => options.append(true),
    };
    options.open(path)
}
