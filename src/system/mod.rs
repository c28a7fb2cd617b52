//! # System Interaction Layer
//!
//! This module holds everything that talks to the operating system directly.
//!
//! ## Modules
//!
//! - **`executor`**: spawns children into process groups, polls them with
//!   non-blocking `waitpid`, and delivers signals to single processes or jobs.
//! - **`plumbing`**: the shell's standard-stream targets, close-on-exec pipes,
//!   and redirection files.
//! - **`signals`**: the SIGINT bridge that raises the interrupt flag.
//! - **`environment`**: the shell-owned environment passed to every child.

pub mod environment;
pub mod executor;
pub mod plumbing;
pub mod signals;
