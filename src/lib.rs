//! `smash`: a small interactive shell with job control.
//!
//! The library exposes the whole engine so the binary stays a thin read loop
//! and tests can build isolated [`state::Shell`] contexts.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Flag raised by the interrupt handler and polled by the foreground wait loop.
pub type CancellationToken = Arc<AtomicBool>;

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod state;
pub mod system;
