// src/system/signals.rs

use crate::CancellationToken;
use signal_hook::consts::SIGINT;
use signal_hook::SigId;
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// Installs the SIGINT handler. The handler only stores `true` into `token`;
/// all job bookkeeping happens in the read loop.
pub fn install_interrupt_handler(token: &CancellationToken) -> io::Result<SigId> {
    let id = signal_hook::flag::register(SIGINT, Arc::clone(token))?;
    log::debug!("SIGINT handler installed");
    Ok(id)
}

/// Consumes a pending interrupt. Returns whether one was pending.
pub fn take_interrupt(token: &CancellationToken) -> bool {
    token.swap(false, Ordering::SeqCst)
}
