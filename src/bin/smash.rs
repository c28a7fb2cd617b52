// src/bin/smash.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use smash::{
    CancellationToken,
    cli::{Cli, dispatcher},
    core::config_loader,
    models::{Flow, ShellConfig},
    state::Shell,
    system::signals,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Sets up logging, parses arguments and runs the read loop. Startup failures
/// are printed once and exit with status 1.
fn main() {
    env_logger::init();
    let interrupt: CancellationToken = Arc::new(AtomicBool::new(false));

    if let Err(e) = run(Cli::parse(), interrupt) {
        eprintln!("{}: {:#}", smash::t!("main.error").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, interrupt: CancellationToken) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let mut config = if cli.no_config {
        ShellConfig::default()
    } else {
        config_loader::load_config(cli.config.as_deref()).context("Could not load configuration")?
    };
    if let Some(prompt) = cli.prompt {
        config.prompt = prompt;
    }

    signals::install_interrupt_handler(&interrupt)
        .context("Could not install the SIGINT handler")?;
    let mut shell = Shell::new(config, interrupt).context("Could not start the shell")?;

    read_loop(&mut shell)
}

/// Prompts, reads one line and dispatches it until `quit` or end of input.
fn read_loop(shell: &mut Shell) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        print!("{}", shell.prompt());
        io::stdout().flush().context("Could not write the prompt")?;

        line.clear();
        let read = match input.read_line(&mut line) {
            Ok(read) => read,
            // SIGINT while blocked in read(2) is retried like any idle interrupt.
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("Could not read from stdin"),
        };
        if read == 0 {
            log::debug!("End of input, leaving the read loop");
            return Ok(());
        }

        if dispatcher::dispatch(&line, shell) == Flow::Exit {
            return Ok(());
        }
    }
}
