// src/core/command.rs

//! Turns a resolved command line into a [`Command`].

use crate::core::arg_parser::{self, find_outside_quotes, trim};
use crate::models::{Builtin, Command, CommandKind, PipeChannel, RedirectMode};

/// Parses a resolved (alias-expanded) line. Returns `None` when nothing is left
/// to run once whitespace and the background marker are stripped.
pub fn parse(line: &str) -> Option<Command> {
    let trimmed = trim(line);
    if trimmed.is_empty() {
        return None;
    }

    let background = arg_parser::is_background(trimmed);
    let text = arg_parser::strip_background(trimmed).to_string();
    let args = arg_parser::split_words(&text);
    if args.is_empty() {
        return None;
    }

    let kind = classify(&text, &args);
    log::debug!("Parsed '{}' as {:?} (background: {})", text, kind, background);

    Some(Command {
        text,
        args,
        background,
        kind,
    })
}

/// Pipes bind loosest, then redirection, then the builtin table.
pub fn classify(text: &str, args: &[String]) -> CommandKind {
    if let Some(bar) = find_outside_quotes(text, "|") {
        let (left, rest) = text.split_at(bar);
        let rest = rest.strip_prefix('|').unwrap_or(rest);
        let (channel, right) = match rest.strip_prefix('&') {
            Some(right) => (PipeChannel::Stderr, right),
            None => (PipeChannel::Stdout, rest),
        };
        return CommandKind::Pipe {
            left: trim(left).to_string(),
            right: trim(right).to_string(),
            channel,
        };
    }

    let redirection = find_outside_quotes(text, ">>")
        .map(|at| (at, ">>", RedirectMode::Append))
        .or_else(|| find_outside_quotes(text, ">").map(|at| (at, ">", RedirectMode::Truncate)));
    if let Some((at, operator, mode)) = redirection {
        let (command, rest) = text.split_at(at);
        let target = rest.strip_prefix(operator).unwrap_or(rest);
        return CommandKind::Redirection {
            command: trim(command).to_string(),
            target: trim(target).to_string(),
            mode,
        };
    }

    match args.first().and_then(|name| Builtin::from_name(name)) {
        Some(builtin) => CommandKind::Builtin(builtin),
        None => CommandKind::External,
    }
}
