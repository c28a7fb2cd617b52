// src/cli/handlers/mod.rs

// One module per builtin family. Every handler has the signature
// `fn(&mut Shell, &Command) -> Result<Flow, ShellError>`.

pub mod alias;
pub mod cd;
pub mod commons;
pub mod env;
pub mod fg;
pub mod jobs;
pub mod kill;
pub mod prompt;
pub mod quit;
pub mod sysinfo;
