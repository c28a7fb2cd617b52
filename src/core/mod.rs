// src/core/mod.rs

pub mod aliases;
pub mod arg_parser;
pub mod command;
pub mod config_loader;
pub mod errors;
pub mod foreground;
pub mod jobs;
pub mod paths;
pub mod task_executor;
