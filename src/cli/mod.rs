// src/cli/mod.rs

use clap::Parser;

pub mod dispatcher;
pub mod handlers;

/// smash: a small interactive shell with job control, pipes and redirection.
#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
pub struct Cli {
    /// Configuration file to load instead of the default one.
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    pub config: Option<String>,

    /// Prompt name to start with (shown as `<NAME>> `).
    #[arg(long, value_name = "NAME")]
    pub prompt: Option<String>,

    /// Ignore every configuration file and use built-in defaults.
    #[arg(long)]
    pub no_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["smash", "--config", "~/s.toml", "--prompt", "dev"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("~/s.toml"));
        assert_eq!(cli.prompt.as_deref(), Some("dev"));
        assert!(!cli.no_config);

        assert!(Cli::try_parse_from(["smash", "--config", "a", "--no-config"]).is_err());
        assert!(Cli::try_parse_from(["smash", "stray"]).is_err());
    }
}
