//! # Config Loader
//!
//! Reads the optional `config.toml` into a [`ShellConfig`]. An explicit path
//! (from `--config`) must exist; the default location is allowed to be absent.

use crate::core::paths::{self, PathError};
use crate::models::ShellConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Configuration file '{0}' does not exist.")]
    NotFound(PathBuf),
    #[error("Could not read configuration file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("'max_jobs' must be at least 1.")]
    NoJobSlots,
}

/// Loads the configuration from `explicit` if given, else from the default location.
pub fn load_config(explicit: Option<&str>) -> Result<ShellConfig, ConfigError> {
    let config = match explicit {
        Some(template) => {
            let path = paths::expand_user_path(template)?;
            if !path.is_file() {
                return Err(ConfigError::NotFound(path));
            }
            load_from_file(&path)?
        }
        None => {
            let path = paths::get_config_file_path()?;
            if path.is_file() {
                load_from_file(&path)?
            } else {
                log::debug!("No configuration at '{}', using defaults", path.display());
                ShellConfig::default()
            }
        }
    };
    validate(&config)?;
    Ok(config)
}

/// Reads and parses one configuration file.
pub fn load_from_file(path: &Path) -> Result<ShellConfig, ConfigError> {
    log::debug!("Loading configuration from '{}'", path.display());
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn validate(config: &ShellConfig) -> Result<(), ConfigError> {
    if config.max_jobs == 0 {
        return Err(ConfigError::NoJobSlots);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_explicit_file() {
        // --- Setup ---
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "prompt = \"dev\"\nmax_jobs = 5\n\n[aliases]\nll = \"ls -la\""
        )
        .unwrap();
        file.flush().unwrap();

        // --- Execute ---
        let config = load_config(file.path().to_str()).unwrap();

        // --- Assert ---
        assert_eq!(config.prompt, "dev");
        assert_eq!(config.max_jobs, 5);
        assert_eq!(config.aliases.get("ll").map(String::as_str), Some("ls -la"));
        assert_eq!(config.poll_interval_ms, ShellConfig::default().poll_interval_ms);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_config(Some("/definitely/not/here/smash.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "prompt = [").unwrap();
        file.flush().unwrap();

        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_job_slots_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_jobs = 0").unwrap();
        file.flush().unwrap();

        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::NoJobSlots));
    }
}
