// src/core/paths.rs

use crate::constants::{CONFIG_FILENAME, SMASH_CONFIG_DIR};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not expand path '{path}': {reason}")]
    Expansion { path: String, reason: String },
}

/// Returns the smash configuration directory (`~/.config/smash` on Linux).
/// The directory is not created; a missing directory simply means defaults.
pub fn get_smash_config_dir() -> Result<PathBuf, PathError> {
    dirs::config_dir()
        .map(|dir| dir.join(SMASH_CONFIG_DIR))
        .ok_or(PathError::ConfigDirNotFound)
}

/// Returns the path of the default `config.toml`.
pub fn get_config_file_path() -> Result<PathBuf, PathError> {
    get_smash_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Expands `~` and environment variables (`$VAR`, `${VAR}`) in a user-supplied path.
pub fn expand_user_path(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        path: template.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Resolves `target` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base.join(target)
    }
}
