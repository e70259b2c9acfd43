//! Reading and writing the launcher's TOML configuration
//!
//! The configuration is a single `config.toml` under the user's config
//! directory. A missing file is not an error; the launcher then runs
//! on the built-in defaults.

use crate::config::LaunchConfig;
use crate::error::{ConfigError, LaunchError};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory the configuration file lives in
///
/// `$VAULTUP_CONFIG_DIR` wins when set (tests point it at scratch
/// directories), otherwise `~/.config/vaultup`.
pub fn get_config_dir() -> Result<PathBuf, LaunchError> {
    if let Some(dir) = std::env::var_os("VAULTUP_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }

    let home = std::env::var_os("HOME").ok_or_else(|| {
        LaunchError::Config(ConfigError::Io {
            message: "HOME is not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("vaultup"))
}

/// Full path of the configuration file
pub fn get_config_path() -> Result<PathBuf, LaunchError> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the configuration file from its default location
pub fn load_config() -> Result<LaunchConfig, LaunchError> {
    load_config_from_path(get_config_path()?)
}

/// Load the configuration file, or fall back to the defaults when
/// there is none
pub fn load_or_default() -> Result<LaunchConfig, LaunchError> {
    let path = get_config_path()?;
    if path.exists() {
        load_config_from_path(path)
    } else {
        debug!("No configuration file at {}, using defaults", path.display());
        Ok(LaunchConfig::default())
    }
}

/// Load and validate a configuration file at `path`
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<LaunchConfig, LaunchError> {
    let raw = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::ReadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        },
        _ => ConfigError::Io {
            message: format!("could not read {}: {}", path.as_ref().display(), e),
        },
    })?;

    let config: LaunchConfig = toml::from_str(&raw).map_err(ConfigError::Toml)?;

    config
        .validate()
        .map_err(|message| ConfigError::Invalid { message })?;

    Ok(config)
}

/// Save the configuration to its default location
pub fn save_config(config: &LaunchConfig) -> Result<(), LaunchError> {
    save_config_to_path(config, get_config_path()?)
}

/// Validate and write the configuration to `path`
///
/// The parent directory is created when missing. Nothing is written
/// for a configuration that would not load back.
pub fn save_config_to_path<P: AsRef<Path>>(
    config: &LaunchConfig,
    path: P,
) -> Result<(), LaunchError> {
    config
        .validate()
        .map_err(|message| ConfigError::Invalid { message })?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
            message: format!("could not create {}: {}", parent.display(), e),
        })?;
    }

    let rendered = toml::to_string_pretty(config).map_err(ConfigError::TomlSerialize)?;

    std::fs::write(&path, rendered).map_err(|_| ConfigError::WriteFailed {
        path: path.as_ref().to_string_lossy().to_string(),
    })?;

    Ok(())
}
