use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{AppConfig, ConfigError};

const CONFIG_DIR: &str = "optin-modal";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Loads the config from the default location, falling back to defaults
/// when there is no config directory or no file.
pub fn load() -> Result<AppConfig, ConfigError> {
    let Some(path) = config_path() else {
        debug!("No config directory found, using defaults");
        return Ok(AppConfig::default());
    };
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        debug!("Config file not found at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded config from {:?}", path);
    Ok(config)
}
