pub mod actions;
mod defaults;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod modal;
pub mod resolver;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::{load, load_from};
pub use modal::{ElementIds, ModalConfig, TimingConfig};
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub modal: ModalConfig,
}
