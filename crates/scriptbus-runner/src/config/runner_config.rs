use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::paths::ProjectPaths;
use crate::host::ScriptConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found")]
    NotFound,
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("IO error on config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings for the `scriptbus` runner, read from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Pause between loop iterations
    #[serde(default = "default_loop_interval_ms")]
    pub loop_interval_ms: u64,

    /// Also write logs to `<data_dir>/logs`
    #[serde(default)]
    pub file_logging: bool,

    #[serde(default)]
    pub script: ScriptOverrides,
}

fn default_loop_interval_ms() -> u64 {
    100
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            loop_interval_ms: default_loop_interval_ms(),
            file_logging: false,
            script: ScriptOverrides::default(),
        }
    }
}

/// Forces the host switches regardless of what the script asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_handler_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_handler_enabled: Option<bool>,
}

impl ScriptOverrides {
    pub fn apply(&self, config: &mut ScriptConfig) {
        if let Some(enabled) = self.login_handler_enabled {
            config.login_handler_enabled = enabled;
        }
        if let Some(enabled) = self.break_handler_enabled {
            config.break_handler_enabled = enabled;
        }
    }
}

impl RunnerConfig {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let proj_paths = ProjectPaths::new("scriptbus").ok_or(ConfigError::NoConfigDir)?;
        Ok(proj_paths.config_dir().join("config.toml"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound);
        }

        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn loop_interval(&self) -> Duration {
        Duration::from_millis(self.loop_interval_ms)
    }
}
