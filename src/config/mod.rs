//! Configuration management for another-elm-init

pub mod paths;
pub mod schema;

pub use paths::{Environment, ResolvedPaths};
pub use schema::{Config, PathsConfig};

use crate::error::{InitError, InitResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Config manager for an optional `--config` override
    pub fn from_override(path: Option<PathBuf>) -> Self {
        path.map(Self::with_path).unwrap_or_default()
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("another-elm")
            .join("init.toml")
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub async fn load(&self) -> InitResult<Config> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            debug!(
                "Config file {} not found, using defaults",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> InitResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| InitError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| InitError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> InitResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            InitError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> InitResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| InitError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
