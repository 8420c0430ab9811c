//! Configuration schema for another-elm-init
//!
//! Configuration is stored at `~/.config/another-elm/init.toml`

use crate::cache::{default_packages, PackageRef};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path overrides
    pub paths: PathsConfig,

    /// Packages to customise; the built-in list when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<PackageRef>>,
}

impl Config {
    /// Config with the built-in package list spelled out
    pub fn with_default_packages() -> Self {
        Self {
            packages: Some(default_packages()),
            ..Self::default()
        }
    }

    /// Effective package list
    pub fn packages(&self) -> Vec<PackageRef> {
        self.packages.clone().unwrap_or_else(default_packages)
    }
}

/// Directory overrides. Unset entries fall back to the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Where the `another-elm` executable is installed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    /// Base of per-user data (`$XDG_DATA_HOME`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Elm home holding installed compiler versions (`$ELM_HOME`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elm_home: Option<PathBuf>,

    /// another-elm checkout holding the template and package sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,
}
