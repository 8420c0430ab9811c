//! Resolution of the directories an install touches
//!
//! Each path is taken from the command line first, then the config file, then
//! the environment.

use crate::cache::lock::LOCK_FILE;
use crate::cache::stamp::STAMP_FILE;
use crate::config::schema::PathsConfig;
use crate::error::{InitError, InitResult};
use crate::install::template::EXECUTABLE_NAME;
use serde::Serialize;
use std::env;
use std::path::PathBuf;

/// Application directory under the data dir
const APP_DIR: &str = "another-elm";

/// Customised packages root under the application directory
const PACKAGES_DIR: &str = "packages";

/// Per-compiler-version registry base under the Elm home
const REGISTRY_DIR: &str = "another";

/// Process environment the defaults are derived from
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub home: Option<PathBuf>,
    pub cwd: PathBuf,
    pub xdg_data_home: Option<PathBuf>,
    pub elm_home: Option<PathBuf>,
}

impl Environment {
    /// Snapshot of the current process
    pub fn from_process() -> InitResult<Self> {
        let cwd = env::current_dir()
            .map_err(|e| InitError::io("reading current directory", e))?;
        Ok(Self {
            home: dirs::home_dir(),
            cwd,
            xdg_data_home: non_empty_var("XDG_DATA_HOME"),
            elm_home: non_empty_var("ELM_HOME"),
        })
    }

    fn home_join(&self, rel: &[&str]) -> InitResult<PathBuf> {
        let home = self.home.as_ref().ok_or(InitError::HomeDirUnavailable)?;
        Ok(rel.iter().fold(home.clone(), |acc, part| acc.join(part)))
    }
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Fully resolved, absolute directories for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    /// Directory the executable is installed into
    pub install_dir: PathBuf,
    /// `<data base>/another-elm`
    pub data_dir: PathBuf,
    /// Elm home holding installed compiler versions
    pub elm_home: PathBuf,
    /// another-elm checkout
    pub source_dir: PathBuf,
}

impl ResolvedPaths {
    /// Merge `flags` over `file` over the environment defaults
    pub fn resolve(flags: &PathsConfig, file: &PathsConfig, env: &Environment) -> InitResult<Self> {
        let pick = |flag: &Option<PathBuf>, from_file: &Option<PathBuf>| {
            flag.clone().or_else(|| from_file.clone())
        };
        let absolute = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                env.cwd.join(path)
            }
        };

        let install_dir = match pick(&flags.install_dir, &file.install_dir) {
            Some(dir) => dir,
            None => env.home_join(&[".local", "bin"])?,
        };
        let data_base = match pick(&flags.data_dir, &file.data_dir).or_else(|| env.xdg_data_home.clone()) {
            Some(dir) => dir,
            None => env.home_join(&[".local", "share"])?,
        };
        let elm_home = match pick(&flags.elm_home, &file.elm_home).or_else(|| env.elm_home.clone()) {
            Some(dir) => dir,
            None => env.home_join(&[".elm"])?,
        };
        let source_dir = pick(&flags.source_dir, &file.source_dir).unwrap_or_else(|| env.cwd.clone());

        Ok(Self {
            install_dir: absolute(install_dir),
            data_dir: absolute(data_base).join(APP_DIR),
            elm_home: absolute(elm_home),
            source_dir: absolute(source_dir),
        })
    }

    /// Installed `another-elm` executable
    pub fn executable(&self) -> PathBuf {
        self.install_dir.join(EXECUTABLE_NAME)
    }

    /// Executable template in the checkout
    pub fn template(&self) -> PathBuf {
        self.source_dir.join(EXECUTABLE_NAME)
    }

    /// Customised packages root
    pub fn cache_root(&self) -> PathBuf {
        self.data_dir.join(PACKAGES_DIR)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILE)
    }

    pub fn stamp_file(&self) -> PathBuf {
        self.cache_root().join(STAMP_FILE)
    }

    /// Directory listing installed compiler versions
    pub fn registry_base(&self) -> PathBuf {
        self.elm_home.join(REGISTRY_DIR)
    }
}
