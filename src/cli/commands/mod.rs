//! CLI command implementations

pub mod config;
pub mod install;
pub mod status;

pub use config::execute as config;
pub use install::execute as install;
pub use status::execute as status;

use crate::config::{Config, Environment, PathsConfig, ResolvedPaths};
use crate::error::InitResult;

/// Resolve paths for a command: flags, then the config file, then the environment
fn resolve_paths(flags: &PathsConfig, config: &Config) -> InitResult<ResolvedPaths> {
    let env = Environment::from_process()?;
    ResolvedPaths::resolve(flags, &config.paths, &env)
}
