//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// another-elm-init - install another-elm from a local checkout
///
/// Keeps the customised std packages in sync with the checkout and writes
/// the `another-elm` executable.
#[derive(Parser, Debug)]
#[command(name = "another-elm-init")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ANOTHER_ELM_INIT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync the std packages and install the another-elm executable
    Install(InstallArgs),

    /// Show which customised packages are out of date
    Status(StatusArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Directory to install another-elm into (default: ~/.local/bin)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// another-elm checkout (defaults to current directory)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Rebuild every package with a fresh namespace suffix
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// another-elm checkout (defaults to current directory)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for the status command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one package per line)
    Plain,
}
