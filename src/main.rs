//! another-elm-init - install another-elm from a local checkout
//!
//! CLI entry point that dispatches to subcommands.

use another_elm_init::cli::{Cli, Commands};
use another_elm_init::config::ConfigManager;
use another_elm_init::error::InitResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> InitResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("another_elm_init=warn"),
        1 => EnvFilter::new("another_elm_init=info"),
        _ => EnvFilter::new("another_elm_init=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let manager = ConfigManager::from_override(cli.config);
    debug!("Using config {}", manager.path().display());

    // Config command loads lazily so a broken file can still be replaced
    if let Commands::Config(args) = cli.command {
        return another_elm_init::cli::commands::config(args, &manager).await;
    }
    let config = manager.load().await?;

    match cli.command {
        Commands::Install(args) => another_elm_init::cli::commands::install(args, &config).await,
        Commands::Status(args) => another_elm_init::cli::commands::status(args, &config).await,
        Commands::Config(_) => unreachable!("Config handled above"),
    }
}
