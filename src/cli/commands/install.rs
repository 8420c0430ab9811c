//! Install command - sync std packages and write the executable

use super::resolve_paths;
use crate::cli::args::InstallArgs;
use crate::config::{Config, PathsConfig};
use crate::error::InitResult;
use crate::install::{self, InstallOutcome, Phase};
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> InitResult<()> {
    let ctx = UiContext::detect();
    let flags = PathsConfig {
        install_dir: args.dir,
        source_dir: args.source,
        ..Default::default()
    };
    let paths = resolve_paths(&flags, config)?;

    ui::intro(&ctx, "Installing another-elm");

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Checking std packages...");
    let result = install::install(&paths, config.packages(), args.force, |phase| match phase {
        Phase::Syncing => spinner.message("Synchronizing std packages..."),
        Phase::Installing => spinner.message("Writing executable..."),
        Phase::Start | Phase::Done => {}
    })
    .await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            spinner.stop_error("Install failed");
            return Err(e);
        }
    };
    spinner.stop(&sync_summary(&outcome));

    report(&ctx, &outcome);
    Ok(())
}

fn sync_summary(outcome: &InstallOutcome) -> String {
    match outcome.sync.rebuilt.len() {
        0 => "Std packages already up to date".to_string(),
        1 => "Rebuilt 1 std package".to_string(),
        n => format!("Rebuilt {} std packages", n),
    }
}

fn report(ctx: &UiContext, outcome: &InstallOutcome) {
    for package in &outcome.sync.rebuilt {
        ui::step_ok(ctx, &package.to_string());
    }

    if outcome.registry_roots.is_empty() {
        ui::step_warn_hint(
            ctx,
            "No installed compiler versions found",
            "nothing to unpin",
        );
    } else if !outcome.sync.invalidated.is_empty() {
        ui::step_info(
            ctx,
            &format!(
                "Unpinned {} resolved package version(s) across {} compiler version(s)",
                outcome.sync.invalidated.len(),
                outcome.registry_roots.len()
            ),
        );
    }

    ui::key_value(ctx, "version", &outcome.version);
    ui::key_value(ctx, "suffix", outcome.suffix.as_str());
    if !outcome.on_search_path {
        ui::step_warn_hint(
            ctx,
            "Install directory is not in PATH",
            "add it to run another-elm by name",
        );
    }

    ui::note(
        ctx,
        "Note",
        &format!(
            "Moving \"{}\" will break another-elm (run another-elm-init install again to fix)",
            outcome.source_dir.display()
        ),
    );

    let message = if outcome.reinstalled {
        format!(
            "Reinstalled another-elm to \"{}\" and reset std packages.",
            outcome.executable.display()
        )
    } else {
        format!("Installed another-elm to \"{}\".", outcome.executable.display())
    };
    ui::outro_success(ctx, &message);
}
