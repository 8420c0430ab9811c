//! Status command - report cache entries without changing anything

use super::resolve_paths;
use crate::cache::{
    registry, validate_packages, CacheLayout, PackageRef, RegistryRoot, RunStamp, SourceLayout,
    Staleness, Synchronizer,
};
use crate::cli::args::{OutputFormat, StatusArgs};
use crate::config::{Config, PathsConfig, ResolvedPaths};
use crate::error::InitResult;
use crate::store::{DiskStore, Store};
use crate::ui::{self, UiContext};
use chrono::{DateTime, Local, Utc};
use console::style;
use serde::Serialize;
use std::path::PathBuf;

/// State of one cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    Fresh,
    Stale,
    Missing,
}

impl EntryState {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::Missing => "missing",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageStatus {
    pub package: String,
    pub state: EntryState,
    /// Why the entry is stale, or which source is missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// When the entry was last synchronized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub executable: PathBuf,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp: Option<RunStamp>,
    pub compiler_versions: Vec<String>,
    pub packages: Vec<PackageStatus>,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> InitResult<()> {
    let flags = PathsConfig {
        source_dir: args.source,
        ..Default::default()
    };
    let paths = resolve_paths(&flags, config)?;
    let report = collect(&DiskStore, &paths, &config.packages())?;

    match args.format {
        OutputFormat::Table => print_table(&report),
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Plain => print_plain(&report),
    }

    Ok(())
}

/// Inspect every known package without modifying the cache
pub fn collect<S: Store + ?Sized>(
    store: &S,
    paths: &ResolvedPaths,
    packages: &[PackageRef],
) -> InitResult<StatusReport> {
    validate_packages(packages)?;
    let roots = registry::discover(store, &paths.registry_base())?;
    let sources = SourceLayout::new(&paths.source_dir);
    let cache = CacheLayout::new(paths.cache_root());
    let sync = Synchronizer::new(store, sources.clone(), cache.clone(), &roots);

    let mut statuses = Vec::with_capacity(packages.len());
    for package in packages {
        let missing = sources
            .inputs(package)
            .into_iter()
            .find(|input| !store.exists(input));
        let (state, detail) = match missing {
            Some(path) => (
                EntryState::Missing,
                Some(format!("{} not found", path.display())),
            ),
            None => match sync.check(package)? {
                Staleness::Fresh => (EntryState::Fresh, None),
                Staleness::Untagged => (EntryState::Stale, Some("never synchronized".to_string())),
                Staleness::Newer(path) => (
                    EntryState::Stale,
                    Some(format!("{} changed", path.display())),
                ),
            },
        };
        let synced_at = store
            .modified(&cache.tag_file(package))
            .ok()
            .map(DateTime::<Utc>::from);

        statuses.push(PackageStatus {
            package: package.to_string(),
            state,
            detail,
            synced_at,
        });
    }

    let executable = paths.executable();
    Ok(StatusReport {
        installed: executable.is_file(),
        executable,
        stamp: RunStamp::load(store, &paths.stamp_file()),
        compiler_versions: roots
            .into_iter()
            .map(|RegistryRoot { compiler_version, .. }| compiler_version)
            .collect(),
        packages: statuses,
    })
}

fn print_table(report: &StatusReport) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "another-elm status");

    ui::key_value_status(
        &ctx,
        "executable",
        &report.executable.display().to_string(),
        report.installed,
    );
    if let Some(ref stamp) = report.stamp {
        ui::key_value(&ctx, "version", &stamp.version);
        ui::key_value(&ctx, "suffix", &stamp.suffix);
    }
    let versions = if report.compiler_versions.is_empty() {
        "none".to_string()
    } else {
        report.compiler_versions.join(", ")
    };
    ui::key_value(&ctx, "compiler versions", &versions);
    println!();

    println!(
        "{:<28} {:<10} {:<18} {}",
        style("PACKAGE").bold(),
        style("STATE").bold(),
        style("SYNCED").bold(),
        style("DETAIL").bold()
    );
    println!("{}", "-".repeat(77));

    for status in &report.packages {
        let state = match status.state {
            EntryState::Fresh => style(status.state.as_str()).green(),
            EntryState::Stale => style(status.state.as_str()).yellow(),
            EntryState::Missing => style(status.state.as_str()).red(),
        };
        let synced = status
            .synced_at
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<28} {:<10} {:<18} {}",
            status.package,
            state,
            synced,
            status.detail.as_deref().unwrap_or("")
        );
    }

    println!();
    let stale = report
        .packages
        .iter()
        .filter(|s| s.state != EntryState::Fresh)
        .count();
    println!("{} package(s), {} need syncing", report.packages.len(), stale);
}

fn print_json(report: &StatusReport) -> InitResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(report: &StatusReport) {
    for status in &report.packages {
        println!("{} {}", status.package, status.state.as_str());
    }
}
