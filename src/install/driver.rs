//! Top-level install sequence
//!
//! ```text
//! Start -> Syncing -> Installing -> Done
//! ```
//!
//! There is no retry or rollback at this level; the first failure aborts the
//! run. Cache entries are only tagged after they are fully written, so an
//! aborted run leaves them stale and the next run repairs them.

use crate::cache::{
    registry, validate_packages, CacheLayout, InstallLock, PackageRef, RegistryRoot, RunStamp,
    SourceLayout, Stamp, SyncReport, Synchronizer,
};
use crate::config::ResolvedPaths;
use crate::error::{InitError, InitResult};
use crate::install::suffix::Suffix;
use crate::install::template::{self, Placeholder, PlaceholderValues};
use crate::install::version;
use crate::store::{ignore_not_found, DiskStore, Store};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Stage of an install run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Syncing,
    Installing,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Syncing => "syncing",
            Self::Installing => "installing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a completed install
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    /// Path of the installed executable
    pub executable: PathBuf,
    /// The executable existed before this run
    pub reinstalled: bool,
    /// What the package sync changed
    pub sync: SyncReport,
    /// Compiler versions found under the Elm home
    pub registry_roots: Vec<RegistryRoot>,
    /// Namespace suffix shared by the cache and the executable
    pub suffix: Suffix,
    /// Version identifier stamped into the cache and the executable
    pub version: String,
    /// The install directory is on `PATH`
    pub on_search_path: bool,
    /// Checkout the executable points at; moving it breaks the install
    pub source_dir: PathBuf,
}

/// Run a full install.
///
/// `on_phase` is called on entry to every phase after `Start`.
pub async fn install(
    paths: &ResolvedPaths,
    packages: Vec<PackageRef>,
    force: bool,
    mut on_phase: impl FnMut(Phase),
) -> InitResult<InstallOutcome> {
    let mut phase = Phase::Start;
    let mut enter = |next: Phase, phase: &mut Phase| {
        debug!("Install phase {} -> {}", phase, next);
        *phase = next;
        on_phase(next);
    };

    validate_packages(&packages)?;
    let template_path = paths.template();
    if !template_path.is_file() {
        return Err(InitError::TemplateNotFound(template_path));
    }

    // The executable embeds this path, so resolve `..` and symlinks once here
    let source_dir = tokio::fs::canonicalize(&paths.source_dir)
        .await
        .map_err(|e| InitError::io(format!("resolving {}", paths.source_dir.display()), e))?;

    let version = version::identify(&source_dir).await;
    debug!("Version identifier {}", version);

    let _lock = InstallLock::acquire(&paths.lock_file())?;

    let store = DiskStore;
    let stamp_file = paths.stamp_file();
    let (suffix, rebuild_all) = choose_suffix(&store, &stamp_file, &version, force)?;

    enter(Phase::Syncing, &mut phase);
    let cache_root = paths.cache_root();
    store
        .create_dir_all(&cache_root)
        .map_err(|e| InitError::io(format!("creating directory {}", cache_root.display()), e))?;

    let registry_roots = registry::discover(&store, &paths.registry_base())?;
    if registry_roots.is_empty() {
        info!(
            "No installed compiler versions under {}",
            paths.registry_base().display()
        );
    }

    let sync = {
        let sources = SourceLayout::new(&source_dir);
        let cache = CacheLayout::new(&cache_root);
        let roots = registry_roots.clone();
        let suffix = suffix.clone();
        let version = version.clone();
        blocking(move || {
            let stamp = Stamp {
                suffix: suffix.as_str(),
                version: &version,
            };
            Synchronizer::new(&DiskStore, sources, cache, &roots).sync(&packages, stamp, rebuild_all)
        })
        .await?
    };
    RunStamp::new(suffix.as_str(), version.as_str()).save(&store, &stamp_file)?;

    enter(Phase::Installing, &mut phase);
    let executable = paths.executable();
    let reinstalled = executable.exists();
    let values = PlaceholderValues::new()
        .with(Placeholder::RandomSuffix, suffix.as_str())
        .with(Placeholder::AnotherElmVersion, version.as_str())
        .with(
            Placeholder::ElmStdDir,
            source_dir.to_string_lossy().into_owned(),
        );
    let report = {
        let executable = executable.clone();
        blocking(move || template::materialize(&template_path, &executable, &values)).await?
    };

    enter(Phase::Done, &mut phase);
    info!(
        "{} another-elm to {}",
        if reinstalled { "Reinstalled" } else { "Installed" },
        executable.display()
    );

    Ok(InstallOutcome {
        executable,
        reinstalled,
        sync,
        registry_roots,
        suffix,
        version,
        on_search_path: report.on_search_path,
        source_dir,
    })
}

/// Pick the suffix for this run and whether every entry must be rebuilt.
///
/// Reusing the stamped suffix is only sound while the cache still holds
/// entries built with it, so a new suffix always forces a full rebuild and
/// the old stamp is dropped before any entry changes.
fn choose_suffix<S: Store + ?Sized>(
    store: &S,
    stamp_file: &Path,
    version: &str,
    force: bool,
) -> InitResult<(Suffix, bool)> {
    if !force {
        if let Some(stamp) = RunStamp::load(store, stamp_file) {
            match Suffix::parse(&stamp.suffix) {
                Some(suffix) if stamp.version == version => {
                    debug!("Reusing suffix {} from {}", suffix, stamp.written_at);
                    return Ok((suffix, false));
                }
                Some(_) => info!(
                    "Version changed from {} to {}, rebuilding all packages",
                    stamp.version, version
                ),
                None => warn!("Ignoring malformed suffix in {}", stamp_file.display()),
            }
        }
    }

    ignore_not_found(store.remove_file(stamp_file))
        .map_err(|e| InitError::io(format!("removing {}", stamp_file.display()), e))?;
    Ok((Suffix::generate(), true))
}

async fn blocking<T, F>(f: F) -> InitResult<T>
where
    F: FnOnce() -> InitResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| InitError::Internal(format!("install task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::default_packages;
    use crate::store::MemoryStore;
    use std::fs;
    use tempfile::TempDir;

    const TEMPLATE: &str = "#!/usr/bin/env python3\n\
random_suffix = None  # REPLACE ME\n\
another_elm_version = None  # REPLACE ME\n\
elm_std_dir = None  # REPLACE ME\n\
print(random_suffix)\n";

    struct Fixture {
        _dir: TempDir,
        paths: ResolvedPaths,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let source = root.join("checkout");

        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("another-elm"), TEMPLATE).unwrap();
        for package in default_packages() {
            let pkg = source.join(package.source_dir_name());
            fs::create_dir_all(pkg.join("src/Platform/Unstable")).unwrap();
            fs::write(pkg.join("elm.json"), "{\"version\": \"ANOTHER-ELM-VERSION\"}\n").unwrap();
            fs::write(
                pkg.join("src/Platform/Unstable/Task.elm"),
                "module Platform.Unstable.Task exposing (..)\n",
            )
            .unwrap();
        }
        fs::create_dir_all(root.join("elm/another/0.19.1/packages/elm/core/1.0.5")).unwrap();
        fs::write(root.join("elm/another/0.19.1/packages/elm/core/1.0.5/custom"), "").unwrap();

        let paths = ResolvedPaths {
            install_dir: root.join("bin"),
            data_dir: root.join("data/another-elm"),
            elm_home: root.join("elm"),
            source_dir: source,
        };
        Fixture { _dir: dir, paths }
    }

    async fn run(paths: &ResolvedPaths, force: bool) -> InstallOutcome {
        install(paths, default_packages(), force, |_| {})
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fresh_install_then_reinstall() {
        let fx = fixture();
        let mut phases = Vec::new();
        let first = install(&fx.paths, default_packages(), false, |p| phases.push(p))
            .await
            .unwrap();

        assert_eq!(phases, vec![Phase::Syncing, Phase::Installing, Phase::Done]);
        assert!(!first.reinstalled);
        assert_eq!(first.sync.rebuilt.len(), 5);
        assert_eq!(first.sync.invalidated.len(), 1);
        assert_eq!(first.registry_roots.len(), 1);

        let exe = fs::read_to_string(&first.executable).unwrap();
        assert!(exe.contains(&format!("random_suffix = \"{}\"", first.suffix)));
        assert!(!exe.contains("REPLACE ME"));

        let second = run(&fx.paths, false).await;
        assert!(second.reinstalled);
        assert!(second.sync.is_noop());
        assert_eq!(second.suffix, first.suffix);
    }

    #[tokio::test]
    async fn executable_and_cache_share_suffix() {
        let fx = fixture();
        let outcome = run(&fx.paths, false).await;

        let module = fx
            .paths
            .cache_root()
            .join("elm/core/src/Platform")
            .join(format!("Unstable{}", outcome.suffix))
            .join("Task.elm");
        let text = fs::read_to_string(module).unwrap();
        assert_eq!(
            text,
            format!("module Platform.Unstable{}.Task exposing (..)\n", outcome.suffix)
        );
    }

    #[tokio::test]
    async fn force_regenerates_suffix_and_rebuilds() {
        let fx = fixture();
        let first = run(&fx.paths, false).await;
        let forced = run(&fx.paths, true).await;

        assert_ne!(forced.suffix, first.suffix);
        assert_eq!(forced.sync.rebuilt.len(), 5);
        assert!(!fx
            .paths
            .cache_root()
            .join("elm/core/src/Platform")
            .join(format!("Unstable{}", first.suffix))
            .exists());
    }

    #[tokio::test]
    async fn executable_embeds_resolved_checkout_path() {
        let fx = fixture();
        let checkout = fx.paths.source_dir.clone();
        fs::create_dir_all(checkout.parent().unwrap().join("elsewhere")).unwrap();
        let paths = ResolvedPaths {
            source_dir: checkout.parent().unwrap().join("elsewhere/../checkout"),
            ..fx.paths.clone()
        };

        let outcome = run(&paths, false).await;
        let resolved = fs::canonicalize(&checkout).unwrap();
        assert_eq!(outcome.source_dir, resolved);

        let exe = fs::read_to_string(&outcome.executable).unwrap();
        assert!(exe.contains(&format!("elm_std_dir = \"{}\"", resolved.display())));
        assert!(!exe.contains(".."));
    }

    #[tokio::test]
    async fn missing_template_fails_before_touching_cache() {
        let fx = fixture();
        fs::remove_file(fx.paths.template()).unwrap();

        let result = install(&fx.paths, default_packages(), false, |_| {}).await;
        assert!(matches!(result, Err(InitError::TemplateNotFound(_))));
        assert!(!fx.paths.cache_root().exists());
    }

    #[tokio::test]
    async fn held_lock_is_reported() {
        let fx = fixture();
        let _held = InstallLock::acquire(&fx.paths.lock_file()).unwrap();

        let result = install(&fx.paths, default_packages(), false, |_| {}).await;
        assert!(matches!(result, Err(InitError::InstallInProgress(_))));
    }

    #[test]
    fn stamp_with_same_version_is_reused() {
        let store = MemoryStore::new();
        let stamp_file = Path::new("/cache/stamp.json");
        store.create_dir_all(Path::new("/cache")).unwrap();
        RunStamp::new("0123456789ABCDEF", "git-abc")
            .save(&store, stamp_file)
            .unwrap();

        let (suffix, rebuild_all) = choose_suffix(&store, stamp_file, "git-abc", false).unwrap();
        assert_eq!(suffix.as_str(), "0123456789ABCDEF");
        assert!(!rebuild_all);
        assert!(store.exists(stamp_file));
    }

    #[test]
    fn version_change_drops_stamp() {
        let store = MemoryStore::new();
        let stamp_file = Path::new("/stamp.json");
        RunStamp::new("0123456789ABCDEF", "git-abc")
            .save(&store, stamp_file)
            .unwrap();

        let (suffix, rebuild_all) = choose_suffix(&store, stamp_file, "git-def", false).unwrap();
        assert_ne!(suffix.as_str(), "0123456789ABCDEF");
        assert!(rebuild_all);
        assert!(!store.exists(stamp_file));
    }

    #[test]
    fn missing_stamp_forces_rebuild() {
        let store = MemoryStore::new();
        let (_, rebuild_all) =
            choose_suffix(&store, Path::new("/stamp.json"), "git-abc", false).unwrap();
        assert!(rebuild_all);
    }
}
