//! Keep the customised package cache in step with the local sources
//!
//! A stale entry is deleted and rebuilt from scratch rather than patched, so
//! a rebuilt entry is always an exact mirror of its source. The tag file is
//! touched last; an interrupted rebuild leaves the entry untagged and it is
//! picked up again on the next run.

use crate::cache::package::{CacheLayout, PackageRef, SourceLayout};
use crate::cache::registry::{self, RegistryRoot};
use crate::cache::replicate::{copy_file, replicate, Rewrite};
use crate::cache::staleness::{self, Staleness};
use crate::error::{InitError, InitResult};
use crate::store::{ignore_not_found, Store};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// What a sync pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Packages whose cache entry was rebuilt
    pub rebuilt: BTreeSet<PackageRef>,
    /// Resolved-version tag files that were removed
    pub invalidated: Vec<PathBuf>,
}

impl SyncReport {
    /// Nothing was stale
    pub fn is_noop(&self) -> bool {
        self.rebuilt.is_empty()
    }
}

/// Values stamped into rebuilt entries for this run
#[derive(Debug, Clone, Copy)]
pub struct Stamp<'a> {
    pub suffix: &'a str,
    pub version: &'a str,
}

/// Synchronizes cache entries for a list of packages
pub struct Synchronizer<'a, S: Store + ?Sized> {
    store: &'a S,
    sources: SourceLayout,
    cache: CacheLayout,
    registry_roots: &'a [RegistryRoot],
}

impl<'a, S: Store + ?Sized> Synchronizer<'a, S> {
    pub fn new(
        store: &'a S,
        sources: SourceLayout,
        cache: CacheLayout,
        registry_roots: &'a [RegistryRoot],
    ) -> Self {
        Self {
            store,
            sources,
            cache,
            registry_roots,
        }
    }

    /// Compare a package's cache entry with its sources without changing anything
    pub fn check(&self, package: &PackageRef) -> InitResult<Staleness> {
        staleness::check(
            self.store,
            &self.cache.tag_file(package),
            &self.sources.inputs(package),
        )
    }

    /// Rebuild every stale entry (or every entry when `force` is set) and
    /// unpin the resolved versions that pointed at it.
    pub fn sync(
        &self,
        packages: &[PackageRef],
        stamp: Stamp<'_>,
        force: bool,
    ) -> InitResult<SyncReport> {
        let rewrite = Rewrite::for_package(stamp.suffix, stamp.version);
        let mut report = SyncReport::default();

        for package in packages {
            if force {
                debug!("Rebuilding {} unconditionally", package);
            } else {
                match self.check(package)? {
                    Staleness::Fresh => {
                        debug!("{} is up to date", package);
                        continue;
                    }
                    Staleness::Untagged => debug!("{} has no tag file", package),
                    Staleness::Newer(path) => {
                        debug!("{} is stale: {} changed", package, path.display())
                    }
                }
            }

            self.rebuild(package, &rewrite)?;
            report.rebuilt.insert(package.clone());

            let unpinned = registry::invalidate(self.store, self.registry_roots, package)?;
            report.invalidated.extend(unpinned);
        }

        if report.is_noop() {
            info!("All {} packages up to date, nothing to do", packages.len());
        }
        Ok(report)
    }

    fn rebuild(&self, package: &PackageRef, rewrite: &Rewrite) -> InitResult<()> {
        let src_dir = self.sources.src_dir(package);
        let manifest = self.sources.manifest(package);
        for input in [&src_dir, &manifest] {
            if !self.store.exists(input) {
                return Err(InitError::SourceMissing(input.clone()));
            }
        }

        let inputs = self.sources.inputs(package);
        let built_from = staleness::newest(self.store, &inputs)?;

        let entry = self.cache.entry_dir(package);
        ignore_not_found(self.store.remove_dir_all(&entry))
            .map_err(|e| InitError::io(format!("removing {}", entry.display()), e))?;

        let files = replicate(self.store, &src_dir, &self.cache.src_dir(package), rewrite)?;
        copy_file(self.store, &manifest, &self.cache.manifest(package), rewrite)?;

        let tag = self.cache.tag_file(package);
        let tag_err =
            |e: std::io::Error| InitError::io(format!("writing tag file {}", tag.display()), e);
        self.store.touch(&tag).map_err(tag_err)?;
        // Sources dated in the future would otherwise look newer than the tag forever
        let tagged_at = self.store.modified(&tag).map_err(tag_err)?;
        if let Some(built_from) = built_from.filter(|t| *t > tagged_at) {
            debug!("Dating tag for {} forward to its newest source", package);
            self.store.set_mtime(&tag, built_from).map_err(tag_err)?;
        }

        info!("Rebuilt {} ({} files)", package, files + 1);
        Ok(())
    }
}
