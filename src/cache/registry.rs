//! Installed compiler versions and their resolved package records
//!
//! Each compiler version another-elm has run with keeps its own package
//! directory. A `custom` tag file next to a resolved package version pins it
//! to the customised cache entry; removing it forces re-resolution.

use crate::cache::package::{PackageRef, TAG_FILE};
use crate::error::{InitError, InitResult};
use crate::store::Store;
use semver::Version;
use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Package directory of one installed compiler version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRoot {
    /// Directory name under the registry base, e.g. `0.19.1`
    pub compiler_version: String,
    /// `<base>/<compiler_version>/packages`
    pub packages_dir: PathBuf,
}

impl RegistryRoot {
    pub fn versions_dir(&self, package: &PackageRef) -> PathBuf {
        self.packages_dir.join(&package.author).join(&package.name)
    }
}

/// List installed compiler versions under `base` (`$ELM_HOME/another`).
///
/// A missing base means nothing has been installed yet and yields an empty
/// list. Versions are ordered by semver where they parse, lexically otherwise.
pub fn discover<S: Store + ?Sized>(store: &S, base: &Path) -> InitResult<Vec<RegistryRoot>> {
    let entries = match store.read_dir(base) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No registry at {}", base.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(InitError::io(
                format!("listing compiler versions in {}", base.display()),
                e,
            ))
        }
    };

    let mut roots: Vec<RegistryRoot> = entries
        .into_iter()
        .filter(|entry| entry.is_dir)
        .map(|entry| RegistryRoot {
            packages_dir: entry.path.join("packages"),
            compiler_version: entry.name,
        })
        .collect();
    roots.sort_by(|a, b| compare_versions(&a.compiler_version, &b.compiler_version));
    Ok(roots)
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Remove every resolved-version tag file for `package` across `roots`.
///
/// Missing version directories and missing tag files are no-ops. Returns the
/// tag files that were actually removed.
pub fn invalidate<S: Store + ?Sized>(
    store: &S,
    roots: &[RegistryRoot],
    package: &PackageRef,
) -> InitResult<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for root in roots {
        let versions_dir = root.versions_dir(package);
        let versions = match store.read_dir(&versions_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(InitError::io(
                    format!("listing {}", versions_dir.display()),
                    e,
                ))
            }
        };

        for version in versions.into_iter().filter(|v| v.is_dir) {
            let tag = version.path.join(TAG_FILE);
            match store.remove_file(&tag) {
                Ok(()) => {
                    info!(
                        "Unpinned {} {} for compiler {}",
                        package, version.name, root.compiler_version
                    );
                    removed.push(tag);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(InitError::io(format!("removing {}", tag.display()), e));
                }
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn missing_base_is_empty() {
        let store = MemoryStore::new();
        let roots = discover(&store, Path::new("/elm/another")).unwrap();
        assert!(roots.is_empty());
    }

    #[test]
    fn discover_orders_by_semver() {
        let store = MemoryStore::new();
        for v in ["0.19.10", "0.19.1", "nightly"] {
            store
                .create_dir_all(&Path::new("/elm/another").join(v).join("packages"))
                .unwrap();
        }
        store.add_file("/elm/another/README", "not a version").unwrap();

        let roots = discover(&store, Path::new("/elm/another")).unwrap();
        let versions: Vec<_> = roots.iter().map(|r| r.compiler_version.as_str()).collect();
        assert_eq!(versions, vec!["0.19.1", "0.19.10", "nightly"]);
        assert_eq!(
            roots[0].packages_dir,
            PathBuf::from("/elm/another/0.19.1/packages")
        );
    }

    #[test]
    fn invalidate_removes_only_matching_package_tags() {
        let store = MemoryStore::new();
        store
            .add_file("/elm/another/0.19.1/packages/elm/core/1.0.5/custom", "")
            .unwrap();
        store
            .add_file("/elm/another/0.19.1/packages/elm/core/1.0.4/elm.json", "{}")
            .unwrap();
        store
            .add_file("/elm/another/0.19.1/packages/elm/json/1.1.3/custom", "")
            .unwrap();
        store
            .add_file("/elm/another/0.19.2/packages/elm/core/1.0.5/custom", "")
            .unwrap();

        let roots = discover(&store, Path::new("/elm/another")).unwrap();
        let removed = invalidate(&store, &roots, &PackageRef::new("elm", "core")).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(!store.exists(Path::new(
            "/elm/another/0.19.1/packages/elm/core/1.0.5/custom"
        )));
        assert!(!store.exists(Path::new(
            "/elm/another/0.19.2/packages/elm/core/1.0.5/custom"
        )));
        assert!(store.exists(Path::new(
            "/elm/another/0.19.1/packages/elm/json/1.1.3/custom"
        )));
    }

    #[test]
    fn invalidate_without_resolved_versions_is_noop() {
        let store = MemoryStore::new();
        store
            .create_dir_all(Path::new("/elm/another/0.19.1/packages"))
            .unwrap();
        let roots = discover(&store, Path::new("/elm/another")).unwrap();
        let removed = invalidate(&store, &roots, &PackageRef::new("elm", "browser")).unwrap();
        assert!(removed.is_empty());
    }
}
