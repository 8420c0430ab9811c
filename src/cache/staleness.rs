//! Staleness checks for cache entries
//!
//! An entry is fresh only while its tag file is at least as new as every
//! file and directory it was built from. The scan stops at the first newer
//! path. A source that disappears mid-scan is an error rather than a pass,
//! since treating it as fresh could hide a stale entry.

use crate::error::{InitError, InitResult};
use crate::store::Store;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Outcome of comparing a cache entry against its sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Tag file is newer than every source path
    Fresh,
    /// Tag file is missing or unreadable
    Untagged,
    /// This source path was modified after the tag file
    Newer(PathBuf),
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

/// Decide whether the entry tagged by `tag_file` must be rebuilt from `sources`
pub fn check<S: Store + ?Sized>(
    store: &S,
    tag_file: &Path,
    sources: &[PathBuf],
) -> InitResult<Staleness> {
    let tagged_at = match store.modified(tag_file) {
        Ok(time) => time,
        Err(e) => {
            debug!("No usable tag file at {}: {}", tag_file.display(), e);
            return Ok(Staleness::Untagged);
        }
    };

    for source in sources {
        let modified = store.modified(source).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => InitError::SourceMissing(source.clone()),
            _ => InitError::io(format!("reading mtime of {}", source.display()), e),
        })?;
        if modified > tagged_at {
            return Ok(Staleness::Newer(source.clone()));
        }
        let is_dir = store
            .is_dir(source)
            .map_err(|e| vanished_or_io(source, e))?;
        if is_dir {
            if let Some(newer) = find_newer(store, source, tagged_at)? {
                return Ok(Staleness::Newer(newer));
            }
        }
    }

    Ok(Staleness::Fresh)
}

/// Boolean form of [`check`]
pub fn is_stale<S: Store + ?Sized>(
    store: &S,
    tag_file: &Path,
    sources: &[PathBuf],
) -> InitResult<bool> {
    Ok(check(store, tag_file, sources)?.is_stale())
}

/// Latest mtime across `sources` and everything below them
pub fn newest<S: Store + ?Sized>(
    store: &S,
    sources: &[PathBuf],
) -> InitResult<Option<SystemTime>> {
    let mut latest = None;
    for source in sources {
        latest = latest.max(Some(newest_below(store, source)?));
    }
    Ok(latest)
}

fn newest_below<S: Store + ?Sized>(store: &S, path: &Path) -> InitResult<SystemTime> {
    let mut latest = store
        .modified(path)
        .map_err(|e| vanished_or_io(path, e))?;
    if store.is_dir(path).map_err(|e| vanished_or_io(path, e))? {
        for entry in store.read_dir(path).map_err(|e| vanished_or_io(path, e))? {
            latest = latest.max(newest_below(store, &entry.path)?);
        }
    }
    Ok(latest)
}

/// Depth-first search below `dir` for anything newer than `tagged_at`
fn find_newer<S: Store + ?Sized>(
    store: &S,
    dir: &Path,
    tagged_at: SystemTime,
) -> InitResult<Option<PathBuf>> {
    let entries = store.read_dir(dir).map_err(|e| vanished_or_io(dir, e))?;

    for entry in entries {
        let modified = store
            .modified(&entry.path)
            .map_err(|e| vanished_or_io(&entry.path, e))?;
        if modified > tagged_at {
            return Ok(Some(entry.path));
        }
        if entry.is_dir {
            if let Some(newer) = find_newer(store, &entry.path, tagged_at)? {
                return Ok(Some(newer));
            }
        }
    }

    Ok(None)
}

fn vanished_or_io(path: &Path, e: io::Error) -> InitError {
    match e.kind() {
        io::ErrorKind::NotFound => InitError::SourceVanished {
            path: path.to_path_buf(),
            source: e,
        },
        _ => InitError::io(format!("scanning {}", path.display()), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreEntry};

    fn sources() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/std/core/src"),
            PathBuf::from("/std/core/elm.json"),
        ]
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_file("/std/core/elm.json", "{}").unwrap();
        store.add_file("/std/core/src/Basics.elm", "module Basics").unwrap();
        store
            .add_file("/std/core/src/Platform/Unstable/Task.elm", "module T")
            .unwrap();
        store.create_dir_all(Path::new("/cache/elm/core")).unwrap();
        store
    }

    #[test]
    fn missing_tag_is_stale() {
        let store = seeded();
        let result = check(&store, Path::new("/cache/elm/core/custom"), &sources()).unwrap();
        assert_eq!(result, Staleness::Untagged);
        assert!(result.is_stale());
    }

    #[test]
    fn newer_tag_is_fresh() {
        let store = seeded();
        store.touch(Path::new("/cache/elm/core/custom")).unwrap();
        assert!(!is_stale(&store, Path::new("/cache/elm/core/custom"), &sources()).unwrap());
    }

    #[test]
    fn equal_mtime_is_fresh() {
        let store = seeded();
        store.touch(Path::new("/cache/elm/core/custom")).unwrap();
        store
            .set_modified(Path::new("/cache/elm/core/custom"), 100)
            .unwrap();
        store
            .set_modified(Path::new("/std/core/src/Basics.elm"), 100)
            .unwrap();
        assert_eq!(
            check(&store, Path::new("/cache/elm/core/custom"), &sources()).unwrap(),
            Staleness::Fresh
        );

        store
            .set_modified(Path::new("/std/core/src/Basics.elm"), 101)
            .unwrap();
        assert!(is_stale(&store, Path::new("/cache/elm/core/custom"), &sources()).unwrap());
    }

    #[test]
    fn deep_file_touch_is_stale() {
        let store = seeded();
        store.touch(Path::new("/cache/elm/core/custom")).unwrap();

        let deep = Path::new("/std/core/src/Platform/Unstable/Task.elm");
        store.bump(deep).unwrap();

        let result = check(&store, Path::new("/cache/elm/core/custom"), &sources()).unwrap();
        assert_eq!(result, Staleness::Newer(deep.to_path_buf()));
    }

    #[test]
    fn new_file_in_source_dir_is_stale() {
        let store = seeded();
        store.touch(Path::new("/cache/elm/core/custom")).unwrap();
        store.add_file("/std/core/src/Added.elm", "").unwrap();

        // The src directory itself changed when the file was added
        let result = check(&store, Path::new("/cache/elm/core/custom"), &sources()).unwrap();
        assert_eq!(result, Staleness::Newer(PathBuf::from("/std/core/src")));
    }

    #[test]
    fn touched_manifest_is_stale() {
        let store = seeded();
        store.touch(Path::new("/cache/elm/core/custom")).unwrap();
        store.bump(Path::new("/std/core/elm.json")).unwrap();
        assert!(is_stale(&store, Path::new("/cache/elm/core/custom"), &sources()).unwrap());
    }

    #[test]
    fn missing_source_is_an_error() {
        let store = seeded();
        store.touch(Path::new("/cache/elm/core/custom")).unwrap();
        let result = check(
            &store,
            Path::new("/cache/elm/core/custom"),
            &[PathBuf::from("/std/nope/src")],
        );
        assert!(matches!(result, Err(InitError::SourceMissing(_))));
    }

    #[test]
    fn newest_covers_nested_files() {
        let store = seeded();
        store
            .set_modified(Path::new("/std/core/src/Platform/Unstable/Task.elm"), 500)
            .unwrap();
        let latest = newest(&store, &sources()).unwrap();
        let expected = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(500);
        assert_eq!(latest, Some(expected));
        assert_eq!(newest(&store, &[]).unwrap(), None);
    }

    /// Lists a child that no longer exists by the time it is stat'ed
    struct VanishingStore(MemoryStore);

    impl Store for VanishingStore {
        fn modified(&self, path: &Path) -> io::Result<SystemTime> {
            self.0.modified(path)
        }
        fn is_dir(&self, path: &Path) -> io::Result<bool> {
            self.0.is_dir(path)
        }
        fn read_dir(&self, path: &Path) -> io::Result<Vec<StoreEntry>> {
            let mut entries = self.0.read_dir(path)?;
            entries.push(StoreEntry {
                path: path.join("Ghost.elm"),
                name: "Ghost.elm".to_string(),
                is_dir: false,
            });
            Ok(entries)
        }
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.0.read_to_string(path)
        }
        fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
            self.0.write(path, contents)
        }
        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            self.0.create_dir_all(path)
        }
        fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            self.0.remove_dir_all(path)
        }
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            self.0.remove_file(path)
        }
        fn touch(&self, path: &Path) -> io::Result<()> {
            self.0.touch(path)
        }
        fn set_mtime(&self, path: &Path, time: SystemTime) -> io::Result<()> {
            self.0.set_mtime(path, time)
        }
    }

    #[test]
    fn vanished_entry_is_an_error_not_fresh() {
        let inner = seeded();
        inner.touch(Path::new("/cache/elm/core/custom")).unwrap();
        let store = VanishingStore(inner);

        let result = check(&store, Path::new("/cache/elm/core/custom"), &sources());
        match result {
            Err(InitError::SourceVanished { path, .. }) => {
                assert!(path.ends_with("Ghost.elm"));
            }
            other => panic!("expected SourceVanished, got {:?}", other),
        }
    }

    #[test]
    fn scan_stops_at_first_newer_path() {
        let store = seeded();
        store.touch(Path::new("/cache/elm/core/custom")).unwrap();
        store.bump(Path::new("/std/core/src/Basics.elm")).unwrap();
        // A vanished entry later in the walk is never reached
        let store = VanishingStore(store);
        let result = check(&store, Path::new("/cache/elm/core/custom"), &sources()).unwrap();
        assert_eq!(
            result,
            Staleness::Newer(PathBuf::from("/std/core/src/Basics.elm"))
        );
    }
}
