//! Filesystem abstraction for the package cache
//!
//! The cache has no database of its own: tag-file mtimes act as a logical
//! clock. Staleness checks, tree replication and invalidation all go through
//! [`Store`] so they can run against [`MemoryStore`] in tests, where the clock
//! is explicit instead of depending on filesystem timestamp granularity.

mod disk;
mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A child of a directory returned by [`Store::read_dir`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoreEntry {
    /// Full path of the child
    pub path: PathBuf,
    /// Final path component
    pub name: String,
    /// Whether the child is a directory
    pub is_dir: bool,
}

/// Minimal set of filesystem operations the cache logic needs.
///
/// Implementations report missing paths as [`io::ErrorKind::NotFound`].
pub trait Store {
    /// Last modification time of a file or directory
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Whether `path` is a directory
    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// Children of a directory, sorted by name
    fn read_dir(&self, path: &Path) -> io::Result<Vec<StoreEntry>>;

    /// Read a UTF-8 file
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Create or truncate a file with the given contents
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Create a directory and any missing parents; existing ones are reused
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a single file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create the file if needed and set its mtime to now
    fn touch(&self, path: &Path) -> io::Result<()>;

    /// Set the mtime of an existing file or directory
    fn set_mtime(&self, path: &Path, time: SystemTime) -> io::Result<()>;

    /// Whether anything exists at `path`
    fn exists(&self, path: &Path) -> bool {
        self.modified(path).is_ok()
    }
}

/// Treat `NotFound` as success. Used where a missing target is a no-op.
pub fn ignore_not_found(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
