//! In-memory store with a logical clock
//!
//! Every mutation advances the clock by one tick and stamps the touched node
//! (and, when a child is added or removed, its parent directory) with the new
//! time, the way a real filesystem updates mtimes.

use super::{Store, StoreEntry};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
enum Node {
    Dir { mtime: u64 },
    File { mtime: u64, contents: String },
}

impl Node {
    fn mtime(&self) -> u64 {
        match self {
            Node::Dir { mtime } | Node::File { mtime, .. } => *mtime,
        }
    }

    fn set_mtime(&mut self, tick: u64) {
        match self {
            Node::Dir { mtime } | Node::File { mtime, .. } => *mtime = tick,
        }
    }
}

#[derive(Debug)]
struct Inner {
    nodes: BTreeMap<PathBuf, Node>,
    clock: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn require_dir(&self, path: &Path) -> io::Result<()> {
        match self.nodes.get(path) {
            Some(Node::Dir { .. }) => Ok(()),
            Some(Node::File { .. }) => Err(not_a_dir(path)),
            None => Err(not_found(path)),
        }
    }

    fn bump_parent(&mut self, path: &Path, tick: u64) {
        if let Some(node) = path.parent().and_then(|p| self.nodes.get_mut(p)) {
            node.set_mtime(tick);
        }
    }

    fn insert(&mut self, path: &Path, node: Node) -> io::Result<()> {
        let parent = path.parent().ok_or_else(|| not_found(path))?;
        self.require_dir(parent)?;
        let tick = node.mtime();
        let is_new = self.nodes.insert(path.to_path_buf(), node).is_none();
        if is_new {
            self.bump_parent(path, tick);
        }
        Ok(())
    }
}

/// [`Store`] that keeps the whole tree in memory
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store containing only `/`
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(PathBuf::from("/"), Node::Dir { mtime: 0 });
        Self {
            inner: Mutex::new(Inner { nodes, clock: 0 }),
        }
    }

    /// Current logical time
    pub fn now(&self) -> SystemTime {
        tick_to_time(self.lock().clock)
    }

    /// Advance the clock and stamp `path` with the new time
    pub fn bump(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        let tick = inner.tick();
        let node = inner.nodes.get_mut(path).ok_or_else(|| not_found(path))?;
        node.set_mtime(tick);
        Ok(())
    }

    /// Stamp `path` with an explicit logical time
    pub fn set_modified(&self, path: &Path, tick: u64) -> io::Result<()> {
        let mut inner = self.lock();
        let node = inner.nodes.get_mut(path).ok_or_else(|| not_found(path))?;
        node.set_mtime(tick);
        Ok(())
    }

    /// Write a file, creating parent directories first
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &str) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        self.write(path, contents)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock can only come from a failing test
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        let inner = self.lock();
        let node = inner.nodes.get(path).ok_or_else(|| not_found(path))?;
        Ok(tick_to_time(node.mtime()))
    }

    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        let inner = self.lock();
        let node = inner.nodes.get(path).ok_or_else(|| not_found(path))?;
        Ok(matches!(node, Node::Dir { .. }))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<StoreEntry>> {
        let inner = self.lock();
        inner.require_dir(path)?;
        let entries = inner
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .map(|(child, node)| StoreEntry {
                path: child.clone(),
                name: child
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                is_dir: matches!(node, Node::Dir { .. }),
            })
            .collect::<Vec<_>>();
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let inner = self.lock();
        match inner.nodes.get(path) {
            Some(Node::File { contents, .. }) => Ok(contents.clone()),
            Some(Node::Dir { .. }) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut inner = self.lock();
        if let Some(Node::Dir { .. }) = inner.nodes.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", path.display()),
            ));
        }
        let mtime = inner.tick();
        inner.insert(
            path,
            Node::File {
                mtime,
                contents: contents.to_string(),
            },
        )
    }

    fn set_mtime(&self, path: &Path, time: SystemTime) -> io::Result<()> {
        self.set_modified(path, time_to_tick(time))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        let mut missing = Vec::new();
        for ancestor in path.ancestors() {
            match inner.nodes.get(ancestor) {
                Some(Node::Dir { .. }) => break,
                Some(Node::File { .. }) => return Err(not_a_dir(ancestor)),
                None => missing.push(ancestor.to_path_buf()),
            }
        }
        for dir in missing.into_iter().rev() {
            let mtime = inner.tick();
            inner.insert(&dir, Node::Dir { mtime })?;
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        inner.require_dir(path)?;
        inner.nodes.retain(|p, _| !p.starts_with(path));
        let tick = inner.tick();
        inner.bump_parent(path, tick);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        match inner.nodes.get(path) {
            Some(Node::File { .. }) => {
                inner.nodes.remove(path);
                let tick = inner.tick();
                inner.bump_parent(path, tick);
                Ok(())
            }
            Some(Node::Dir { .. }) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn touch(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        let tick = inner.tick();
        if let Some(node) = inner.nodes.get_mut(path) {
            node.set_mtime(tick);
            return Ok(());
        }
        inner.insert(
            path,
            Node::File {
                mtime: tick,
                contents: String::new(),
            },
        )
    }
}

fn tick_to_time(tick: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(tick)
}

fn time_to_tick(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

fn not_a_dir(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::Other,
        format!("{} is not a directory", path.display()),
    )
}
