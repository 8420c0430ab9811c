//! Advisory lock serializing installs against one data directory

use crate::error::{InitError, InitResult};
use fs4::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Lock file name inside the another-elm data directory
pub const LOCK_FILE: &str = "install.lock";

/// Exclusive lock held for the duration of an install; released on drop
#[derive(Debug)]
pub struct InstallLock {
    _file: File,
}

impl InstallLock {
    /// Take the lock without waiting. Fails with `InstallInProgress` when
    /// another process already holds it.
    pub fn acquire(path: &Path) -> InitResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                InitError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| InitError::io(format!("opening lock file {}", path.display()), e))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Acquired install lock {}", path.display());
                Ok(Self { _file: file })
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                Err(InitError::InstallInProgress(path.to_path_buf()))
            }
            #[cfg(windows)]
            Err(e) if matches!(e.raw_os_error(), Some(32 | 33)) => {
                Err(InitError::InstallInProgress(path.to_path_buf()))
            }
            Err(e) => Err(InitError::io(format!("locking {}", path.display()), e)),
        }
    }
}
