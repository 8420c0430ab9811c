//! Record of the suffix and version the cache entries were built with
//!
//! The installed executable and every cache entry must agree on the namespace
//! suffix. Entries are only rebuilt when stale, so the suffix they carry is
//! persisted here and reused until the version changes.

use crate::error::{InitError, InitResult};
use crate::store::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// File name of the stamp inside the customised packages root
pub const STAMP_FILE: &str = "stamp.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStamp {
    /// Namespace suffix baked into the cache entries
    pub suffix: String,

    /// Version identifier stamped into the cache entries
    pub version: String,

    /// When the stamp was last written
    pub written_at: DateTime<Utc>,
}

impl RunStamp {
    pub fn new(suffix: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            version: version.into(),
            written_at: Utc::now(),
        }
    }

    /// Load the stamp, treating a missing or unreadable one as absent
    pub fn load<S: Store + ?Sized>(store: &S, path: &Path) -> Option<Self> {
        let content = match store.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No run stamp at {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(stamp) => Some(stamp),
            Err(e) => {
                warn!("Ignoring unreadable run stamp {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save<S: Store + ?Sized>(&self, store: &S, path: &Path) -> InitResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        store
            .write(path, &content)
            .map_err(|e| InitError::io(format!("writing run stamp {}", path.display()), e))
    }
}
