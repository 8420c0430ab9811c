//! Customised package cache
//!
//! another-elm ships patched copies of a few std packages. Each copy lives in
//! a cache entry under `<data_dir>/another-elm/packages/<author>/<name>/`,
//! mirrors the package's local sources with the internal namespace renamed,
//! and carries a zero-byte `custom` tag file whose mtime records when it was
//! last synchronized.
//!
//! # Entry States
//!
//! | State | Tag file | Action on sync |
//! |-------|----------|----------------|
//! | Fresh | newer than every source path | skipped |
//! | Stale | older than some source path | deleted and rebuilt |
//! | Untagged | missing (never built, or interrupted) | deleted and rebuilt |
//!
//! Rebuilding an entry unpins every resolved version of that package in the
//! installed compiler registries so the compiler resolves it again.

pub mod lock;
pub mod package;
pub mod registry;
pub mod replicate;
pub mod stamp;
pub mod staleness;
pub mod sync;

pub use lock::InstallLock;
pub use package::{default_packages, validate_packages, CacheLayout, PackageRef, SourceLayout};
pub use registry::RegistryRoot;
pub use replicate::Rewrite;
pub use stamp::RunStamp;
pub use staleness::Staleness;
pub use sync::{Stamp, SyncReport, Synchronizer};
