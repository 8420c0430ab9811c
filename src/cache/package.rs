//! Package references and the on-disk layout of sources and cache entries

use crate::error::{InitError, InitResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Zero-byte marker whose mtime records the last successful sync
pub const TAG_FILE: &str = "custom";

/// Package manifest copied alongside the sources
pub const MANIFEST_FILE: &str = "elm.json";

/// Source subtree of a package
pub const SRC_DIR: &str = "src";

/// A package another-elm ships a customised copy of
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageRef {
    /// Package author, e.g. `elm`
    pub author: String,

    /// Package name, e.g. `core`
    pub name: String,

    /// Directory under the source root holding this package (defaults to `name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl PackageRef {
    pub fn new(author: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            name: name.into(),
            dir: None,
        }
    }

    /// Name of the local source directory
    pub fn source_dir_name(&self) -> &str {
        self.dir.as_deref().unwrap_or(&self.name)
    }

    /// Check that every component is usable as a single path segment
    pub fn validate(&self) -> InitResult<()> {
        let segments = [
            ("author", Some(self.author.as_str())),
            ("name", Some(self.name.as_str())),
            ("dir", self.dir.as_deref()),
        ];
        for (field, value) in segments {
            let Some(value) = value else { continue };
            if value.is_empty() {
                return Err(self.invalid(format!("{} cannot be empty", field)));
            }
            if value.contains('/')
                || value.contains('\\')
                || value.contains('\0')
                || value == "."
                || value == ".."
            {
                return Err(self.invalid(format!(
                    "{} '{}' must be a single path component",
                    field, value
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> InitError {
        InitError::InvalidPackage {
            package: self.to_string(),
            reason,
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.author, self.name)
    }
}

/// Packages another-elm customises, in sync order
pub fn default_packages() -> Vec<PackageRef> {
    vec![
        PackageRef::new("elm", "core"),
        PackageRef::new("elm", "json"),
        PackageRef::new("elm", "browser"),
        PackageRef::new("elm-explorations", "test"),
        PackageRef::new("elm-explorations", "markdown"),
    ]
}

/// Validate a package list: each entry well formed, no `author/name` twice
pub fn validate_packages(packages: &[PackageRef]) -> InitResult<()> {
    let mut seen = HashSet::new();
    for package in packages {
        package.validate()?;
        if !seen.insert((package.author.as_str(), package.name.as_str())) {
            return Err(package.invalid("listed more than once".to_string()));
        }
    }
    Ok(())
}

/// Paths of a package inside the local source tree
#[derive(Debug, Clone)]
pub struct SourceLayout {
    root: PathBuf,
}

impl SourceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn package_dir(&self, package: &PackageRef) -> PathBuf {
        self.root.join(package.source_dir_name())
    }

    pub fn src_dir(&self, package: &PackageRef) -> PathBuf {
        self.package_dir(package).join(SRC_DIR)
    }

    pub fn manifest(&self, package: &PackageRef) -> PathBuf {
        self.package_dir(package).join(MANIFEST_FILE)
    }

    /// Everything a cache entry is derived from
    pub fn inputs(&self, package: &PackageRef) -> Vec<PathBuf> {
        vec![self.src_dir(package), self.manifest(package)]
    }
}

/// Paths of a package inside the customised packages root
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn entry_dir(&self, package: &PackageRef) -> PathBuf {
        self.root.join(&package.author).join(&package.name)
    }

    pub fn src_dir(&self, package: &PackageRef) -> PathBuf {
        self.entry_dir(package).join(SRC_DIR)
    }

    pub fn manifest(&self, package: &PackageRef) -> PathBuf {
        self.entry_dir(package).join(MANIFEST_FILE)
    }

    pub fn tag_file(&self, package: &PackageRef) -> PathBuf {
        self.entry_dir(package).join(TAG_FILE)
    }
}
