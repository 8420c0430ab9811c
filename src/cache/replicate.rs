//! Copy a package tree while rewriting it for one installed instance
//!
//! Content rules are literal substring replacements applied line by line, in
//! order, replacing every occurrence. The namespace directory is renamed as
//! well so the generated layout diverges per instance, not only the text.

use crate::error::{InitError, InitResult};
use crate::store::Store;
use std::path::Path;
use tracing::debug;

/// Internal module namespace shared by concurrently installed instances
pub const NAMESPACE_PREFIX: &str = "Platform.Unstable";

/// Directory holding the namespace's modules
pub const NAMESPACE_DIR: &str = "Unstable";

/// Token stamped with the installed version
pub const VERSION_TOKEN: &str = "ANOTHER-ELM-VERSION";

/// A single literal replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRule {
    pub from: String,
    pub to: String,
}

/// Rewrites applied while replicating a tree
#[derive(Debug, Clone, Default)]
pub struct Rewrite {
    content: Vec<ContentRule>,
    renamed_dirs: Vec<(String, String)>,
}

impl Rewrite {
    /// No rewriting at all; a plain copy
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrites for a customised package: namespace suffix and version stamp
    pub fn for_package(suffix: &str, version: &str) -> Self {
        Self::new()
            .replace(
                format!("{}.", NAMESPACE_PREFIX),
                format!("{}{}.", NAMESPACE_PREFIX, suffix),
            )
            .replace(VERSION_TOKEN, version)
            .rename_dir(NAMESPACE_DIR, format!("{}{}", NAMESPACE_DIR, suffix))
    }

    /// Append a content rule; rules run in insertion order
    pub fn replace(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.content.push(ContentRule {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Rename every directory called `name`, at any depth
    pub fn rename_dir(mut self, name: impl Into<String>, to: impl Into<String>) -> Self {
        self.renamed_dirs.push((name.into(), to.into()));
        self
    }

    pub fn apply_line(&self, line: &str) -> String {
        self.content
            .iter()
            .fold(line.to_string(), |acc, rule| acc.replace(&rule.from, &rule.to))
    }

    /// Apply content rules to every line, keeping line endings intact
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for line in text.split_inclusive('\n') {
            out.push_str(&self.apply_line(line));
        }
        out
    }

    fn dir_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.renamed_dirs
            .iter()
            .find(|(from, _)| from == name)
            .map(|(_, to)| to.as_str())
            .unwrap_or(name)
    }
}

/// Mirror `src` into `dst`, creating directories as needed.
///
/// Existing destination directories are reused. Any error aborts the copy,
/// leaving whatever was written so far; callers must not mark the
/// destination as up to date unless this returns `Ok`.
///
/// Returns the number of files written.
pub fn replicate<S: Store + ?Sized>(
    store: &S,
    src: &Path,
    dst: &Path,
    rewrite: &Rewrite,
) -> InitResult<usize> {
    store
        .create_dir_all(dst)
        .map_err(|e| InitError::io(format!("creating directory {}", dst.display()), e))?;

    let entries = store
        .read_dir(src)
        .map_err(|e| InitError::io(format!("listing {}", src.display()), e))?;

    let mut copied = 0;
    for entry in entries {
        if entry.is_dir {
            let target = dst.join(rewrite.dir_name(&entry.name));
            copied += replicate(store, &entry.path, &target, rewrite)?;
        } else {
            copy_file(store, &entry.path, &dst.join(&entry.name), rewrite)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy one UTF-8 file through the content rules
pub fn copy_file<S: Store + ?Sized>(
    store: &S,
    src: &Path,
    dst: &Path,
    rewrite: &Rewrite,
) -> InitResult<()> {
    let text = store
        .read_to_string(src)
        .map_err(|e| InitError::io(format!("reading {}", src.display()), e))?;
    store
        .write(dst, &rewrite.apply(&text))
        .map_err(|e| InitError::io(format!("writing {}", dst.display()), e))?;
    debug!("Copied {} -> {}", src.display(), dst.display());
    Ok(())
}
