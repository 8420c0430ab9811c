//! Materialize the another-elm executable from its template
//!
//! The template is a script with a few assignments marked for replacement:
//!
//! ```text
//! random_suffix = None  # REPLACE ME
//! ```
//!
//! A line is a placeholder when it assigns to a bare name and its trailing
//! comment is exactly the marker; spacing around `=` and `#` does not matter.
//! Any other line mentioning the marker is rejected, as are unknown names and
//! templates missing a required placeholder, so the rendered executable never
//! carries the marker.

use crate::error::{InitError, InitResult};
use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Template (in the source tree) and installed executable name
pub const EXECUTABLE_NAME: &str = "another-elm";

/// Comment marking a placeholder line
pub const REPLACE_MARKER: &str = "REPLACE ME";

/// Values the installer knows how to fill in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placeholder {
    RandomSuffix,
    AnotherElmVersion,
    ElmStdDir,
}

impl Placeholder {
    pub fn all() -> &'static [Self] {
        &[Self::RandomSuffix, Self::AnotherElmVersion, Self::ElmStdDir]
    }

    /// Variable name used in the template
    pub fn name(&self) -> &'static str {
        match self {
            Self::RandomSuffix => "random_suffix",
            Self::AnotherElmVersion => "another_elm_version",
            Self::ElmStdDir => "elm_std_dir",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.name() == name)
    }

    /// Whether every template must contain this placeholder
    pub fn is_required(&self) -> bool {
        !matches!(self, Self::ElmStdDir)
    }
}

/// Runtime values keyed by placeholder
#[derive(Debug, Clone, Default)]
pub struct PlaceholderValues(BTreeMap<Placeholder, String>);

impl PlaceholderValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        self.0.insert(placeholder, value.into());
        self
    }

    pub fn get(&self, placeholder: Placeholder) -> Option<&str> {
        self.0.get(&placeholder).map(String::as_str)
    }
}

/// What materializing the executable did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeReport {
    /// Placeholders substituted, in template order
    pub replaced: Vec<Placeholder>,
    /// Whether the executable's directory is on `PATH`
    pub on_search_path: bool,
}

/// A line carrying the replace marker
#[derive(Debug, PartialEq, Eq)]
struct MarkedLine<'a> {
    indent: &'a str,
    name: &'a str,
    ending: &'a str,
}

fn parse_marked(line: &str) -> Option<MarkedLine<'_>> {
    let body = line.trim_end_matches(['\n', '\r']);
    let ending = &line[body.len()..];

    let (code, comment) = body.rsplit_once('#')?;
    if comment.trim() != REPLACE_MARKER {
        return None;
    }
    let (target, _) = code.split_once('=')?;
    let name = target.trim();
    let is_identifier = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !is_identifier {
        return None;
    }

    let indent = &body[..body.len() - body.trim_start().len()];
    Some(MarkedLine {
        indent,
        name,
        ending,
    })
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Substitute every placeholder line in `template`.
///
/// `origin` only labels errors.
pub fn render(
    template: &str,
    values: &PlaceholderValues,
    origin: &Path,
) -> InitResult<(String, Vec<Placeholder>)> {
    let mut out = String::with_capacity(template.len());
    let mut replaced = Vec::new();

    for (index, line) in template.split_inclusive('\n').enumerate() {
        let Some(marked) = parse_marked(line) else {
            if line.contains(REPLACE_MARKER) {
                return Err(InitError::MalformedPlaceholder {
                    path: origin.to_path_buf(),
                    line: index + 1,
                });
            }
            out.push_str(line);
            continue;
        };

        let placeholder =
            Placeholder::from_name(marked.name).ok_or_else(|| InitError::UnknownPlaceholder {
                path: origin.to_path_buf(),
                line: index + 1,
                name: marked.name.to_string(),
            })?;
        let value = values
            .get(placeholder)
            .ok_or_else(|| InitError::MissingPlaceholderValue(placeholder.name().to_string()))?;

        out.push_str(marked.indent);
        out.push_str(marked.name);
        out.push_str(" = ");
        out.push_str(&quote(value));
        out.push_str(marked.ending);
        replaced.push(placeholder);
    }

    for placeholder in Placeholder::all() {
        if replaced.contains(placeholder) {
            continue;
        }
        if placeholder.is_required() {
            return Err(InitError::PlaceholderAbsent {
                path: origin.to_path_buf(),
                name: placeholder.name().to_string(),
            });
        }
        debug!("Template has no `{}` placeholder", placeholder.name());
    }

    Ok((out, replaced))
}

/// Render `template_path` into an executable at `output_path`.
///
/// The file is written to a temporary path in the destination directory and
/// renamed over the target, so readers never see a partial executable.
pub fn materialize(
    template_path: &Path,
    output_path: &Path,
    values: &PlaceholderValues,
) -> InitResult<MaterializeReport> {
    let template = fs::read_to_string(template_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => InitError::TemplateNotFound(template_path.to_path_buf()),
        _ => InitError::io(format!("reading template {}", template_path.display()), e),
    })?;
    let (rendered, replaced) = render(&template, values, template_path)?;

    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)
        .map_err(|e| InitError::io(format!("creating directory {}", dir.display()), e))?;

    write_executable(&dir, output_path, &rendered)?;
    debug!("Wrote executable {}", output_path.display());

    let on_search_path = on_search_path(&dir, env::var_os("PATH"));
    if !on_search_path {
        warn!("{} is not in PATH. Please add it!", dir.display());
    }

    Ok(MaterializeReport {
        replaced,
        on_search_path,
    })
}

fn write_executable(dir: &Path, output_path: &Path, contents: &str) -> InitResult<()> {
    let context = || format!("writing executable {}", output_path.display());

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| InitError::io(context(), e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.flush())
        .map_err(|e| InitError::io(context(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o755))
            .map_err(|e| InitError::io(context(), e))?;
    }

    tmp.persist(output_path)
        .map_err(|e| InitError::io(context(), e.error))?;
    Ok(())
}

/// Whether `dir` is one of the entries of a `PATH`-style variable
pub fn on_search_path(dir: &Path, path_var: Option<OsString>) -> bool {
    let Some(path_var) = path_var else {
        return false;
    };
    env::split_paths(&path_var).any(|entry| entry == dir)
}
