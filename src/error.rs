//! Error types for another-elm-init
//!
//! All modules use `InitResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for installer operations
pub type InitResult<T> = Result<T, InitError>;

/// All errors that can occur while installing another-elm
#[derive(Error, Debug)]
pub enum InitError {
    // Environment errors
    #[error("Could not determine the home directory")]
    HomeDirUnavailable,

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid package {package}: {reason}")]
    InvalidPackage { package: String, reason: String },

    // Package cache errors
    #[error("Package source not found: {0}")]
    SourceMissing(PathBuf),

    #[error("Package source changed while it was being scanned: {path}")]
    SourceVanished {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Another install is already running (lock held on {0})")]
    InstallInProgress(PathBuf),

    // Executable errors
    #[error("Executable template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Unknown placeholder `{name}` on line {line} of {path}")]
    UnknownPlaceholder {
        path: PathBuf,
        line: usize,
        name: String,
    },

    #[error("Line {line} of {path} carries the replace marker but is not a placeholder assignment")]
    MalformedPlaceholder { path: PathBuf, line: usize },

    #[error("Template {path} has no `{name}` placeholder")]
    PlaceholderAbsent { path: PathBuf, name: String },

    #[error("No value supplied for placeholder `{0}`")]
    MissingPlaceholderValue(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InitError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::HomeDirUnavailable => Some("Set HOME, or pass --dir and set XDG_DATA_HOME/ELM_HOME"),
            Self::SourceMissing(_) => {
                Some("Run from the another-elm checkout, or pass --source <DIR>")
            }
            Self::TemplateNotFound(_) => Some("Pass --source pointing at the another-elm checkout"),
            Self::SourceVanished { .. } => Some("The source tree changed mid-scan; run install again"),
            Self::InstallInProgress(_) => Some("Wait for the other install to finish"),
            Self::UnknownPlaceholder { .. } => {
                Some("The template references a placeholder this installer does not know")
            }
            Self::MalformedPlaceholder { .. } => {
                Some("Write placeholders as `<name> = None  # REPLACE ME`")
            }
            Self::PlaceholderAbsent { .. } => {
                Some("The template and this installer are out of sync; update the checkout")
            }
            _ => None,
        }
    }
}
