//! Error types for project description and manifest operations.

use std::path::PathBuf;

/// Errors that can occur while loading or interpreting a project manifest.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading/writing manifest files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest file not found.
    #[error("manifest not found: {}", path.display())]
    NotFound {
        /// The path that was searched.
        path: PathBuf,
    },

    /// A manifest field holds a value the build model cannot use.
    #[error("invalid manifest field `{field}`: {detail}")]
    InvalidField {
        /// Dotted name of the offending field.
        field: String,
        /// Description of the problem.
        detail: String,
    },
}

/// Result type for project operations.
pub type Result<T> = std::result::Result<T, ProjectError>;
