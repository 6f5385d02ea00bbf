//! Error types for definition and alias loading.

use std::path::PathBuf;

use cmdtree_core::{FactoryError, ValidationError};
use thiserror::Error;

/// Errors that can occur while loading definitions.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// File extension is not one of `yaml`, `yml` or `json`.
    #[error("unsupported definition format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Malformed line in a user alias file.
    #[error("{}:{line}: {message}", .path.display())]
    AliasSyntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A recognised restriction had unusable parameters.
    #[error("invalid restriction on {scope}: {source}")]
    Restriction {
        scope: String,
        #[source]
        source: FactoryError,
    },

    /// The loaded tree failed structural validation.
    #[error("invalid definition: {}", join(.0))]
    InvalidMetadata(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
