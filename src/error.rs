use std::path::PathBuf;
use thiserror::Error;

use crate::types::TypeMismatch;

#[derive(Debug, Error)]
pub enum ConfappError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("'{0}' is a hidden field and cannot be set from the command line")]
    HiddenField(String),

    #[error("{key}: valid values: {allowed}")]
    NotAllowed { key: String, allowed: String },

    #[error("{key}: {reason}")]
    Validation { key: String, reason: String },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Type mismatch for '{key}': {source}")]
    TypeMismatch { key: String, source: TypeMismatch },

    #[error("Unsupported config file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to serialize {path}: {reason}")]
    SerializeError { path: PathBuf, reason: String },

    #[error("Failed to access {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No config file specified, pass --config or set the config env var")]
    NoConfigFile,

    #[error("No configuration fields found")]
    NoFieldsFound,
}

impl ConfappError {
    /// True for errors raised by a field's own constraints. These only abort
    /// the operation that produced them.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConfappError::NotAllowed { .. } | ConfappError::Validation { .. }
        )
    }
}
