//! Error types shared by the compiler stages.
use std::path::PathBuf;
use thiserror::Error;

/// The schema is structurally unsupported or internally inconsistent.
///
/// `path` is the dotted location of the offending node, starting at the
/// root type name (e.g. `config.properties.ports.items`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaError {
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("schema error at {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {message}")]
    Json { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
