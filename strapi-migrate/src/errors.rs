//! Error types for the migrator.

use std::path::{Path, PathBuf};

use content_store::ContentStoreError;
use thiserror::Error;

/// Errors that abort a migration or tool run.
///
/// Record-level problems (a malformed line, one record the store refused)
/// never surface here; they are logged and counted in the report.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A required input file or directory does not exist.
    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    /// Reading or writing a local file failed.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A whole input document could not be parsed.
    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Content store error.
    #[error("Content store error: {0}")]
    Store(#[from] ContentStoreError),
}

impl MigrateError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an IO error for `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A single line of a JSON-lines export that could not be turned into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number within its file.
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}
