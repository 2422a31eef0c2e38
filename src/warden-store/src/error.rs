//! Error types for warden-store.

use std::path::PathBuf;

use thiserror::Error;
use warden_policy::RuleError;

/// Failure of the backing store itself (connection, query, I/O).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query failed.
    #[error("store query failed: {0}")]
    Query(String),
}

/// Errors while loading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("permission row {index} is invalid: {source}")]
    InvalidRule {
        index: usize,
        #[source]
        source: RuleError,
    },

    #[error("role '{0}' is defined twice")]
    DuplicateRole(String),

    #[error("user {0} references unknown role '{1}'")]
    UnknownRole(i64, String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
