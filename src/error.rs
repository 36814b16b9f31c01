// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MirrorError>;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provisioning failed for {path}: {source}")]
    Provisioning {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Repository sync failed: {0}")]
    Sync(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Suggestion rejected: {0}")]
    Suggestion(String),

    #[error("GitHub API error: {0}")]
    GitHub(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
