//! Error types for scriptcovlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while collecting or reporting coverage
#[derive(Error, Debug)]
pub enum ScriptcovError {
    /// Failed to read a file (source text or coverage dump)
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Two manifest nodes share the same id
    #[error("duplicate node id {0} in instrumentation manifest")]
    DuplicateNodeId(u64),

    /// A coverage dump could not be decoded
    #[error("invalid coverage dump '{path}': {message}")]
    InvalidDump { path: PathBuf, message: String },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Unknown reporter name
    #[error("unknown reporter '{0}' (expected one of: cli, json, plain)")]
    UnknownReporter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
