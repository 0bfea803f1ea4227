//! Errors surfaced by the workspace tools.

use std::path::PathBuf;
use thiserror::Error;

/// Every failure a workspace tool call can report back to the caller.
///
/// Messages carry enough context (the path, the size and limit, the known
/// script names) for the caller to correct the request without asking again.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// The path contains a null byte.
    #[error("path contains null byte")]
    NullByte,
    /// The resolved path lies outside the workspace root.
    #[error("path escapes the workspace root: {0}")]
    PathEscape(PathBuf),
    /// The path is excluded by directory or suffix rules.
    #[error("path is not accessible through the workspace tools ({reason}): {path}")]
    Inadmissible { path: PathBuf, reason: String },
    /// The file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    /// The path exists but is not a regular file.
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),
    /// The file exceeds the read size limit.
    #[error("file too large ({size} bytes > {limit} bytes): {path}")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    /// The file content is not valid UTF-8.
    #[error("file is not valid UTF-8 ({source}): {path}")]
    EncodingError {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },
    /// The project manifest does not exist.
    #[error("manifest not found: {0}")]
    ManifestNotFound(PathBuf),
    /// The project manifest could not be parsed.
    #[error("manifest is invalid: {0}")]
    ManifestInvalid(String),
    /// The requested script is not defined in the manifest.
    #[error("script `{script}` is not defined in the manifest scripts.\ndefined scripts: {}", .available.join(", "))]
    UnknownScript {
        script: String,
        available: Vec<String>,
    },
    /// The script runner could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// Any other I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
