//! Process-wide configuration for the workspace server.
//!
//! A [`WorkspaceConfig`] is built once at startup and handed to
//! [`WorkspaceServer::new`](crate::WorkspaceServer::new). Nothing here is
//! read from global state, so tests can point a server at a temporary root.

use std::path::PathBuf;

/// Largest file, in bytes, that `read_file` will load.
pub const DEFAULT_MAX_READ_BYTES: u64 = 200_000;

/// Project manifest declaring the runnable scripts.
pub const DEFAULT_MANIFEST: &str = "package.json";

/// Directory names that are never listed, read or written.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", ".venv", ".mcp"];

/// File suffixes treated as binary, compressed or lock formats.
pub const DEFAULT_EXCLUDED_SUFFIXES: &[&str] = &[
    ".pyc", ".pyo", ".png", ".jpg", ".jpeg", ".gif", ".ico", ".zip", ".tgz", ".gz", ".lock",
];

/// Static exclusion rules applied by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    /// Excluded directory names, matched against every path segment.
    pub dirs: Vec<String>,
    /// Excluded suffixes including the leading dot, matched against the
    /// last extension of the file name.
    pub suffixes: Vec<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            suffixes: DEFAULT_EXCLUDED_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// How the external script runner is invoked.
///
/// A script `name` runs as `<program> <args...> run <name> -- --no-color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let program = if cfg!(windows) { "npm.cmd" } else { "npm" };
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

/// Immutable configuration shared by every tool call.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Workspace root. Canonicalized when the server is built.
    pub root: PathBuf,
    pub exclusions: ExclusionPolicy,
    pub max_read_bytes: u64,
    /// Manifest file name, relative to the root.
    pub manifest: String,
    pub runner: RunnerConfig,
    /// Encoding label for decoding script output. `None` uses the host locale.
    pub output_encoding: Option<String>,
}

impl WorkspaceConfig {
    /// Configuration with default limits and exclusions for the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclusions: ExclusionPolicy::default(),
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
            manifest: DEFAULT_MANIFEST.into(),
            runner: RunnerConfig::default(),
            output_encoding: None,
        }
    }
}
