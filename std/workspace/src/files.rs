//! Listing, reading and writing files inside the workspace.
//!
//! All functions expect `config.root` to be canonical, which
//! [`WorkspaceServer::new`](crate::WorkspaceServer::new) guarantees.

use crate::classify::Operation;
use crate::config::WorkspaceConfig;
use crate::error::WorkspaceError;
use crate::validate::resolve_path;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Resolve `rel_path` and check it against the exclusion policy for `op`.
pub fn admit(
    config: &WorkspaceConfig,
    rel_path: &str,
    op: Operation,
) -> Result<PathBuf, WorkspaceError> {
    let path = resolve_path(rel_path, &config.root)?;
    let rel = path.strip_prefix(&config.root).unwrap_or(Path::new(""));
    let verdict = config.exclusions.classify(rel);
    if let Some(reason) = verdict.reason() {
        tracing::warn!(path = rel_path, ?op, %reason, "rejected inadmissible path");
        return Err(WorkspaceError::Inadmissible { path, reason });
    }
    Ok(path)
}

/// Recursively list regular files under the root, relative to it.
///
/// Excluded directories are not descended into, excluded suffixes are
/// dropped, and symlinks and other special files are skipped. Unreadable
/// directories and entries are logged and skipped rather than failing the
/// listing. The result is sorted and uses `/` as separator.
pub async fn list_files(config: &WorkspaceConfig) -> Vec<String> {
    let mut files = Vec::new();
    let mut pending = vec![config.root.clone()];

    while let Some(dir) = pending.pop() {
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };
        loop {
            let entry = match read_dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    // The directory stream cannot be resumed after an error.
                    tracing::debug!(dir = %dir.display(), error = %e, "skipping rest of unreadable directory");
                    break;
                }
            };
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "skipping inaccessible entry");
                    continue;
                }
            };
            let path = entry.path();
            if file_type.is_dir() {
                if !config
                    .exclusions
                    .is_excluded_dir(&entry.file_name().to_string_lossy())
                {
                    pending.push(path);
                }
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            let Ok(rel) = path.strip_prefix(&config.root) else {
                continue;
            };
            if config.exclusions.classify(rel).is_admitted() {
                files.push(to_slash(rel));
            }
        }
    }

    files.sort();
    tracing::debug!(count = files.len(), "listed workspace files");
    files
}

/// Read the full text of an admissible file.
///
/// The size is checked against `config.max_read_bytes` before the body is
/// loaded, and the content must be valid UTF-8.
pub async fn read_file(config: &WorkspaceConfig, rel_path: &str) -> Result<String, WorkspaceError> {
    let path = admit(config, rel_path, Operation::Read)?;

    let meta = match tokio::fs::metadata(&path).await {
        Ok(meta) => meta,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Err(WorkspaceError::NotFound(path));
        }
        Err(e) => return Err(e.into()),
    };
    if !meta.is_file() {
        return Err(WorkspaceError::NotAFile(path));
    }
    let size = meta.len();
    if size > config.max_read_bytes {
        return Err(WorkspaceError::TooLarge {
            path,
            size,
            limit: config.max_read_bytes,
        });
    }

    tracing::debug!(path = %path.display(), size, "reading file");
    let bytes = tokio::fs::read(&path).await?;
    String::from_utf8(bytes).map_err(|source| WorkspaceError::EncodingError { path, source })
}

/// Replace the entire content of an admissible file, creating it and any
/// missing parent directories. Returns the resolved absolute path.
pub async fn write_file(
    config: &WorkspaceConfig,
    rel_path: &str,
    content: &str,
) -> Result<PathBuf, WorkspaceError> {
    let path = admit(config, rel_path, Operation::Write)?;
    if path == config.root {
        return Err(WorkspaceError::NotAFile(path));
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, content.as_bytes()).await?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(path)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
