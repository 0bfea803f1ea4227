//! Path resolution and containment for the workspace server.
//!
//! Every filesystem operation must pass through [`resolve_path`] to ensure
//! the requested path is the workspace root or one of its descendants.

use crate::error::WorkspaceError;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Component, MAIN_SEPARATOR_STR, Path, PathBuf};

/// Resolve a caller-supplied path against the canonical workspace `root`.
///
/// Steps:
/// 1. Reject paths containing null bytes
/// 2. Join the path onto the root (an absolute path replaces the root)
/// 3. Resolve it segment by segment against the disk, expanding every
///    symlink met on the way (dangling ones included) and folding `..`
///    into an already symlink-free prefix
/// 4. Verify the result is the root or lies beneath it
pub fn resolve_path(rel_path: &str, root: &Path) -> Result<PathBuf, WorkspaceError> {
    if rel_path.contains('\0') {
        return Err(WorkspaceError::NullByte);
    }

    let canonical = canonicalize_lenient(&root.join(rel_path))?;
    if !canonical.starts_with(root) {
        tracing::warn!(path = rel_path, resolved = %canonical.display(), "rejected path outside workspace");
        return Err(WorkspaceError::PathEscape(canonical));
    }

    Ok(canonical)
}

/// Symlinks followed while resolving a single path before giving up.
const MAX_SYMLINK_HOPS: usize = 40;

/// One owned segment of a path still to be resolved.
#[derive(Debug)]
enum Step {
    Prefix(OsString),
    Root,
    Parent,
    Name(OsString),
}

fn steps(path: &Path) -> Vec<Step> {
    path.components()
        .filter_map(|component| match component {
            Component::Prefix(prefix) => Some(Step::Prefix(prefix.as_os_str().to_owned())),
            Component::RootDir => Some(Step::Root),
            Component::CurDir => None,
            Component::ParentDir => Some(Step::Parent),
            Component::Normal(name) => Some(Step::Name(name.to_owned())),
        })
        .collect()
}

/// Canonicalize `path` like `realpath`, tolerating segments that do not
/// exist yet.
///
/// `resolved` never contains a symlink, so `..` pops it lexically. Missing
/// segments are kept as-is; later segments are still checked against the
/// disk since `..` can climb back into existing directories.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut pending = steps(path);
    pending.reverse();
    let mut resolved = PathBuf::new();
    let mut hops = 0;

    while let Some(step) = pending.pop() {
        match step {
            Step::Prefix(prefix) => resolved = PathBuf::from(prefix),
            Step::Root => resolved.push(MAIN_SEPARATOR_STR),
            Step::Parent => {
                resolved.pop();
            }
            Step::Name(name) => {
                let candidate = resolved.join(&name);
                match std::fs::symlink_metadata(&candidate) {
                    Ok(meta) if meta.file_type().is_symlink() => {
                        hops += 1;
                        if hops > MAX_SYMLINK_HOPS {
                            return Err(WorkspaceError::Io(std::io::Error::other(format!(
                                "too many levels of symbolic links: {}",
                                candidate.display()
                            ))));
                        }
                        // A relative target continues from the link's parent,
                        // which is `resolved`; an absolute one restarts at Root.
                        let target = std::fs::read_link(&candidate)?;
                        pending.extend(steps(&target).into_iter().rev());
                    }
                    Ok(_) => resolved = candidate,
                    Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                        resolved = candidate;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Ok(resolved)
}

/// Canonicalize the workspace root.
pub fn canonicalize_root(root: &Path) -> Result<PathBuf, WorkspaceError> {
    let canonical = root.canonicalize()?;
    if !canonical.is_dir() {
        return Err(WorkspaceError::Io(std::io::Error::new(
            ErrorKind::NotADirectory,
            format!("workspace root is not a directory: {}", canonical.display()),
        )));
    }
    Ok(canonical)
}
