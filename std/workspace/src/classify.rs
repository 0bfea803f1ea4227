//! File classification against the exclusion policy.
//!
//! Pure path inspection: nothing in this module touches the filesystem.

use crate::config::ExclusionPolicy;
use std::path::{Component, Path};

/// The kind of operation a path is being admitted for. The exclusion rules
/// are the same for all three; the kind is carried into logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Write,
}

/// Outcome of classifying a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admitted,
    /// A path segment names an excluded directory.
    ExcludedDir(String),
    /// The file carries an excluded suffix.
    ExcludedSuffix(String),
}

impl Verdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Verdict::Admitted)
    }

    /// Human-readable reason for a rejection.
    pub fn reason(&self) -> Option<String> {
        match self {
            Verdict::Admitted => None,
            Verdict::ExcludedDir(dir) => Some(format!("inside excluded directory `{dir}`")),
            Verdict::ExcludedSuffix(suffix) => Some(format!("excluded file type `{suffix}`")),
        }
    }
}

impl ExclusionPolicy {
    /// Classify `rel_path`, a path relative to the workspace root.
    ///
    /// The verdict applies to every [`Operation`]: excluded directories and
    /// excluded suffixes are refused by reads and writes and dropped from
    /// listings.
    pub fn classify(&self, rel_path: &Path) -> Verdict {
        for component in rel_path.components() {
            if let Component::Normal(name) = component {
                let name = name.to_string_lossy();
                if self.is_excluded_dir(&name) {
                    return Verdict::ExcludedDir(name.into_owned());
                }
            }
        }

        match self.excluded_suffix(rel_path) {
            Some(suffix) => Verdict::ExcludedSuffix(suffix),
            None => Verdict::Admitted,
        }
    }

    /// Whether `name` is an excluded directory name. Used to prune walks.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.dirs.iter().any(|dir| dir == name)
    }

    fn excluded_suffix(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_string_lossy();
        let suffix = format!(".{ext}");
        self.suffixes.iter().any(|s| *s == suffix).then_some(suffix)
    }
}
