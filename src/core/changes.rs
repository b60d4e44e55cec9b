//! Change sets: the list of files touched by a change
//!
//! Paths are normalized on the way in (forward slashes, no `./`) and
//! deduplicated. Matching always walks the sorted view, so the order in which
//! CI produced the list never influences a result.

use crate::core::error::{SkippyError, SkippyResult};
use crate::core::vcs::SystemGit;
use crate::utils::normalize_path;
use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where the changed-file list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSource {
  /// Newline-delimited file of repository-relative paths
  File(PathBuf),
  /// Newline-delimited list on stdin
  Stdin,
  /// `git diff` between two refs (merge-base of `from` and `to`)
  Git { from: String, to: String },
}

impl fmt::Display for ChangeSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChangeSource::File(path) => write!(f, "{}", path.display()),
      ChangeSource::Stdin => write!(f, "stdin"),
      ChangeSource::Git { from, to } => write!(f, "git {}...{}", from, to),
    }
  }
}

/// Ordered, deduplicated set of changed paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
  /// First-seen order, for display
  ordered: Vec<String>,
  /// Sorted view, for matching
  sorted: BTreeSet<String>,
}

impl ChangeSet {
  pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
    let mut set = Self::default();
    for path in paths {
      let normalized = normalize_path(path);
      if normalized.is_empty() {
        continue;
      }
      if set.sorted.insert(normalized.clone()) {
        set.ordered.push(normalized);
      }
    }
    set
  }

  /// Parse a newline-delimited list. Blank lines are skipped.
  pub fn from_lines(text: &str) -> Self {
    Self::from_paths(text.lines())
  }

  /// Load the change set from `source`, resolving relative files against `root`.
  ///
  /// # Errors
  /// `InputUnavailable` when the file, stdin or git diff cannot be read.
  pub fn load(source: &ChangeSource, root: &Path) -> SkippyResult<Self> {
    let unavailable = |reason: String| SkippyError::InputUnavailable {
      source: source.to_string(),
      reason,
    };

    let changes = match source {
      ChangeSource::File(path) => {
        let text = std::fs::read_to_string(root.join(path)).map_err(|e| unavailable(e.to_string()))?;
        Self::from_lines(&text)
      }
      ChangeSource::Stdin => {
        let mut text = String::new();
        std::io::stdin()
          .read_to_string(&mut text)
          .map_err(|e| unavailable(e.to_string()))?;
        Self::from_lines(&text)
      }
      ChangeSource::Git { from, to } => {
        let files = SystemGit::open(root)
          .and_then(|git| git.changed_files_between(from, to))
          .map_err(|e| unavailable(e.to_string()))?;
        Self::from_paths(files.iter().map(String::as_str))
      }
    };

    tracing::debug!(source = %source, files = changes.len(), "loaded change set");
    Ok(changes)
  }

  /// Paths in first-seen order.
  pub fn paths(&self) -> &[String] {
    &self.ordered
  }

  /// Paths in sorted order.
  pub fn sorted(&self) -> impl Iterator<Item = &str> {
    self.sorted.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.ordered.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ordered.is_empty()
  }
}
