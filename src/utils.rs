//! Utility functions for cross-platform path handling

use std::path::Path;

/// Normalize a repository-relative path to the canonical form used for matching.
///
/// - Backslashes become forward slashes
/// - Leading `./` segments and duplicate separators are removed
/// - Trailing separators are dropped
/// - `.` alone (the repository root) becomes the empty string
pub fn normalize_path(path: &str) -> String {
  let unified = path.trim().replace('\\', "/");

  unified
    .split('/')
    .filter(|segment| !segment.is_empty() && *segment != ".")
    .collect::<Vec<_>>()
    .join("/")
}

/// Convert a path to canonical forward-slash form
pub fn path_to_slash(path: &Path) -> String {
  normalize_path(&path.to_string_lossy())
}

/// Whether `path` lies inside the directory `root` (segment-aware prefix match).
///
/// An empty root contains every path.
pub fn is_within(path: &str, root: &str) -> bool {
  if root.is_empty() {
    return true;
  }
  match path.strip_prefix(root) {
    Some(rest) => rest.is_empty() || rest.starts_with('/'),
    None => false,
  }
}
