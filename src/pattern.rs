//! Glob pattern matching for changed files
//!
//! A [`PatternSet`] holds three compiled lists:
//!
//! - **include**: a file is a candidate if any include pattern matches
//! - **exclude**: applied after include; any match rejects the file
//! - **never_skip**: evaluated on its own and reported separately, never folded
//!   into [`PatternSet::matches`]
//!
//! Patterns use `glob` syntax with a literal separator: `*` stays within one path
//! segment, `**` spans directories. Matching is case-sensitive and expects
//! normalized forward-slash paths.

use crate::core::error::InvalidPatternError;
use glob::{MatchOptions, Pattern};
use serde::Serialize;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

/// An ordered list of compiled globs, keeping the source text for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct GlobList {
  patterns: Vec<(String, Pattern)>,
}

impl GlobList {
  /// Compile every pattern, failing on the first malformed one.
  pub fn compile(tool: &str, sources: &[String]) -> Result<Self, InvalidPatternError> {
    let patterns = sources
      .iter()
      .map(|source| {
        Pattern::new(source)
          .map(|compiled| (source.clone(), compiled))
          .map_err(|err| InvalidPatternError {
            tool: tool.to_string(),
            pattern: source.clone(),
            reason: err.msg.to_string(),
          })
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self { patterns })
  }

  /// First pattern (in declaration order) matching `path`.
  pub fn first_match(&self, path: &str) -> Option<&str> {
    self
      .patterns
      .iter()
      .find(|(_, pattern)| pattern.matches_with(path, MATCH_OPTIONS))
      .map(|(source, _)| source.as_str())
  }

  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }

  /// Source text of every pattern, in order.
  pub fn sources(&self) -> Vec<&str> {
    self.patterns.iter().map(|(source, _)| source.as_str()).collect()
  }
}

/// Compiled include / exclude / never-skip lists for one tool.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
  pub include: GlobList,
  pub exclude: GlobList,
  pub never_skip: GlobList,
  /// An empty include list matches everything only when this is set
  pub include_all_if_empty: bool,
}

/// Which patterns fired for a single path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub included_by: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub excluded_by: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub never_skip: Option<String>,
  /// Included and not excluded
  pub matched: bool,
}

impl PatternSet {
  /// Include-then-exclude decision for `path`. Never-skip is not consulted.
  pub fn matches(&self, path: &str) -> bool {
    self.included_by(path).is_some() && self.exclude.first_match(path).is_none()
  }

  /// The never-skip pattern matching `path`, if any.
  pub fn never_skip_match(&self, path: &str) -> Option<&str> {
    self.never_skip.first_match(path)
  }

  /// Full classification of `path` for diagnostics.
  pub fn classify(&self, path: &str) -> MatchOutcome {
    MatchOutcome {
      included_by: self.included_by(path).map(str::to_string),
      excluded_by: self.exclude.first_match(path).map(str::to_string),
      never_skip: self.never_skip_match(path).map(str::to_string),
      matched: self.matches(path),
    }
  }

  fn included_by(&self, path: &str) -> Option<&str> {
    if self.include.is_empty() {
      return self.include_all_if_empty.then_some("<all>");
    }
    self.include.first_match(path)
  }
}
