//! Per-tool configuration: tool kinds and the global → tool merge
//!
//! Every resolved [`ToolConfig`] is the global section overlaid with the
//! tool-specific section:
//!
//! - pattern lists are unioned, global patterns first, duplicates dropped
//! - scalar flags take the tool value, then the global value, then the default
//!
//! Merging is pure, so tools can be merged and resolved on separate threads.

use crate::core::config::ToolSection;
use crate::core::error::{SkippyError, SkippyResult};
use crate::pattern::{GlobList, PatternSet};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A consuming tool. `Global` is the base every other tool inherits from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
  Global,
  Lint,
  Detekt,
  UnitTest,
  AndroidTest,
}

impl ToolKind {
  /// Every tool, `Global` first.
  pub const ALL: [ToolKind; 5] = [
    ToolKind::Global,
    ToolKind::Lint,
    ToolKind::Detekt,
    ToolKind::UnitTest,
    ToolKind::AndroidTest,
  ];

  /// Tools that may appear as `[tools.<name>]` tables.
  pub const CONFIGURABLE: [ToolKind; 4] = [ToolKind::Lint, ToolKind::Detekt, ToolKind::UnitTest, ToolKind::AndroidTest];

  /// Canonical name, also used as the output directory.
  pub fn name(self) -> &'static str {
    match self {
      ToolKind::Global => "global",
      ToolKind::Lint => "lint",
      ToolKind::Detekt => "detekt",
      ToolKind::UnitTest => "unit_test",
      ToolKind::AndroidTest => "android_test",
    }
  }

  /// Whether `affected_android_test_projects.txt` is written for this tool.
  pub fn emits_android_test_subset(self) -> bool {
    matches!(self, ToolKind::Global | ToolKind::AndroidTest)
  }
}

impl fmt::Display for ToolKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for ToolKind {
  type Err = SkippyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "global" => Ok(ToolKind::Global),
      "lint" => Ok(ToolKind::Lint),
      "detekt" => Ok(ToolKind::Detekt),
      "unit_test" | "unit-test" | "unitTest" => Ok(ToolKind::UnitTest),
      "android_test" | "android-test" | "androidTest" => Ok(ToolKind::AndroidTest),
      _ => Err(SkippyError::Config(crate::core::error::ConfigError::UnknownTool {
        name: s.to_string(),
      })),
    }
  }
}

/// Scalar flags after merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolFlags {
  pub debug: bool,
  pub compute_in_parallel: bool,
  pub merge_outputs: bool,
  pub include_all_if_empty: bool,
}

impl Default for ToolFlags {
  fn default() -> Self {
    Self {
      debug: false,
      compute_in_parallel: true,
      merge_outputs: false,
      include_all_if_empty: false,
    }
  }
}

impl ToolFlags {
  /// Tool value, else global value, else default.
  pub fn merge(global: &ToolSection, tool: &ToolSection) -> Self {
    let defaults = Self::default();
    Self {
      debug: tool.debug.or(global.debug).unwrap_or(defaults.debug),
      compute_in_parallel: tool
        .compute_in_parallel
        .or(global.compute_in_parallel)
        .unwrap_or(defaults.compute_in_parallel),
      merge_outputs: tool
        .merge_outputs
        .or(global.merge_outputs)
        .unwrap_or(defaults.merge_outputs),
      include_all_if_empty: tool
        .include_all_if_empty
        .or(global.include_all_if_empty)
        .unwrap_or(defaults.include_all_if_empty),
    }
  }
}

/// A fully merged, compiled tool configuration.
#[derive(Debug, Clone)]
pub struct ToolConfig {
  pub kind: ToolKind,
  pub patterns: PatternSet,
  pub flags: ToolFlags,
}

impl ToolConfig {
  /// Overlay `global` onto `tool` and compile the resulting patterns.
  ///
  /// # Errors
  /// `InvalidPattern` naming the offending pattern and this tool.
  pub fn merge(kind: ToolKind, global: &ToolSection, tool: &ToolSection) -> SkippyResult<Self> {
    let flags = ToolFlags::merge(global, tool);
    let name = kind.name();

    let patterns = PatternSet {
      include: GlobList::compile(name, &union(&global.include, &tool.include))?,
      exclude: GlobList::compile(name, &union(&global.exclude, &tool.exclude))?,
      never_skip: GlobList::compile(name, &union(&global.never_skip, &tool.never_skip))?,
      include_all_if_empty: flags.include_all_if_empty,
    };

    Ok(Self { kind, patterns, flags })
  }

  /// The global section resolved as a tool of its own.
  pub fn global(global: &ToolSection) -> SkippyResult<Self> {
    Self::merge(ToolKind::Global, global, &ToolSection::default())
  }
}

/// Order-preserving union, `first` before `second`, duplicates removed by equality.
fn union(first: &[String], second: &[String]) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(first.len() + second.len());
  for pattern in first.iter().chain(second) {
    if !out.contains(pattern) {
      out.push(pattern.clone());
    }
  }
  out
}
