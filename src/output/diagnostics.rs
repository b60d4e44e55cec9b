//! Serializable diagnostics companions
//!
//! [`ToolDiagnostics`] carries everything a human needs to debug one tool's
//! decision, including wall-clock data. [`Provenance`] is deterministic and
//! describes the merged artifact.

use crate::core::tool::ToolKind;
use crate::graph::affected::{AffectedEntry, AffectedResult, FileMatch, NeverSkipTrigger};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Debug-mode companion for one tool's outputs.
#[derive(Debug, Serialize)]
pub struct ToolDiagnostics<'a> {
  pub tool: ToolKind,
  /// RFC 3339 timestamp; the reason this file is excluded from comparisons
  pub generated_at: String,
  pub elapsed_ms: u64,
  pub skip_nothing: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub never_skip: Option<&'a NeverSkipTrigger>,
  pub direct: &'a BTreeSet<String>,
  pub affected_count: usize,
  pub files: &'a [FileMatch],
  pub unowned: &'a [String],
}

impl<'a> ToolDiagnostics<'a> {
  pub fn new(entry: &'a AffectedEntry) -> Self {
    Self {
      tool: entry.tool,
      generated_at: chrono::Utc::now().to_rfc3339(),
      elapsed_ms: u64::try_from(entry.elapsed.as_millis()).unwrap_or(u64::MAX),
      skip_nothing: entry.skip_nothing,
      never_skip: entry.never_skip.as_ref(),
      direct: &entry.direct,
      affected_count: entry.affected.len(),
      files: &entry.files,
      unowned: &entry.unowned,
    }
  }
}

/// Per-tool summary inside the provenance file.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ToolSummary {
  pub fingerprint: String,
  pub affected_count: usize,
  pub skip_nothing: bool,
}

/// Which tools contributed each module of the merged artifact.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Provenance {
  pub tools: BTreeMap<ToolKind, ToolSummary>,
  pub modules: BTreeMap<String, BTreeSet<ToolKind>>,
}

impl Provenance {
  pub fn new(result: &AffectedResult) -> Self {
    let tools = result
      .entries
      .iter()
      .filter(|entry| entry.merge_outputs)
      .map(|entry| {
        (
          entry.tool,
          ToolSummary {
            fingerprint: entry.fingerprint(),
            affected_count: entry.affected.len(),
            skip_nothing: entry.skip_nothing,
          },
        )
      })
      .collect();

    Self {
      tools,
      modules: result.provenance(),
    }
  }
}
