//! Affected module resolution
//!
//! Given a change set and one tool's configuration, determine:
//! - Whether a never-skip pattern fired (then every module is affected)
//! - Which modules directly contain included, non-excluded changed files
//! - Which modules transitively depend on those (reverse closure)
//!
//! Each tool is resolved on its own; nothing is shared between resolutions
//! except the immutable graph and change set.

use super::manifest::Capability;
use super::module_graph::ModuleGraph;
use crate::core::changes::ChangeSet;
use crate::core::tool::{ToolConfig, ToolKind};
use crate::pattern::MatchOutcome;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// The never-skip pattern that forced "affect everything".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeverSkipTrigger {
  pub file: String,
  pub pattern: String,
}

/// How one changed file was classified for a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatch {
  pub path: String,
  pub module: String,
  #[serde(flatten)]
  pub outcome: MatchOutcome,
}

/// Resolution result for one tool.
#[derive(Debug, Clone, Serialize)]
pub struct AffectedEntry {
  pub tool: ToolKind,

  /// A never-skip pattern fired; `affected` holds every module
  pub skip_nothing: bool,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub never_skip: Option<NeverSkipTrigger>,

  /// Modules owning an included, non-excluded changed file
  pub direct: BTreeSet<String>,

  /// Direct modules plus all transitive dependents
  pub affected: BTreeSet<String>,

  /// Per-file classification (owned files only)
  pub files: Vec<FileMatch>,

  /// Changed files outside every module root
  pub unowned: Vec<String>,

  /// Whether this tool takes part in the merged output
  pub merge_outputs: bool,

  /// Whether diagnostics should be written for this tool
  pub debug: bool,

  #[serde(skip)]
  pub elapsed: Duration,
}

impl AffectedEntry {
  /// Affected modules declaring `capability`.
  pub fn with_capability(&self, graph: &ModuleGraph, capability: Capability) -> BTreeSet<String> {
    self
      .affected
      .iter()
      .filter(|id| graph.has_capability(id, capability))
      .cloned()
      .collect()
  }

  /// SHA-256 over the tool name and its sorted affected set.
  pub fn fingerprint(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.tool.name().as_bytes());
    for id in &self.affected {
      hasher.update(b"\n");
      hasher.update(id.as_bytes());
    }
    format!("{:x}", hasher.finalize())
  }
}

/// Resolution results for every tool that succeeded, ordered by tool.
#[derive(Debug, Clone, Default)]
pub struct AffectedResult {
  pub entries: Vec<AffectedEntry>,
}

impl AffectedResult {
  pub fn new(mut entries: Vec<AffectedEntry>) -> Self {
    entries.sort_by_key(|entry| entry.tool);
    Self { entries }
  }

  pub fn entry(&self, tool: ToolKind) -> Option<&AffectedEntry> {
    self.entries.iter().find(|entry| entry.tool == tool)
  }

  /// Whether any tool takes part in the merged output.
  pub fn merge_enabled(&self) -> bool {
    self.entries.iter().any(|entry| entry.merge_outputs)
  }

  /// Union of affected sets across tools with `merge_outputs`.
  pub fn merged(&self) -> BTreeSet<String> {
    self
      .entries
      .iter()
      .filter(|entry| entry.merge_outputs)
      .flat_map(|entry| entry.affected.iter().cloned())
      .collect()
  }

  /// Module → tools that marked it affected (merged tools only).
  pub fn provenance(&self) -> BTreeMap<String, BTreeSet<ToolKind>> {
    let mut provenance: BTreeMap<String, BTreeSet<ToolKind>> = BTreeMap::new();
    for entry in self.entries.iter().filter(|entry| entry.merge_outputs) {
      for id in &entry.affected {
        provenance.entry(id.clone()).or_default().insert(entry.tool);
      }
    }
    provenance
  }

  /// Union of affected sets across all tools.
  pub fn all_affected(&self) -> BTreeSet<String> {
    self
      .entries
      .iter()
      .flat_map(|entry| entry.affected.iter().cloned())
      .collect()
  }
}

/// Resolve the affected modules for one tool.
///
/// Algorithm:
/// 1. Any changed file matching never-skip ⇒ every module, stop
/// 2. Map files → owning modules; included and not excluded ⇒ direct
/// 3. Reverse-transitive closure of the direct set (fixed point)
///
/// Files are visited in sorted order, so the result never depends on input order.
pub fn resolve(changes: &ChangeSet, graph: &ModuleGraph, tool: &ToolConfig) -> AffectedEntry {
  let mut entry = AffectedEntry {
    tool: tool.kind,
    skip_nothing: false,
    never_skip: None,
    direct: BTreeSet::new(),
    affected: BTreeSet::new(),
    files: Vec::new(),
    unowned: Vec::new(),
    merge_outputs: tool.flags.merge_outputs,
    debug: tool.flags.debug,
    elapsed: Duration::ZERO,
  };

  // Step 1: never-skip short-circuits everything
  if let Some((file, pattern)) = changes
    .sorted()
    .find_map(|file| tool.patterns.never_skip_match(file).map(|pattern| (file, pattern)))
  {
    tracing::info!(tool = %tool.kind, file, pattern, "never-skip pattern matched; every module is affected");
    entry.skip_nothing = true;
    entry.never_skip = Some(NeverSkipTrigger {
      file: file.to_string(),
      pattern: pattern.to_string(),
    });
    entry.affected = graph.module_ids().into_iter().collect();
    return entry;
  }

  // Step 2: files → directly affected modules
  for file in changes.sorted() {
    let Some(module) = graph.owner_of(file) else {
      tracing::debug!(tool = %tool.kind, file, "changed file is outside every module root");
      entry.unowned.push(file.to_string());
      continue;
    };

    let outcome = tool.patterns.classify(file);
    if outcome.matched {
      entry.direct.insert(module.to_string());
    }
    entry.files.push(FileMatch {
      path: file.to_string(),
      module: module.to_string(),
      outcome,
    });
  }

  // Step 3: expand to every transitive dependent
  entry.affected = graph.dependent_closure(entry.direct.iter().map(String::as_str));

  tracing::debug!(
    tool = %tool.kind,
    direct = entry.direct.len(),
    affected = entry.affected.len(),
    "resolved affected modules"
  );

  entry
}
