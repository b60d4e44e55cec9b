//! Output writer for affected-module artifacts
//!
//! Layout under the output root:
//!
//! ```text
//! <root>/<tool>/affected_projects.txt
//! <root>/<tool>/affected_android_test_projects.txt   (global, android_test)
//! <root>/<tool>/diagnostics.json                     (debug only)
//! <root>/merged/affected_projects.txt                (merge_outputs)
//! <root>/merged/provenance.json                      (merge_outputs)
//! ```
//!
//! Everything except `diagnostics.json` is a pure function of the result, and
//! files whose content is unchanged are not rewritten, so build caches keyed
//! on content or mtime stay warm across identical runs. Artifacts a previous
//! run produced but this result does not (failed or filtered tools, debug or
//! merging switched off) are removed.

use super::diagnostics::{Provenance, ToolDiagnostics};
use crate::core::error::{ResultExt, SkippyResult};
use crate::core::tool::ToolKind;
use crate::graph::affected::{AffectedEntry, AffectedResult};
use crate::graph::manifest::Capability;
use crate::graph::module_graph::ModuleGraph;
use std::fs;
use std::path::{Path, PathBuf};

pub const AFFECTED_PROJECTS: &str = "affected_projects.txt";
pub const AFFECTED_ANDROID_TEST_PROJECTS: &str = "affected_android_test_projects.txt";
pub const DIAGNOSTICS: &str = "diagnostics.json";
pub const PROVENANCE: &str = "provenance.json";
pub const MERGED_DIR: &str = "merged";

/// Files touched by one write.
#[derive(Debug, Default)]
pub struct WriteSummary {
  /// Created or whose content changed
  pub written: Vec<PathBuf>,
  /// Already up to date
  pub unchanged: Vec<PathBuf>,
  /// Left over from an earlier run and deleted
  pub removed: Vec<PathBuf>,
}

/// Writes results under a fixed output root.
pub struct OutputWriter {
  root: PathBuf,
}

impl OutputWriter {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Write per-tool artifacts, then the merged artifact when enabled.
  pub fn write(&self, result: &AffectedResult, graph: &ModuleGraph) -> SkippyResult<WriteSummary> {
    let mut summary = WriteSummary::default();

    for kind in ToolKind::ALL {
      match result.entry(kind) {
        Some(entry) => self.write_tool(entry, graph, &mut summary)?,
        None => self.remove_all(
          &self.root.join(kind.name()),
          &[AFFECTED_PROJECTS, AFFECTED_ANDROID_TEST_PROJECTS, DIAGNOSTICS],
          &mut summary,
        )?,
      }
    }

    let merged_dir = self.root.join(MERGED_DIR);
    if result.merge_enabled() {
      self.write_file(&merged_dir.join(AFFECTED_PROJECTS), &render_ids(&result.merged()), &mut summary)?;

      let provenance = serde_json::to_string_pretty(&Provenance::new(result))? + "\n";
      self.write_file(&merged_dir.join(PROVENANCE), &provenance, &mut summary)?;
    } else {
      self.remove_all(&merged_dir, &[AFFECTED_PROJECTS, PROVENANCE], &mut summary)?;
    }

    tracing::info!(
      root = %self.root.display(),
      written = summary.written.len(),
      unchanged = summary.unchanged.len(),
      removed = summary.removed.len(),
      "wrote affected outputs"
    );
    Ok(summary)
  }

  fn write_tool(&self, entry: &AffectedEntry, graph: &ModuleGraph, summary: &mut WriteSummary) -> SkippyResult<()> {
    let tool_dir = self.root.join(entry.tool.name());

    self.write_file(&tool_dir.join(AFFECTED_PROJECTS), &render_ids(&entry.affected), summary)?;

    if entry.tool.emits_android_test_subset() {
      let subset = entry.with_capability(graph, Capability::AndroidTest);
      self.write_file(&tool_dir.join(AFFECTED_ANDROID_TEST_PROJECTS), &render_ids(&subset), summary)?;
    }

    if entry.debug {
      let diagnostics = serde_json::to_string_pretty(&ToolDiagnostics::new(entry))? + "\n";
      self.write_file(&tool_dir.join(DIAGNOSTICS), &diagnostics, summary)?;
    } else {
      self.remove_file(&tool_dir.join(DIAGNOSTICS), summary)?;
    }

    Ok(())
  }

  /// Remove the named skippy artifacts in `dir`, then `dir` itself if that left it empty.
  ///
  /// Only files skippy writes are deleted; anything else keeps the directory.
  fn remove_all(&self, dir: &Path, names: &[&str], summary: &mut WriteSummary) -> SkippyResult<()> {
    if !dir.is_dir() {
      return Ok(());
    }

    for name in names {
      self.remove_file(&dir.join(name), summary)?;
    }

    let is_empty = fs::read_dir(dir)
      .with_context(|| format!("Failed to read {}", dir.display()))?
      .next()
      .is_none();
    if is_empty {
      fs::remove_dir(dir).with_context(|| format!("Failed to remove {}", dir.display()))?;
    }
    Ok(())
  }

  fn remove_file(&self, path: &Path, summary: &mut WriteSummary) -> SkippyResult<()> {
    if !path.is_file() {
      return Ok(());
    }

    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    tracing::debug!(path = %path.display(), "removed stale output");
    summary.removed.push(path.to_path_buf());
    Ok(())
  }

  /// Write `content` to `path` unless the file already holds exactly that.
  fn write_file(&self, path: &Path, content: &str, summary: &mut WriteSummary) -> SkippyResult<()> {
    if fs::read(path).is_ok_and(|existing| existing == content.as_bytes()) {
      summary.unchanged.push(path.to_path_buf());
      return Ok(());
    }

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    summary.written.push(path.to_path_buf());
    Ok(())
  }
}

/// One id per line, each newline-terminated; empty set → empty file.
pub fn render_ids<'a>(ids: impl IntoIterator<Item = &'a String>) -> String {
  let mut out = String::new();
  for id in ids {
    out.push_str(id);
    out.push('\n');
  }
  out
}
