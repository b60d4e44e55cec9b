//! Per-tool resolution pipeline
//!
//! For `global` and every configured tool: merge the global section into the
//! tool section, then resolve against the shared graph and change set.
//!
//! Tools whose merged `compute_in_parallel` flag is set run on the rayon pool,
//! the rest run in order. A malformed global pattern aborts the run before any
//! tool is resolved; a malformed tool-specific pattern only fails that tool.

use crate::core::changes::ChangeSet;
use crate::core::config::ToolSection;
use crate::core::context::RunContext;
use crate::core::error::{SkippyError, SkippyResult};
use crate::core::tool::{ToolConfig, ToolFlags, ToolKind};
use crate::graph::affected::{self, AffectedEntry, AffectedResult};
use crate::ui::progress::MultiProgress;
use rayon::prelude::*;
use std::time::Instant;

/// A tool that could not be resolved.
#[derive(Debug)]
pub struct ToolFailure {
  pub tool: ToolKind,
  pub error: SkippyError,
}

/// Successful entries plus isolated per-tool failures.
#[derive(Debug)]
pub struct EngineOutcome {
  pub result: AffectedResult,
  pub failures: Vec<ToolFailure>,
}

impl EngineOutcome {
  /// Turn per-tool failures into a single error after outputs are written.
  pub fn into_error(self) -> Option<SkippyError> {
    if self.failures.is_empty() {
      return None;
    }
    Some(SkippyError::ToolsFailed {
      tools: self.failures.iter().map(|f| f.tool.name().to_string()).collect(),
    })
  }
}

/// One unit of work: a tool and its raw section.
struct ToolJob<'a> {
  kind: ToolKind,
  section: &'a ToolSection,
}

/// Resolve `global` plus the configured tools (or only `only`, when non-empty).
///
/// # Errors
/// Fatal configuration problems: unknown tools, malformed global patterns.
pub fn run(
  ctx: &RunContext,
  changes: &ChangeSet,
  only: &[ToolKind],
  progress: Option<&MultiProgress>,
) -> SkippyResult<EngineOutcome> {
  let global = &ctx.config.global;
  let empty = ToolSection::default();

  // Global patterns are shared by every tool: fail fast before resolving anything
  ToolConfig::global(global)?;

  let mut jobs = vec![ToolJob {
    kind: ToolKind::Global,
    section: &empty,
  }];
  for (kind, section) in ctx.config.tool_sections()? {
    jobs.push(ToolJob { kind, section });
  }
  if !only.is_empty() {
    jobs.retain(|job| only.contains(&job.kind));
  }

  let (parallel, sequential): (Vec<ToolJob>, Vec<ToolJob>) = jobs
    .into_iter()
    .partition(|job| ToolFlags::merge(global, job.section).compute_in_parallel);

  tracing::debug!(
    parallel = parallel.len(),
    sequential = sequential.len(),
    files = changes.len(),
    "resolving tools"
  );

  let bars: Option<Vec<_>> = progress.map(|p| {
    parallel
      .iter()
      .chain(sequential.iter())
      .map(|job| p.add_bar(1, format!("Resolving {}", job.kind)))
      .collect()
  });

  let resolve_job = |index: usize, job: &ToolJob| -> (ToolKind, SkippyResult<AffectedEntry>) {
    let outcome = run_tool(ctx, changes, job);
    if let (Some(p), Some(bars)) = (progress, bars.as_ref()) {
      p.inc(&bars[index]);
    }
    (job.kind, outcome)
  };

  let mut outcomes: Vec<(ToolKind, SkippyResult<AffectedEntry>)> = parallel
    .par_iter()
    .enumerate()
    .map(|(index, job)| resolve_job(index, job))
    .collect();
  outcomes.extend(
    sequential
      .iter()
      .enumerate()
      .map(|(index, job)| resolve_job(parallel.len() + index, job)),
  );

  let mut entries = Vec::new();
  let mut failures = Vec::new();
  for (tool, outcome) in outcomes {
    match outcome {
      Ok(entry) => entries.push(entry),
      Err(error) => {
        tracing::error!(tool = %tool, error = %error, "tool resolution failed");
        failures.push(ToolFailure { tool, error });
      }
    }
  }
  failures.sort_by_key(|failure| failure.tool);

  Ok(EngineOutcome {
    result: AffectedResult::new(entries),
    failures,
  })
}

/// Merge + resolve for one tool.
fn run_tool(ctx: &RunContext, changes: &ChangeSet, job: &ToolJob) -> SkippyResult<AffectedEntry> {
  let started = Instant::now();
  let config = ToolConfig::merge(job.kind, &ctx.config.global, job.section)?;
  let mut entry = affected::resolve(changes, &ctx.graph, &config);
  entry.elapsed = started.elapsed();
  Ok(entry)
}
