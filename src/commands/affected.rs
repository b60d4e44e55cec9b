//! `skippy affected` - Compute affected modules per tool and write outputs
//!
//! This command:
//! - Loads the changed files (file, stdin or git diff)
//! - Resolves `global` plus every configured tool against the module graph
//! - Prints the result and writes the per-tool and merged artifacts
//!
//! Tool-level failures do not stop the other tools: their outputs are still
//! written, and the command then fails with the list of broken tools.

use crate::core::changes::{ChangeSet, ChangeSource};
use crate::core::context::RunContext;
use crate::core::error::{SkippyError, SkippyResult};
use crate::core::tool::ToolKind;
use crate::engine::{self, EngineOutcome};
use crate::graph::manifest::ModuleSource;
use crate::output::OutputWriter;
use crate::ui::progress::MultiProgress;
use serde_json::json;
use std::path::PathBuf;

/// Output format for affected command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  Text,
  Json,
  Names,
}

impl OutputFormat {
  pub fn parse(s: &str) -> SkippyResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::Names),
      _ => Err(SkippyError::message(format!(
        "Unknown format '{}'. Valid formats: text, json, names",
        s
      ))),
    }
  }
}

/// Options for one `affected` invocation.
#[derive(Debug, Default)]
pub struct AffectedOptions {
  pub changed_files: Option<PathBuf>,
  pub since: Option<String>,
  pub from: Option<String>,
  pub to: Option<String>,
  pub tools: Vec<String>,
  pub output: Option<PathBuf>,
  pub format: String,
  pub dry_run: bool,
  pub quiet: bool,
}

/// Run the affected command
pub fn run_affected(ctx: &RunContext, options: AffectedOptions) -> SkippyResult<()> {
  let format = OutputFormat::parse(&options.format)?;
  let only = options
    .tools
    .iter()
    .map(|name| name.parse::<ToolKind>())
    .collect::<SkippyResult<Vec<_>>>()?;

  let source = change_source(&options)?;
  let changes = ChangeSet::load(&source, &ctx.root)?;

  let progress = MultiProgress::for_terminal(options.quiet || format != OutputFormat::Text);
  let outcome = engine::run(ctx, &changes, &only, progress.as_ref())?;

  display_results(&ctx.source, &changes, &outcome, format)?;

  if options.dry_run {
    tracing::info!("dry run: outputs not written");
  } else {
    let output_root = ctx.output_root(options.output.as_deref());
    OutputWriter::new(output_root).write(&outcome.result, &ctx.graph)?;
  }

  match outcome.into_error() {
    Some(err) => Err(err),
    None => Ok(()),
  }
}

/// Pick the change source from the CLI flags.
///
/// `--since REF` compares `REF...HEAD`; `--from A` without `--to` also ends at `HEAD`.
pub fn change_source(options: &AffectedOptions) -> SkippyResult<ChangeSource> {
  if let Some(path) = &options.changed_files {
    if path.as_os_str() == "-" {
      return Ok(ChangeSource::Stdin);
    }
    return Ok(ChangeSource::File(path.clone()));
  }

  if let Some(since) = &options.since {
    return Ok(ChangeSource::Git {
      from: since.clone(),
      to: "HEAD".to_string(),
    });
  }

  if let Some(from) = &options.from {
    return Ok(ChangeSource::Git {
      from: from.clone(),
      to: options.to.clone().unwrap_or_else(|| "HEAD".to_string()),
    });
  }

  Err(SkippyError::with_help(
    "No change source given",
    "Pass --changed-files FILE (or - for stdin), --since REF, or --from A --to B.",
  ))
}

/// Display affected results
fn display_results(
  source: &ModuleSource,
  changes: &ChangeSet,
  outcome: &EngineOutcome,
  format: OutputFormat,
) -> SkippyResult<()> {
  match format {
    OutputFormat::Text => display_text(source, changes, outcome),
    OutputFormat::Json => display_json(changes, outcome),
    OutputFormat::Names => display_names(outcome),
  }
}

/// Display results in human-readable text format
fn display_text(source: &ModuleSource, changes: &ChangeSet, outcome: &EngineOutcome) -> SkippyResult<()> {
  println!("Affected Modules ({})", source);
  println!("================");
  println!();

  println!("Changed files: {}", changes.len());
  if !changes.is_empty() && changes.len() <= 20 {
    for file in changes.paths() {
      println!("  {}", file);
    }
  }
  println!();

  for entry in &outcome.result.entries {
    if let Some(trigger) = &entry.never_skip {
      println!(
        "{}: all {} modules (never-skip `{}` matched {})",
        entry.tool,
        entry.affected.len(),
        trigger.pattern,
        trigger.file
      );
    } else {
      println!(
        "{}: {} affected ({} direct)",
        entry.tool,
        entry.affected.len(),
        entry.direct.len()
      );
    }
    for id in &entry.affected {
      let marker = if entry.direct.contains(id) { "*" } else { " " };
      println!("  {} {}", marker, id);
    }
    if !entry.unowned.is_empty() {
      println!("  ({} changed files outside every module)", entry.unowned.len());
    }
    println!();
  }

  if outcome.result.merge_enabled() {
    println!("merged: {} affected", outcome.result.merged().len());
  }

  for failure in &outcome.failures {
    println!("{}: FAILED - {}", failure.tool, failure.error);
  }

  Ok(())
}

/// Display results in JSON format
fn display_json(changes: &ChangeSet, outcome: &EngineOutcome) -> SkippyResult<()> {
  let failures: Vec<_> = outcome
    .failures
    .iter()
    .map(|failure| json!({ "tool": failure.tool, "error": failure.error.to_string() }))
    .collect();

  let merged = outcome
    .result
    .merge_enabled()
    .then(|| outcome.result.merged());

  let output = json!({
    "changed_files": changes.paths(),
    "tools": outcome.result.entries,
    "merged": merged,
    "failures": failures,
  });

  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

/// Display the union of affected modules, one per line
fn display_names(outcome: &EngineOutcome) -> SkippyResult<()> {
  for id in outcome.result.all_affected() {
    println!("{}", id);
  }
  Ok(())
}
