//! `skippy tools` - Show the merged configuration of every tool
//!
//! Each tool is printed as it will actually be resolved: the global section
//! overlaid with its own section. Every pattern is compiled, so this doubles
//! as a config validator for CI.

use crate::core::config::{SkippyConfig, ToolSection};
use crate::core::error::SkippyResult;
use crate::core::tool::{ToolConfig, ToolKind};
use serde_json::json;

/// Run the tools command
pub fn run_tools(config: &SkippyConfig, json: bool) -> SkippyResult<()> {
  let merged = merge_all(config)?;

  if json {
    display_json(&merged)?;
  } else {
    display_text(&merged);
  }

  // Report the first broken tool; all of them were already printed
  match merged.into_iter().find_map(|(_, outcome)| outcome.err()) {
    Some(err) => Err(err),
    None => Ok(()),
  }
}

/// `global` plus every configured tool, merged and compiled.
fn merge_all(config: &SkippyConfig) -> SkippyResult<Vec<(ToolKind, SkippyResult<ToolConfig>)>> {
  let empty = ToolSection::default();
  let mut merged = vec![(ToolKind::Global, ToolConfig::merge(ToolKind::Global, &config.global, &empty))];

  for (kind, section) in config.tool_sections()? {
    merged.push((kind, ToolConfig::merge(kind, &config.global, section)));
  }
  Ok(merged)
}

fn display_text(merged: &[(ToolKind, SkippyResult<ToolConfig>)]) {
  for (kind, outcome) in merged {
    match outcome {
      Ok(tool) => {
        println!("{}", kind);
        print_list("include", &tool.patterns.include.sources());
        print_list("exclude", &tool.patterns.exclude.sources());
        print_list("never_skip", &tool.patterns.never_skip.sources());
        println!(
          "  debug={} compute_in_parallel={} merge_outputs={} include_all_if_empty={}",
          tool.flags.debug, tool.flags.compute_in_parallel, tool.flags.merge_outputs, tool.flags.include_all_if_empty
        );
      }
      Err(err) => println!("{} (invalid)\n  {}", kind, err),
    }
    println!();
  }
}

fn print_list(label: &str, patterns: &[&str]) {
  if patterns.is_empty() {
    println!("  {}: (none)", label);
  } else {
    println!("  {}: {}", label, patterns.join(", "));
  }
}

fn display_json(merged: &[(ToolKind, SkippyResult<ToolConfig>)]) -> SkippyResult<()> {
  let tools: Vec<_> = merged
    .iter()
    .map(|(kind, outcome)| match outcome {
      Ok(tool) => json!({
        "tool": kind,
        "valid": true,
        "include": tool.patterns.include.sources(),
        "exclude": tool.patterns.exclude.sources(),
        "never_skip": tool.patterns.never_skip.sources(),
        "flags": tool.flags,
      }),
      Err(err) => json!({
        "tool": kind,
        "valid": false,
        "error": err.to_string(),
      }),
    })
    .collect();

  println!("{}", serde_json::to_string_pretty(&tools)?);
  Ok(())
}
