//! `skippy graph` - Inspect the module dependency graph
//!
//! Shows modules with their dependencies and capabilities, the build order
//! (or the cycles that prevent one), and answers "why does A depend on B?".

use crate::core::config::SkippyConfig;
use crate::core::context::{load_graph, module_source};
use crate::core::error::{SkippyError, SkippyResult};
use crate::graph::manifest::ModuleSource;
use crate::graph::module_graph::ModuleGraph;
use serde_json::json;
use std::path::Path;

/// Output format for graph command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GraphFormat {
  Text,
  Json,
  Dot,
}

impl GraphFormat {
  fn parse(s: &str) -> SkippyResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "dot" => Ok(Self::Dot),
      _ => Err(SkippyError::message(format!(
        "Unknown format '{}'. Valid formats: text, json, dot",
        s
      ))),
    }
  }
}

/// Run the graph command
///
/// The config file is optional here: without one, `--modules` or the Cargo
/// workspace at `root` supplies the graph.
pub fn run_graph(
  root: &Path,
  config_path: Option<&Path>,
  modules: Option<&Path>,
  format: String,
  why: Option<Vec<String>>,
) -> SkippyResult<()> {
  let format = GraphFormat::parse(&format)?;
  let source = graph_source(root, config_path, modules)?;
  let graph = load_graph(&source)?;

  if let Some(pair) = why {
    let [from, to] = pair.as_slice() else {
      return Err(SkippyError::message("--why expects exactly two module ids"));
    };
    return display_why(&graph, from, to, format);
  }

  match format {
    GraphFormat::Text => display_text(&graph, &source),
    GraphFormat::Json => display_json(&graph, &source),
    GraphFormat::Dot => {
      print!("{}", graph.to_dot());
      Ok(())
    }
  }
}

/// Module source from flags, then config, then the Cargo workspace.
fn graph_source(root: &Path, config_path: Option<&Path>, modules: Option<&Path>) -> SkippyResult<ModuleSource> {
  if modules.is_some() {
    return Ok(module_source(root, modules));
  }

  let config = if config_path.is_some() || SkippyConfig::exists(root) {
    Some(SkippyConfig::load(root, config_path)?)
  } else {
    None
  };

  let manifest = config.as_ref().and_then(|c| c.modules.as_deref());
  Ok(module_source(root, manifest))
}

fn display_text(graph: &ModuleGraph, source: &ModuleSource) -> SkippyResult<()> {
  println!("Module Graph ({})", source);
  println!("============");
  println!();

  println!("Modules: {}", graph.module_count());
  for node in graph.modules() {
    let capabilities: Vec<String> = node.capabilities.iter().map(|c| c.to_string()).collect();
    let root = if node.root.is_empty() { "." } else { node.root.as_str() };
    println!("  {} ({}) [{}]", node.id, root, capabilities.join(", "));
    for dep in graph.direct_dependencies(&node.id)? {
      println!("    → {}", dep);
    }
  }
  println!();

  if graph.cycles().is_empty() {
    println!("Build order (dependencies first):");
    for (i, id) in graph.topological_order()?.iter().enumerate() {
      println!("  {}. {}", i + 1, id);
    }
  } else {
    println!("Cycles: {}", graph.cycles().len());
    for cycle in graph.cycles() {
      println!("  ⚠ {}", cycle.join(" ↔ "));
    }
    println!();
    println!("Modules in a cycle are treated as mutually affected.");
  }

  Ok(())
}

fn display_json(graph: &ModuleGraph, source: &ModuleSource) -> SkippyResult<()> {
  let mut modules = Vec::with_capacity(graph.module_count());
  for node in graph.modules() {
    modules.push(json!({
      "id": node.id,
      "root": node.root,
      "capabilities": node.capabilities,
      "dependencies": graph.direct_dependencies(&node.id)?,
      "dependents": graph.direct_dependents(&node.id)?,
      "transitive_dependencies": graph.dependency_closure(&node.id)?,
    }));
  }

  let order = if graph.cycles().is_empty() {
    Some(graph.topological_order()?)
  } else {
    None
  };

  let output = json!({
    "source": source.to_string(),
    "modules": modules,
    "order": order,
    "cycles": graph.cycles(),
  });

  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

fn display_why(graph: &ModuleGraph, from: &str, to: &str, format: GraphFormat) -> SkippyResult<()> {
  let path = graph.why_depends_on(from, to)?;

  if format == GraphFormat::Json {
    let output = json!({ "from": from, "to": to, "path": path });
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  match path {
    Some(path) => println!("{}", path.join(" → ")),
    None => println!("{} does not depend on {}", from, to),
  }
  Ok(())
}
