//! Run context - build once, pass everywhere
//!
//! # Design
//!
//! A run has two phases. Phase one builds everything resolution needs:
//! configuration, module graph and output location. Phase two resolves each
//! tool against this context. Nothing in the context changes after it is
//! built, so it can be shared across the rayon pool without locks.
//!
//! ```text
//! main.rs:
//!   RunContext::build() -> &RunContext
//!   |
//!   v
//! engine.rs:
//!   run(ctx, changes) -> per-tool AffectedEntry
//! ```

use crate::core::config::SkippyConfig;
use crate::core::error::SkippyResult;
use crate::graph::manifest::ModuleSource;
use crate::graph::module_graph::ModuleGraph;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared, immutable inputs for one run.
#[derive(Clone)]
pub struct RunContext {
  /// Repository root (all changed paths are relative to it)
  pub root: PathBuf,

  /// Loaded skippy.toml
  pub config: Arc<SkippyConfig>,

  /// Module dependency graph
  pub graph: Arc<ModuleGraph>,

  /// Where the graph came from
  pub source: ModuleSource,
}

impl RunContext {
  /// Load config and module graph for `root`.
  ///
  /// `modules` overrides the manifest named in the config; without either,
  /// the Cargo workspace at `root` is used.
  pub fn build(root: &Path, config_path: Option<&Path>, modules: Option<&Path>) -> SkippyResult<Self> {
    let config = SkippyConfig::load(root, config_path)?;
    let source = module_source(root, modules.or(config.modules.as_deref()));
    let graph = load_graph(&source)?;

    Ok(Self {
      root: root.to_path_buf(),
      config: Arc::new(config),
      graph: Arc::new(graph),
      source,
    })
  }

  /// Output root for this run; `override_dir` wins over the config.
  pub fn output_root(&self, override_dir: Option<&Path>) -> PathBuf {
    self.root.join(override_dir.unwrap_or(&self.config.output.dir))
  }
}

/// Pick the module source: an explicit manifest, else the Cargo workspace.
pub fn module_source(root: &Path, manifest: Option<&Path>) -> ModuleSource {
  match manifest {
    Some(path) => ModuleSource::Manifest(root.join(path)),
    None => ModuleSource::Cargo(root.to_path_buf()),
  }
}

/// Load and build the module graph from `source`.
pub fn load_graph(source: &ModuleSource) -> SkippyResult<ModuleGraph> {
  let manifest = source.load()?;
  let graph = ModuleGraph::build(&manifest)?;
  tracing::debug!(source = %source, modules = graph.module_count(), "built module graph");
  Ok(graph)
}
