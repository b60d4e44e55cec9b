//! Module metadata sources
//!
//! The host build system is read-only input. Two sources are supported:
//!
//! - **Manifest**: a JSON document exported by the host build
//!   (`{ "modules": [ { "id", "root", "dependencies", "capabilities" } ] }`)
//! - **Cargo**: workspace members read through `cargo metadata --no-deps`

use crate::core::error::{ResultExt, SkippyError, SkippyResult};
use crate::utils::{normalize_path, path_to_slash};
use cargo_metadata::MetadataCommand;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A tool capability a module declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
  UnitTest,
  AndroidTest,
  Lint,
  Detekt,
}

impl fmt::Display for Capability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Capability::UnitTest => write!(f, "unit_test"),
      Capability::AndroidTest => write!(f, "android_test"),
      Capability::Lint => write!(f, "lint"),
      Capability::Detekt => write!(f, "detekt"),
    }
  }
}

/// One module as described by the host build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
  pub id: String,
  /// Directory relative to the repository root; `""` or `"."` is the root itself
  pub root: String,
  #[serde(default)]
  pub dependencies: Vec<String>,
  #[serde(default)]
  pub capabilities: BTreeSet<Capability>,
}

/// Every module of the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
  pub modules: Vec<ModuleSpec>,
}

/// Where module metadata comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
  /// JSON manifest file
  Manifest(PathBuf),
  /// Cargo workspace rooted at this directory
  Cargo(PathBuf),
}

impl ModuleSource {
  /// Read the manifest from this source.
  pub fn load(&self) -> SkippyResult<ModuleManifest> {
    match self {
      ModuleSource::Manifest(path) => ModuleManifest::from_json_file(path),
      ModuleSource::Cargo(root) => ModuleManifest::from_cargo_workspace(root),
    }
  }
}

impl fmt::Display for ModuleSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ModuleSource::Manifest(path) => write!(f, "manifest {}", path.display()),
      ModuleSource::Cargo(root) => write!(f, "cargo workspace {}", root.display()),
    }
  }
}

impl ModuleManifest {
  /// Parse a JSON manifest. Roots are normalized to forward-slash form.
  pub fn from_json(content: &str) -> SkippyResult<Self> {
    let mut manifest: ModuleManifest = serde_json::from_str(content)?;
    for module in &mut manifest.modules {
      module.root = normalize_path(&module.root);
    }
    Ok(manifest)
  }

  pub fn from_json_file(path: &Path) -> SkippyResult<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read module manifest {}", path.display()))?;
    Self::from_json(&content).with_context(|| format!("Invalid module manifest {}", path.display()))
  }

  /// Workspace members of the Cargo workspace at `root`.
  ///
  /// Every member gets `unit_test` and `lint`; dependency edges of any kind
  /// (normal, dev, build) between members are kept.
  pub fn from_cargo_workspace(root: &Path) -> SkippyResult<Self> {
    let metadata = MetadataCommand::new()
      .manifest_path(root.join("Cargo.toml"))
      .no_deps()
      .exec()?;

    let workspace_root = metadata.workspace_root.as_std_path();
    let packages = metadata.workspace_packages();
    let member_names: HashSet<String> = packages.iter().map(|pkg| pkg.name.as_ref().to_string()).collect();

    let mut modules = Vec::with_capacity(packages.len());
    for package in packages {
      let manifest_path = package.manifest_path.clone().into_std_path_buf();
      let crate_dir = manifest_path
        .parent()
        .ok_or_else(|| SkippyError::message(format!("Manifest path has no parent: {}", manifest_path.display())))?;
      let relative = crate_dir.strip_prefix(workspace_root)?;

      let mut dependencies: Vec<String> = package
        .dependencies
        .iter()
        .filter(|dep| member_names.contains(dep.name.as_str()))
        .map(|dep| dep.name.clone())
        .collect();
      dependencies.sort();
      dependencies.dedup();

      modules.push(ModuleSpec {
        id: package.name.as_ref().to_string(),
        root: path_to_slash(relative),
        dependencies,
        capabilities: BTreeSet::from([Capability::UnitTest, Capability::Lint]),
      });
    }

    modules.sort_by(|a, b| a.id.cmp(&b.id));
    tracing::debug!(modules = modules.len(), root = %workspace_root.display(), "loaded cargo workspace");
    Ok(Self { modules })
  }
}
