use crate::core::error::{ConfigError, ResultExt, SkippyError, SkippyResult};
use crate::core::tool::ToolKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for skippy
/// Searched in order: skippy.toml, .skippy.toml, .config/skippy.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkippyConfig {
  /// Module manifest (JSON) relative to the repository root.
  /// When absent, modules are read from the Cargo workspace at the root.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub modules: Option<PathBuf>,

  #[serde(default)]
  pub output: OutputConfig,

  /// Base patterns and flags inherited by every tool
  #[serde(default)]
  pub global: ToolSection,

  /// Tool-specific overlays, keyed by tool name
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub tools: BTreeMap<String, ToolSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
  /// Output root, relative to the repository root (default: build/skippy)
  #[serde(default = "default_output_dir")]
  pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
  PathBuf::from("build").join("skippy")
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      dir: default_output_dir(),
    }
  }
}

/// Patterns and flags of one `[global]` or `[tools.<name>]` table.
///
/// Unset flags fall through to the global table, then to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolSection {
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub include: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub exclude: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub never_skip: Vec<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub debug: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub compute_in_parallel: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub merge_outputs: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub include_all_if_empty: Option<bool>,
}

impl SkippyConfig {
  /// Find config file in search order: skippy.toml, .skippy.toml, .config/skippy.toml
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = [
      root.join("skippy.toml"),
      root.join(".skippy.toml"),
      root.join(".config").join("skippy.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from an explicit path, or search the repository root
  pub fn load(root: &Path, explicit: Option<&Path>) -> SkippyResult<Self> {
    let config_path = match explicit {
      Some(path) => root.join(path),
      None => Self::find_config_path(root).ok_or_else(|| {
        SkippyError::Config(ConfigError::NotFound {
          root: root.to_path_buf(),
        })
      })?,
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), tools = config.tools.len(), "loaded configuration");
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> SkippyResult<Self> {
    let config: SkippyConfig = toml_edit::de::from_str(content)?;
    config.tool_sections()?;
    Ok(config)
  }

  /// Tool sections keyed by their validated kind.
  ///
  /// # Errors
  /// Unknown tool names, `global` under `[tools]`, and aliases of the same tool.
  pub fn tool_sections(&self) -> SkippyResult<Vec<(ToolKind, &ToolSection)>> {
    let mut sections: Vec<(ToolKind, &ToolSection)> = Vec::with_capacity(self.tools.len());

    for (name, section) in &self.tools {
      let kind: ToolKind = name.parse()?;
      if kind == ToolKind::Global {
        return Err(SkippyError::with_help(
          "`global` cannot be configured under [tools]",
          "Move these settings to the top-level [global] table.",
        ));
      }
      if sections.iter().any(|(existing, _)| *existing == kind) {
        return Err(SkippyError::Config(ConfigError::DuplicateTool {
          name: kind.name().to_string(),
        }));
      }
      sections.push((kind, section));
    }

    sections.sort_by_key(|(kind, _)| *kind);
    Ok(sections)
  }

  /// Save config to skippy.toml at `root`
  pub fn save(&self, root: &Path) -> SkippyResult<PathBuf> {
    let config_path = root.join("skippy.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(config_path)
  }

  /// Check if config exists at the given root
  pub fn exists(root: &Path) -> bool {
    Self::find_config_path(root).is_some()
  }

  /// Starter configuration written by `skippy init`
  pub fn starter() -> Self {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    let mut tools = BTreeMap::new();
    tools.insert(
      ToolKind::UnitTest.name().to_string(),
      ToolSection {
        exclude: strings(&["**/src/androidTest/**"]),
        ..Default::default()
      },
    );
    tools.insert(
      ToolKind::Lint.name().to_string(),
      ToolSection {
        include: strings(&["**/lint.xml"]),
        ..Default::default()
      },
    );

    Self {
      modules: None,
      output: OutputConfig::default(),
      global: ToolSection {
        include: strings(&["**"]),
        exclude: strings(&["**/*.md", "docs/**"]),
        never_skip: strings(&[".github/**", "ci/**", "skippy.toml"]),
        compute_in_parallel: Some(true),
        merge_outputs: Some(true),
        ..Default::default()
      },
      tools,
    }
  }
}
