//! Error types for skippy with contextual messages and exit codes
//!
//! Every error maps to a process exit code and, where useful, a help line that
//! tells CI maintainers what to do next.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for skippy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, malformed patterns)
  User = 1,
  /// System error (I/O, git)
  System = 2,
  /// Some tools failed while others were computed and written
  Partial = 3,
  /// Changed-file input missing or unreadable; callers should fall back to "affect everything"
  InputUnavailable = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for skippy
#[derive(Debug)]
pub enum SkippyError {
  /// Configuration errors
  Config(ConfigError),

  /// Malformed glob pattern
  Pattern(InvalidPatternError),

  /// Module graph errors
  Graph(GraphError),

  /// The changed-file list could not be obtained
  InputUnavailable { source: String, reason: String },

  /// One or more tools failed to resolve
  ToolsFailed { tools: Vec<String> },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl SkippyError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    SkippyError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    SkippyError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      SkippyError::Message { message, context, help } => SkippyError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      SkippyError::Io(err) => SkippyError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      SkippyError::Config(_) => ExitCode::User,
      SkippyError::Pattern(_) => ExitCode::User,
      SkippyError::Graph(_) => ExitCode::User,
      SkippyError::InputUnavailable { .. } => ExitCode::InputUnavailable,
      SkippyError::ToolsFailed { .. } => ExitCode::Partial,
      SkippyError::Io(_) => ExitCode::System,
      SkippyError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      SkippyError::Config(e) => e.help_message(),
      SkippyError::Pattern(_) => Some(
        "Patterns use glob syntax: `**` must be a whole path segment (e.g. `src/**/*.kt`).".to_string(),
      ),
      SkippyError::Graph(e) => e.help_message(),
      SkippyError::InputUnavailable { .. } => {
        Some("Treat every module as affected for this run (no modules can safely be skipped).".to_string())
      }
      SkippyError::ToolsFailed { .. } => {
        Some("Outputs for the remaining tools were written. Fix the failing tool sections and re-run.".to_string())
      }
      SkippyError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for SkippyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SkippyError::Config(e) => write!(f, "{}", e),
      SkippyError::Pattern(e) => write!(f, "{}", e),
      SkippyError::Graph(e) => write!(f, "{}", e),
      SkippyError::InputUnavailable { source, reason } => {
        write!(f, "Changed-file input unavailable ({}): {}", source, reason)
      }
      SkippyError::ToolsFailed { tools } => write!(f, "Failed to resolve tools: {}", tools.join(", ")),
      SkippyError::Io(e) => write!(f, "I/O error: {}", e),
      SkippyError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for SkippyError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      SkippyError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for SkippyError {
  fn from(err: io::Error) -> Self {
    SkippyError::Io(err)
  }
}

impl From<String> for SkippyError {
  fn from(msg: String) -> Self {
    SkippyError::message(msg)
  }
}

impl From<&str> for SkippyError {
  fn from(msg: &str) -> Self {
    SkippyError::message(msg)
  }
}

impl From<ConfigError> for SkippyError {
  fn from(err: ConfigError) -> Self {
    SkippyError::Config(err)
  }
}

impl From<GraphError> for SkippyError {
  fn from(err: GraphError) -> Self {
    SkippyError::Graph(err)
  }
}

impl From<InvalidPatternError> for SkippyError {
  fn from(err: InvalidPatternError) -> Self {
    SkippyError::Pattern(err)
  }
}

impl From<toml_edit::de::Error> for SkippyError {
  fn from(err: toml_edit::de::Error) -> Self {
    SkippyError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for SkippyError {
  fn from(err: toml_edit::ser::Error) -> Self {
    SkippyError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for SkippyError {
  fn from(err: serde_json::Error) -> Self {
    SkippyError::message(format!("JSON error: {}", err))
  }
}

impl From<cargo_metadata::Error> for SkippyError {
  fn from(err: cargo_metadata::Error) -> Self {
    SkippyError::message(format!("Cargo metadata error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for SkippyError {
  fn from(err: std::path::StripPrefixError) -> Self {
    SkippyError::message(format!("Path strip prefix error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// skippy.toml not found
  NotFound { root: PathBuf },

  /// A `[tools.<name>]` table names a tool skippy does not know
  UnknownTool { name: String },

  /// Two `[tools.*]` tables resolve to the same tool (e.g. `unit_test` and `unitTest`)
  DuplicateTool { name: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `skippy init` to create a configuration file.".to_string()),
      ConfigError::UnknownTool { .. } => Some(format!(
        "Valid tool tables are: {}",
        crate::core::tool::ToolKind::CONFIGURABLE
          .iter()
          .map(|kind| format!("[tools.{}]", kind.name()))
          .collect::<Vec<_>>()
          .join(", ")
      )),
      ConfigError::DuplicateTool { .. } => Some("Keep a single table per tool.".to_string()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { root } => {
        write!(
          f,
          "No skippy configuration found.\nSearched: {0}/skippy.toml, {0}/.skippy.toml, {0}/.config/skippy.toml",
          root.display()
        )
      }
      ConfigError::UnknownTool { name } => write!(f, "Unknown tool '{}' in configuration", name),
      ConfigError::DuplicateTool { name } => write!(f, "Tool '{}' is configured more than once", name),
    }
  }
}

/// A glob that failed to compile while merging a tool configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPatternError {
  pub tool: String,
  pub pattern: String,
  pub reason: String,
}

impl fmt::Display for InvalidPatternError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Invalid pattern '{}' in tool '{}': {}",
      self.pattern, self.tool, self.reason
    )
  }
}

/// Module graph errors
#[derive(Debug)]
pub enum GraphError {
  /// Two modules share an id
  DuplicateModule { id: String },

  /// Two modules share a root directory, so file ownership would be ambiguous
  DuplicateRoot { root: String, first: String, second: String },

  /// A module depends on an id that is not in the manifest
  UnknownDependency { module: String, dependency: String },

  /// Lookup of a module id that is not in the graph
  UnknownModule { id: String, available: Vec<String> },

  /// Topological order requested on a cyclic graph
  Cycle { module: String },
}

impl GraphError {
  fn help_message(&self) -> Option<String> {
    match self {
      GraphError::UnknownDependency { dependency, .. } => Some(format!(
        "Add a module with id '{}' to the manifest or remove the dependency.",
        dependency
      )),
      GraphError::UnknownModule { available, .. } => Some(format!("Available modules: {}", available.join(", "))),
      GraphError::Cycle { .. } => Some("Run `skippy graph` to list the cycles.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for GraphError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GraphError::DuplicateModule { id } => write!(f, "Module '{}' is declared more than once", id),
      GraphError::DuplicateRoot { root, first, second } => {
        write!(f, "Modules '{}' and '{}' share the root '{}'", first, second, root)
      }
      GraphError::UnknownDependency { module, dependency } => {
        write!(f, "Module '{}' depends on unknown module '{}'", module, dependency)
      }
      GraphError::UnknownModule { id, .. } => write!(f, "Module '{}' not found", id),
      GraphError::Cycle { module } => write!(f, "Dependency cycle detected involving module '{}'", module),
    }
  }
}

/// Result type alias for skippy
pub type SkippyResult<T> = Result<T, SkippyError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> SkippyResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> SkippyResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<SkippyError>,
{
  fn context(self, ctx: impl Into<String>) -> SkippyResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> SkippyResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error to stderr with its help text
pub fn print_error(error: &SkippyError) {
  eprintln!("\nerror: {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("help: {}\n", help);
  }
}
