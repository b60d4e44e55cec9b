//! System git backend for deriving change sets
//!
//! Runs the `git` binary with an isolated environment. Only the plumbing
//! needed to list changed files is implemented.

use crate::core::error::{ResultExt, SkippyError, SkippyResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Directory git runs in; diff paths are relative to it
  repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  pub fn open(path: &Path) -> SkippyResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(SkippyError::message(format!(
        "Failed to open git repository at {}: {}",
        path.display(),
        stderr.trim()
      )));
    }

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Files changed on `to` since its merge-base with `from` (`git diff from...to`).
  ///
  /// Renames are reported as delete + add so both paths count as changed.
  /// Paths are relative to the directory the repository was opened at;
  /// changes outside it are dropped (`--relative`).
  pub fn changed_files_between(&self, from: &str, to: &str) -> SkippyResult<Vec<String>> {
    let range = format!("{}...{}", from, to);
    let output = self
      .git_cmd()
      .args(["diff", "--name-only", "--no-renames", "--relative", range.as_str()])
      .output()
      .with_context(|| format!("Failed to run git diff {}", range))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(SkippyError::message(format!(
        "git diff --name-only {} failed: {}",
        range,
        stderr.trim()
      )));
    }

    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect(),
    )
  }

  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}
