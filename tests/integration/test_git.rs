//! Integration tests for git-derived change sets (`--since`, `--from/--to`)

use crate::helpers::{TestRepo, exit_code, git, run_skippy, run_skippy_raw};
use anyhow::Result;

/// Chain repo with an initial commit and a `base` branch pointing at it
fn repo_with_base() -> Result<TestRepo> {
  let repo = TestRepo::chain()?;
  repo.write_file(".gitignore", "build/\n")?;
  repo.write_file("app/src/App.kt", "class App\n")?;
  repo.write_file("lib/src/Lib.kt", "class Lib\n")?;
  repo.write_file("core/src/Core.kt", "class Core\n")?;
  repo.init_git()?;
  repo.commit("Initial modules")?;
  git(&repo.path, &["branch", "base"])?;
  Ok(repo)
}

#[test]
fn test_since_ref() -> Result<()> {
  let repo = repo_with_base()?;
  repo.write_file("lib/src/Lib.kt", "class Lib(val x: Int)\n")?;
  repo.commit("Change lib")?;

  run_skippy(&repo.path, &["affected", "--since", "base"])?;

  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["app", "lib"]);
  Ok(())
}

#[test]
fn test_since_ignores_changes_on_base() -> Result<()> {
  let repo = repo_with_base()?;

  // Feature branch touches app only
  git(&repo.path, &["checkout", "-b", "feature"])?;
  repo.write_file("app/src/App.kt", "class App(val y: Int)\n")?;
  repo.commit("Change app")?;

  // Base moves on independently
  git(&repo.path, &["checkout", "base"])?;
  repo.write_file("core/src/Core.kt", "class Core(val z: Int)\n")?;
  repo.commit("Change core on base")?;
  git(&repo.path, &["checkout", "feature"])?;

  // base...HEAD diffs against the merge-base, so core's change is not ours
  run_skippy(&repo.path, &["affected", "--since", "base"])?;

  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["app"]);
  Ok(())
}

#[test]
fn test_ref_pair() -> Result<()> {
  let repo = repo_with_base()?;
  let from = git(&repo.path, &["rev-parse", "HEAD"])?;
  let from = String::from_utf8_lossy(&from.stdout).trim().to_string();

  repo.write_file("core/src/Core.kt", "class Core(val z: Int)\n")?;
  let to = repo.commit("Change core")?;

  let output = run_skippy(
    &repo.path,
    &["affected", "--from", &from, "--to", &to, "--format", "names"],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(stdout.lines().collect::<Vec<_>>(), ["app", "core", "lib"]);
  Ok(())
}

#[test]
fn test_renamed_file_counts_on_both_sides() -> Result<()> {
  let repo = repo_with_base()?;
  std::fs::create_dir_all(repo.path.join("app/src"))?;
  git(&repo.path, &["mv", "core/src/Core.kt", "app/src/Core.kt"])?;
  repo.commit("Move Core into app")?;

  run_skippy(&repo.path, &["affected", "--since", "base"])?;

  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["app", "core", "lib"]);
  Ok(())
}

#[test]
fn test_unknown_ref_is_input_unavailable() -> Result<()> {
  let repo = repo_with_base()?;

  let output = run_skippy_raw(&repo.path, &["affected", "--since", "does-not-exist"])?;

  assert_eq!(exit_code(&output), 4);
  assert!(!repo.file_exists("build/skippy"));
  Ok(())
}

#[test]
fn test_not_a_git_repository() -> Result<()> {
  let repo = TestRepo::chain()?;

  let output = run_skippy_raw(&repo.path, &["affected", "--since", "main"])?;

  assert_eq!(exit_code(&output), 4);
  Ok(())
}
