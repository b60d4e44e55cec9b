//! Integration tests for `skippy affected` with file and stdin change lists

use crate::helpers::{CHAIN_CONFIG, TestRepo, exit_code, run_skippy, run_skippy_raw, run_skippy_with_stdin};
use anyhow::Result;

fn affected(repo: &TestRepo, changed: &str) -> Result<()> {
  repo.write_file("changed.txt", changed)?;
  run_skippy(&repo.path, &["affected", "--changed-files", "changed.txt"])?;
  Ok(())
}

#[test]
fn test_core_change_affects_dependents() -> Result<()> {
  let repo = TestRepo::chain()?;
  affected(&repo, "core/src/Core.kt\n")?;

  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["app", "core", "lib"]);
  assert_eq!(repo.read_list("lint/affected_projects.txt")?, ["app", "core", "lib"]);
  assert_eq!(repo.read_list("unit_test/affected_projects.txt")?, ["app", "core", "lib"]);
  assert_eq!(repo.read_list("merged/affected_projects.txt")?, ["app", "core", "lib"]);

  // Only global and android_test get the android subset
  assert_eq!(
    repo.read_list("global/affected_android_test_projects.txt")?,
    ["app", "core"]
  );
  assert!(!repo.file_exists("build/skippy/unit_test/affected_android_test_projects.txt"));

  Ok(())
}

#[test]
fn test_leaf_change_affects_only_leaf() -> Result<()> {
  let repo = TestRepo::chain()?;
  affected(&repo, "app/src/App.kt\n")?;

  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["app"]);
  assert_eq!(repo.read_list("merged/affected_projects.txt")?, ["app"]);

  Ok(())
}

#[test]
fn test_never_skip_affects_everything() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file("changed.txt", "README.md\nci/Jenkinsfile\n")?;

  let output = run_skippy(
    &repo.path,
    &["affected", "--changed-files", "changed.txt", "--format", "json"],
  )?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  let global = &json["tools"][0];
  assert_eq!(global["tool"], "global");
  assert_eq!(global["skip_nothing"], true);
  assert_eq!(global["never_skip"]["file"], "ci/Jenkinsfile");
  assert_eq!(global["never_skip"]["pattern"], "ci/**");

  for tool in ["global", "lint", "unit_test"] {
    assert_eq!(
      repo.read_list(&format!("{}/affected_projects.txt", tool))?,
      ["app", "core", "lib"],
      "{} should affect every module",
      tool
    );
  }

  Ok(())
}

#[test]
fn test_tool_exclude_and_include_overlays() -> Result<()> {
  let repo = TestRepo::chain()?;
  affected(&repo, "core/src/androidTest/CoreTest.kt\nlib/lint.xml\n")?;

  // unit_test excludes androidTest sources; lint.xml is not a .kt file
  assert!(repo.read_list("unit_test/affected_projects.txt")?.is_empty());
  // global sees the .kt file only
  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["app", "core", "lib"]);
  // lint sees both
  assert_eq!(repo.read_list("lint/affected_projects.txt")?, ["app", "core", "lib"]);

  affected(&repo, "lib/lint.xml\n")?;
  assert_eq!(repo.read_list("lint/affected_projects.txt")?, ["app", "lib"]);
  assert!(repo.read_list("global/affected_projects.txt")?.is_empty());
  assert_eq!(repo.read_list("merged/affected_projects.txt")?, ["app", "lib"]);

  Ok(())
}

#[test]
fn test_unowned_changes_give_empty_files() -> Result<()> {
  let repo = TestRepo::chain()?;
  affected(&repo, "README.md\ndocs/guide.kt\n")?;

  assert_eq!(repo.read_file("build/skippy/global/affected_projects.txt")?, "");
  assert_eq!(repo.read_file("build/skippy/merged/affected_projects.txt")?, "");

  Ok(())
}

#[test]
fn test_empty_change_list() -> Result<()> {
  let repo = TestRepo::chain()?;
  affected(&repo, "")?;

  assert_eq!(repo.read_file("build/skippy/global/affected_projects.txt")?, "");
  Ok(())
}

#[test]
fn test_outputs_are_idempotent() -> Result<()> {
  let repo = TestRepo::chain()?;
  affected(&repo, "core/src/Core.kt\n")?;

  let provenance_path = repo.path.join("build/skippy/merged/provenance.json");
  let first = repo.read_file("build/skippy/merged/provenance.json")?;
  let first_modified = std::fs::metadata(&provenance_path)?.modified()?;

  affected(&repo, "core/src/Core.kt\n")?;

  assert_eq!(repo.read_file("build/skippy/merged/provenance.json")?, first);
  assert_eq!(std::fs::metadata(&provenance_path)?.modified()?, first_modified);
  assert!(!first.contains("generated_at"));

  Ok(())
}

#[test]
fn test_input_order_does_not_matter() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file("a.txt", "core/A.kt\napp/B.kt\nREADME.md\n")?;
  repo.write_file("b.txt", "README.md\napp/B.kt\ncore/A.kt\ncore/A.kt\n")?;

  run_skippy(&repo.path, &["affected", "--changed-files", "a.txt", "--output", "out-a"])?;
  run_skippy(&repo.path, &["affected", "--changed-files", "b.txt", "--output", "out-b"])?;

  for rel in [
    "global/affected_projects.txt",
    "global/affected_android_test_projects.txt",
    "merged/affected_projects.txt",
    "merged/provenance.json",
  ] {
    assert_eq!(
      repo.read_file(&format!("out-a/{}", rel))?,
      repo.read_file(&format!("out-b/{}", rel))?,
      "{} differs",
      rel
    );
  }

  Ok(())
}

#[test]
fn test_missing_change_list_exits_4() -> Result<()> {
  let repo = TestRepo::chain()?;

  let output = run_skippy_raw(&repo.path, &["affected", "--changed-files", "missing.txt"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(exit_code(&output), 4);
  assert!(stderr.contains("missing.txt"), "stderr: {}", stderr);
  assert!(stderr.contains("help:"), "stderr: {}", stderr);
  assert!(!repo.file_exists("build/skippy"));

  Ok(())
}

#[test]
fn test_invalid_tool_pattern_fails_only_that_tool() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file(
    "skippy.toml",
    &format!("{}\n[tools.detekt]\ninclude = [\"src/**.kt\"]\n", CHAIN_CONFIG),
  )?;
  repo.write_file("changed.txt", "lib/src/Lib.kt\n")?;

  let output = run_skippy_raw(&repo.path, &["affected", "--changed-files", "changed.txt"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(exit_code(&output), 3, "stderr: {}", stderr);
  assert!(stderr.contains("detekt"));
  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["app", "lib"]);
  assert_eq!(repo.read_list("lint/affected_projects.txt")?, ["app", "lib"]);
  assert!(!repo.file_exists("build/skippy/detekt"));

  Ok(())
}

#[test]
fn test_invalid_global_pattern_is_fatal() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file("skippy.toml", "modules = \"modules.json\"\n\n[global]\ninclude = [\"**x\"]\n")?;
  repo.write_file("changed.txt", "lib/src/Lib.kt\n")?;

  let output = run_skippy_raw(&repo.path, &["affected", "--changed-files", "changed.txt"])?;

  assert_eq!(exit_code(&output), 1);
  assert!(String::from_utf8_lossy(&output.stderr).contains("**x"));
  assert!(!repo.file_exists("build/skippy"));

  Ok(())
}

#[test]
fn test_unknown_tool_rejected() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file("skippy.toml", "modules = \"modules.json\"\n\n[tools.ktlint]\n")?;
  repo.write_file("changed.txt", "lib/src/Lib.kt\n")?;

  let output = run_skippy_raw(&repo.path, &["affected", "--changed-files", "changed.txt"])?;

  assert_eq!(exit_code(&output), 1);
  assert!(String::from_utf8_lossy(&output.stderr).contains("ktlint"));

  Ok(())
}

#[test]
fn test_stdin_change_list() -> Result<()> {
  let repo = TestRepo::chain()?;

  let output = run_skippy_with_stdin(
    &repo.path,
    &["affected", "--changed-files", "-", "--format", "names"],
    "./lib/src/Lib.kt\n",
  )?;

  assert!(output.status.success());
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert_eq!(stdout.lines().collect::<Vec<_>>(), ["app", "lib"]);
  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["app", "lib"]);

  Ok(())
}

#[test]
fn test_dry_run_writes_nothing() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file("changed.txt", "core/src/Core.kt\n")?;

  let output = run_skippy(&repo.path, &["affected", "--changed-files", "changed.txt", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Affected Modules (manifest "), "stdout: {}", stdout);
  assert!(stdout.contains("global: 3 affected (1 direct)"), "stdout: {}", stdout);
  assert!(!repo.file_exists("build/skippy"));

  Ok(())
}

#[test]
fn test_tool_filter() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file("changed.txt", "core/src/Core.kt\n")?;

  run_skippy(
    &repo.path,
    &["affected", "--changed-files", "changed.txt", "--tool", "lint"],
  )?;

  assert!(repo.file_exists("build/skippy/lint/affected_projects.txt"));
  assert!(!repo.file_exists("build/skippy/global"));
  assert!(!repo.file_exists("build/skippy/unit_test"));

  Ok(())
}

#[test]
fn test_debug_writes_diagnostics() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file(
    "skippy.toml",
    "modules = \"modules.json\"\n\n[global]\ninclude = [\"**/*.kt\"]\n\n[tools.lint]\ndebug = true\n",
  )?;
  affected(&repo, "core/src/Core.kt\nREADME.md\n")?;

  let diagnostics: serde_json::Value =
    serde_json::from_str(&repo.read_file("build/skippy/lint/diagnostics.json")?)?;
  assert_eq!(diagnostics["tool"], "lint");
  assert_eq!(diagnostics["direct"], serde_json::json!(["core"]));
  assert_eq!(diagnostics["unowned"], serde_json::json!(["README.md"]));
  assert_eq!(diagnostics["files"][0]["path"], "core/src/Core.kt");
  assert!(!repo.file_exists("build/skippy/global/diagnostics.json"));
  // merge_outputs defaults to off
  assert!(!repo.file_exists("build/skippy/merged"));

  Ok(())
}

#[test]
fn test_android_test_tool_gets_subset() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file(
    "skippy.toml",
    "modules = \"modules.json\"\n\n[global]\ninclude = [\"**/*.kt\"]\n\n[tools.androidTest]\n",
  )?;
  affected(&repo, "lib/src/Lib.kt\n")?;

  assert_eq!(
    repo.read_list("android_test/affected_projects.txt")?,
    ["app", "lib"]
  );
  assert_eq!(
    repo.read_list("android_test/affected_android_test_projects.txt")?,
    ["app"]
  );

  Ok(())
}

#[test]
fn test_cycle_members_are_mutually_affected() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_modules(&[
    ("a", "a", &["b"], &[]),
    ("b", "b", &["a"], &[]),
    ("c", "c", &["a"], &[]),
    ("d", "d", &[], &[]),
  ])?;
  repo.write_file(
    "skippy.toml",
    "modules = \"modules.json\"\n\n[global]\ninclude = [\"**\"]\n",
  )?;
  repo.write_file("changed.txt", "b/x.kt\n")?;

  let output = run_skippy(&repo.path, &["affected", "--changed-files", "changed.txt"])?;

  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["a", "b", "c"]);
  assert!(String::from_utf8_lossy(&output.stderr).contains("CycleDetected"));

  Ok(())
}

#[test]
fn test_diamond_dependency_listed_once() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_modules(&[
    ("top", "top", &["left", "right"], &[]),
    ("left", "left", &["base"], &[]),
    ("right", "right", &["base"], &[]),
    ("base", "base", &[], &[]),
  ])?;
  repo.write_file(
    "skippy.toml",
    "modules = \"modules.json\"\n\n[global]\ninclude = [\"**\"]\n",
  )?;
  affected(&repo, "base/src/Base.kt\n")?;

  assert_eq!(
    repo.read_list("global/affected_projects.txt")?,
    ["base", "left", "right", "top"]
  );

  Ok(())
}

#[test]
fn test_nested_module_roots_pick_longest() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_modules(&[
    ("root", "", &[], &[]),
    ("feature", "features/login", &["root"], &[]),
    ("features-lib", "features/login-lib", &[], &[]),
  ])?;
  repo.write_file(
    "skippy.toml",
    "modules = \"modules.json\"\n\n[global]\ninclude = [\"**\"]\n",
  )?;

  affected(&repo, "features/login/src/Login.kt\n")?;
  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["feature"]);

  affected(&repo, "build.gradle\n")?;
  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["feature", "root"]);

  Ok(())
}

#[test]
fn test_rerun_removes_outputs_of_failed_tool() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file(
    "skippy.toml",
    &format!("{}\n[tools.detekt]\ninclude = [\"**/*.kt\"]\n", CHAIN_CONFIG),
  )?;
  affected(&repo, "core/src/Core.kt\n")?;
  assert_eq!(repo.read_list("detekt/affected_projects.txt")?, ["app", "core", "lib"]);

  repo.write_file(
    "skippy.toml",
    &format!("{}\n[tools.detekt]\ninclude = [\"src/**.kt\"]\n", CHAIN_CONFIG),
  )?;
  let output = run_skippy_raw(&repo.path, &["affected", "--changed-files", "changed.txt"])?;

  assert_eq!(exit_code(&output), 3);
  assert!(!repo.file_exists("build/skippy/detekt"));
  assert_eq!(repo.read_list("lint/affected_projects.txt")?, ["app", "core", "lib"]);

  Ok(())
}

#[test]
fn test_rerun_removes_disabled_merge_and_diagnostics() -> Result<()> {
  let repo = TestRepo::chain()?;
  repo.write_file(
    "skippy.toml",
    "modules = \"modules.json\"\n\n[global]\ninclude = [\"**/*.kt\"]\nmerge_outputs = true\ndebug = true\n",
  )?;
  affected(&repo, "core/src/Core.kt\n")?;
  assert!(repo.file_exists("build/skippy/merged/affected_projects.txt"));
  assert!(repo.file_exists("build/skippy/global/diagnostics.json"));

  repo.write_file(
    "skippy.toml",
    "modules = \"modules.json\"\n\n[global]\ninclude = [\"**/*.kt\"]\n",
  )?;
  affected(&repo, "README.md\n")?;

  assert!(repo.read_list("global/affected_projects.txt")?.is_empty());
  assert!(!repo.file_exists("build/skippy/global/diagnostics.json"));
  assert!(!repo.file_exists("build/skippy/merged"));

  Ok(())
}
