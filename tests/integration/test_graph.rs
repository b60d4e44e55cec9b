//! Integration tests for `skippy graph`

use crate::helpers::{TestRepo, exit_code, run_skippy, run_skippy_raw};
use anyhow::Result;

#[test]
fn test_graph_text_shows_build_order() -> Result<()> {
  let repo = TestRepo::chain()?;

  let output = run_skippy(&repo.path, &["graph"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Modules: 3"), "stdout: {}", stdout);
  assert!(stdout.contains("1. core"));
  assert!(stdout.contains("2. lib"));
  assert!(stdout.contains("3. app"));

  Ok(())
}

#[test]
fn test_graph_json() -> Result<()> {
  let repo = TestRepo::chain()?;

  let output = run_skippy(&repo.path, &["graph", "--format", "json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["order"], serde_json::json!(["core", "lib", "app"]));
  assert_eq!(json["cycles"], serde_json::json!([]));

  let lib = json["modules"]
    .as_array()
    .and_then(|modules| modules.iter().find(|m| m["id"] == "lib"))
    .cloned()
    .unwrap_or_default();
  assert_eq!(lib["dependencies"], serde_json::json!(["core"]));
  assert_eq!(lib["dependents"], serde_json::json!(["app"]));
  assert_eq!(lib["capabilities"], serde_json::json!(["unit_test", "lint"]));

  Ok(())
}

#[test]
fn test_graph_why() -> Result<()> {
  let repo = TestRepo::chain()?;

  let output = run_skippy(&repo.path, &["graph", "--why", "app", "core"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "app → lib → core");

  let output = run_skippy(&repo.path, &["graph", "--why", "core", "app"])?;
  assert!(String::from_utf8_lossy(&output.stdout).contains("does not depend on"));

  let output = run_skippy_raw(&repo.path, &["graph", "--why", "app", "nope"])?;
  assert_eq!(exit_code(&output), 1);
  assert!(String::from_utf8_lossy(&output.stderr).contains("Available modules"));

  Ok(())
}

#[test]
fn test_graph_dot() -> Result<()> {
  let repo = TestRepo::chain()?;

  let output = run_skippy(&repo.path, &["graph", "--format", "dot"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.starts_with("digraph"));
  assert!(stdout.contains("label=\"core\""));

  Ok(())
}

#[test]
fn test_graph_reports_cycles() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_modules(&[("a", "a", &["b"], &[]), ("b", "b", &["a"], &[]), ("solo", "solo", &["solo"], &[])])?;

  let output = run_skippy(&repo.path, &["graph", "--modules", "modules.json"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Cycles: 2"), "stdout: {}", stdout);
  assert!(stdout.contains("a ↔ b"));

  let output = run_skippy(&repo.path, &["graph", "--modules", "modules.json", "--format", "dot"])?;
  assert!(String::from_utf8_lossy(&output.stdout).contains("salmon"));

  Ok(())
}

#[test]
fn test_graph_rejects_unknown_dependency() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_modules(&[("app", "app", &["ghost"], &[])])?;

  let output = run_skippy_raw(&repo.path, &["graph", "--modules", "modules.json"])?;

  assert_eq!(exit_code(&output), 1);
  assert!(String::from_utf8_lossy(&output.stderr).contains("ghost"));

  Ok(())
}

#[test]
fn test_graph_rejects_duplicate_root() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_modules(&[("one", "shared", &[], &[]), ("two", "./shared/", &[], &[])])?;

  let output = run_skippy_raw(&repo.path, &["graph", "--modules", "modules.json"])?;

  assert_eq!(exit_code(&output), 1);
  assert!(String::from_utf8_lossy(&output.stderr).contains("share the root"));

  Ok(())
}

#[test]
fn test_cargo_workspace_source() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file(
    "Cargo.toml",
    "[workspace]\nmembers = [\"crates/*\"]\nresolver = \"2\"\n",
  )?;
  for (name, deps) in [("base", ""), ("mid", "base = { path = \"../base\" }\n"), ("top", "mid = { path = \"../mid\" }\n")] {
    repo.write_file(
      &format!("crates/{}/Cargo.toml", name),
      &format!(
        "[package]\nname = \"{}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n[dependencies]\n{}",
        name, deps
      ),
    )?;
    repo.write_file(&format!("crates/{}/src/lib.rs", name), "")?;
  }
  repo.write_file("skippy.toml", "[global]\ninclude = [\"**/*.rs\"]\n")?;
  repo.write_file("changed.txt", "crates/mid/src/lib.rs\nREADME.md\n")?;

  let output = run_skippy(&repo.path, &["graph", "--format", "json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(json["order"], serde_json::json!(["base", "mid", "top"]));

  run_skippy(&repo.path, &["affected", "--changed-files", "changed.txt"])?;
  assert_eq!(repo.read_list("global/affected_projects.txt")?, ["mid", "top"]);

  Ok(())
}
