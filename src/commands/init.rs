//! `skippy init` - Write a starter skippy.toml

use crate::core::config::SkippyConfig;
use crate::core::error::{SkippyError, SkippyResult};
use std::path::Path;

/// Run the init command
pub fn run_init(root: &Path, force: bool) -> SkippyResult<()> {
  if let Some(existing) = SkippyConfig::find_config_path(root)
    && !force
  {
    return Err(SkippyError::with_help(
      format!("Configuration already exists at {}", existing.display()),
      "Re-run with --force to overwrite it with the starter configuration.",
    ));
  }

  let path = SkippyConfig::starter().save(root)?;
  tracing::info!(path = %path.display(), "wrote starter configuration");

  println!("Created {}", path.display());
  println!();
  println!("Next steps:");
  println!("  1. Point `modules` at your module manifest (or keep the Cargo workspace default)");
  println!("  2. Adjust [global] and [tools.*] patterns");
  println!("  3. Check the merged result with `skippy tools`");

  Ok(())
}
