//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays clean for `--format json|names` output.
//! Level precedence: `RUST_LOG` (full filter), then `-v`/`-q`, then
//! `SKIPPY_LOG`, then `info`.

use std::env;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool, quiet: bool) {
  use std::sync::Once;
  static INIT: Once = Once::new();

  INIT.call_once(|| {
    let level = if verbose {
      Level::DEBUG
    } else if quiet {
      Level::ERROR
    } else {
      env::var("SKIPPY_LOG")
        .ok()
        .and_then(|value| parse_level(&value))
        .unwrap_or(Level::INFO)
    };

    let filter = if env::var("RUST_LOG").is_ok() {
      EnvFilter::from_default_env()
    } else {
      EnvFilter::new(format!("skippy={}", level))
    };

    let _ = tracing_subscriber::registry()
      .with(filter)
      .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
      .try_init();
  });
}

fn parse_level(value: &str) -> Option<Level> {
  match value.trim().to_lowercase().as_str() {
    "trace" => Some(Level::TRACE),
    "debug" => Some(Level::DEBUG),
    "info" => Some(Level::INFO),
    "warn" | "warning" => Some(Level::WARN),
    "error" => Some(Level::ERROR),
    _ => None,
  }
}
