//! Core building blocks for skippy
//!
//! - **changes**: Change sets and where they come from (file, stdin, git)
//! - **config**: skippy.toml parsing and validation
//! - **context**: Immutable per-run context (config + module graph)
//! - **error**: Error types with help messages and exit codes
//! - **tool**: Tool kinds and the global → tool configuration merge
//! - **vcs**: System git access for deriving change sets

pub mod changes;
pub mod config;
pub mod context;
pub mod error;
pub mod tool;
pub mod vcs;
