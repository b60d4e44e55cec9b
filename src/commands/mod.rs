//! CLI commands for skippy
//!
//! - **affected**: Resolve affected modules per tool and write outputs
//! - **graph**: Inspect the module graph (order, cycles, why, dot)
//! - **tools**: Show and validate the merged per-tool configuration
//! - **init**: Write a starter skippy.toml
//!
//! `affected` takes a prebuilt `RunContext`; the inspection commands load only
//! what they need so they work before a config exists.

pub mod affected;
pub mod graph;
pub mod init;
pub mod tools;

pub use affected::{AffectedOptions, run_affected};
pub use graph::run_graph;
pub use init::run_init;
pub use tools::run_tools;
