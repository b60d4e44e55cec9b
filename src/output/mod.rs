//! Persisting affected sets for downstream CI steps
//!
//! - **writer**: Deterministic per-tool and merged artifacts
//! - **diagnostics**: Debug companions and merged provenance

pub mod diagnostics;
pub mod writer;

pub use writer::OutputWriter;
