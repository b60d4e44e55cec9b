//! Module graph and affected analysis
//!
//! Built on petgraph with our own domain types. Module metadata is read from a
//! JSON manifest or a Cargo workspace; the graph never talks to a build host.

pub mod affected;
pub mod manifest;
pub mod module_graph;
