//! Namespace-level dependency graph and community detection.

pub mod louvain;
pub mod namespace_graph;

pub use louvain::{modularity, Louvain, ModularityError, Partitioner};
pub use namespace_graph::NamespaceGraph;
