//! CodeMeta Core: multi-language static source metadata extraction.
//!
//! This crate contains all analysis logic: tree-sitter parsing through one
//! adapter per language, the normalized namespace/class/method model,
//! heuristic call qualification, and Louvain module detection over the
//! namespace import graph.

pub mod config;
pub mod error;
pub mod graph;
pub mod languages;
pub mod metadata;
pub mod output;
pub mod phases;
pub mod pipeline;
pub mod query;

pub use config::{AnalysisConfig, AnalysisResult, Language};
pub use error::{AnalysisError, Result};
pub use metadata::{ClassMetadata, Method, Namespace, TypedName};
pub use phases::modules::{detect_modules, ModulePartition};
pub use phases::parsing::build_metadata;
pub use phases::references::resolve;
