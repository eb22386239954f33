//! Analysis phases, run in order by the pipeline.

pub mod modules;
pub mod parsing;
pub mod references;
pub mod structure;
