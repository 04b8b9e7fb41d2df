//! Core logic.
//!
//! This module contains:
//! - OutputParser: Workflow output description -> typed artifact forest
//! - Flatten: Uploaded project tree -> local path lookup
//! - Provenance: Activity and relation recording
//! - Summary: Counts and timing for the report renderer

pub mod flatten;
pub mod output_parser;
pub mod provenance;
pub mod summary;

// Re-export commonly used types
pub use flatten::flatten;
pub use output_parser::{ArtifactInventory, OutputPort, OutputTree, ParseError};
pub use provenance::{ProvenanceBuilder, ProvenanceError, ProvenanceProgress};
pub use summary::{elapsed_minutes, JobSummary};
