//! lando-util - workflow output inventory and provenance recording
//!
//! Turns the JSON output of a workflow run into a flat inventory of
//! produced files, matches those files against a freshly uploaded remote
//! project, and records a provenance activity linking the run's inputs to
//! its generated outputs.
//!
//! # Modules
//!
//! - `adapters`: Remote store capability and the DukeDS client
//! - `core`: Output parsing, upload tree flattening, provenance building
//! - `domain`: Data structures (ArtifactNode, RemoteTreeNode, ActivityRecord)
//! - `config`: Store settings and command files
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Count output files and bytes
//! lando-util summary bespin-workflow-output.json
//!
//! # Record provenance for an uploaded project
//! lando-util create-activity activity.json --outfile activity-id.json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{DukeDsClient, RemoteStore};
pub use self::core::{
    flatten, ArtifactInventory, JobSummary, OutputTree, ParseError, ProvenanceBuilder,
    ProvenanceError, ProvenanceProgress,
};
pub use domain::{ActivityRecord, ArtifactNode, PathToRemoteIdMap, RemoteTreeNode};
