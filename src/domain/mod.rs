//! Domain types for lando-util.
//!
//! This module contains the core data structures:
//! - Artifact: Workflow output nodes (files, directories, secondary files)
//! - Remote: Uploaded project trees and the local path lookup
//! - Activity: Provenance activity records

pub mod activity;
pub mod artifact;
pub mod remote;

// Re-export commonly used types
pub use activity::ActivityRecord;
pub use artifact::{normalize_location, ArtifactNode, DirectoryArtifact, FileArtifact, Walk};
pub use remote::{PathToRemoteIdMap, RemoteTreeNode};
