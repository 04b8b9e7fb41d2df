//! Adapter interfaces for external systems.
//!
//! The provenance core only needs a narrow slice of the remote data store:
//! creating an activity, attaching relations to it, and resolving a file to
//! its current version. Uploading, sharing and project CRUD live elsewhere.

pub mod dukeds;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::ActivityRecord;

// Re-export the DukeDS adapter
pub use dukeds::DukeDsClient;

/// Capabilities of the remote store used to record provenance
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Human-readable store name
    fn name(&self) -> &str;

    /// Create an activity from the record's name, description and
    /// timestamps. Returns the activity id assigned by the store.
    async fn create_activity(&self, activity: &ActivityRecord) -> Result<String>;

    /// Record that the activity used a file version
    async fn create_used_relation(&self, activity_id: &str, file_version_id: &str) -> Result<()>;

    /// Record that the activity generated a file version
    async fn create_generated_relation(
        &self,
        activity_id: &str,
        file_version_id: &str,
    ) -> Result<()>;

    /// Resolve a file id to the id of its current version
    async fn current_version_id(&self, file_id: &str) -> Result<String>;
}
