//! Provenance recording for a finished workflow run.
//!
//! Creates one activity in the remote store, links every declared input
//! with a "used" relation, then resolves every declared output path to the
//! current version of its uploaded file and links it with a "generated"
//! relation. Calls are strictly sequential. A failure stops the sequence
//! and leaves whatever was already attached in place.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::adapters::RemoteStore;
use crate::domain::{ActivityRecord, PathToRemoteIdMap};

/// Errors raised while recording provenance, one per stage
#[derive(Debug, Error)]
pub enum ProvenanceError {
    #[error("Failed to create activity '{name}': {source}")]
    ActivityCreate {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to attach used relation for input {input_id}: {source}")]
    UsedRelation {
        input_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Output path {path} was not found among uploaded files")]
    OutputNotUploaded { path: String },

    #[error("Failed to look up current version of file {file_id} ({path}): {source}")]
    VersionLookup {
        path: String,
        file_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to attach generated relation for {path} (version {version_id}): {source}")]
    GeneratedRelation {
        path: String,
        version_id: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Progress notifications, emitted before each relation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceProgress {
    AttachingUsed { count: usize },
    AttachingGenerated { count: usize },
}

impl fmt::Display for ProvenanceProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttachingUsed { count } => write!(f, "Attaching {} used relations", count),
            Self::AttachingGenerated { count } => {
                write!(f, "Attaching {} generated relations", count)
            }
        }
    }
}

type ProgressSink = Box<dyn Fn(&ProvenanceProgress) + Send + Sync>;

/// Records one activity and its relations against a remote store
pub struct ProvenanceBuilder<'a> {
    store: &'a dyn RemoteStore,
    progress: ProgressSink,
}

impl<'a> ProvenanceBuilder<'a> {
    /// Create a builder that logs progress through `tracing`
    pub fn new(store: &'a dyn RemoteStore) -> Self {
        Self {
            store,
            progress: Box::new(|progress| info!("{}", progress)),
        }
    }

    /// Replace the progress sink
    pub fn with_progress<F>(mut self, sink: F) -> Self
    where
        F: Fn(&ProvenanceProgress) + Send + Sync + 'static,
    {
        self.progress = Box::new(sink);
        self
    }

    /// Create the activity and attach its relations.
    ///
    /// Returns the id of the created activity. Running twice creates two
    /// distinct activities.
    #[instrument(skip_all, fields(store = %self.store.name(), activity = %activity.name))]
    pub async fn build(
        &self,
        activity: &ActivityRecord,
        uploaded: &PathToRemoteIdMap,
    ) -> Result<String, ProvenanceError> {
        let activity_id = self
            .store
            .create_activity(activity)
            .await
            .map_err(|source| ProvenanceError::ActivityCreate {
                name: activity.name.clone(),
                source,
            })?;
        info!(%activity_id, "Created activity");

        self.attach_used(&activity_id, &activity.input_identifiers)
            .await?;
        self.attach_generated(&activity_id, &activity.output_paths, uploaded)
            .await?;

        Ok(activity_id)
    }

    async fn attach_used(
        &self,
        activity_id: &str,
        input_ids: &[String],
    ) -> Result<(), ProvenanceError> {
        (self.progress)(&ProvenanceProgress::AttachingUsed {
            count: input_ids.len(),
        });

        for input_id in input_ids {
            self.store
                .create_used_relation(activity_id, input_id)
                .await
                .map_err(|source| ProvenanceError::UsedRelation {
                    input_id: input_id.clone(),
                    source,
                })?;
            debug!(%input_id, "Attached used relation");
        }
        Ok(())
    }

    async fn attach_generated(
        &self,
        activity_id: &str,
        output_paths: &[String],
        uploaded: &PathToRemoteIdMap,
    ) -> Result<(), ProvenanceError> {
        (self.progress)(&ProvenanceProgress::AttachingGenerated {
            count: output_paths.len(),
        });

        for path in output_paths {
            let file_id = uploaded
                .get(path)
                .ok_or_else(|| ProvenanceError::OutputNotUploaded { path: path.clone() })?;

            // Relations point at the file version, not the file itself
            let version_id = self
                .store
                .current_version_id(file_id)
                .await
                .map_err(|source| ProvenanceError::VersionLookup {
                    path: path.clone(),
                    file_id: file_id.to_string(),
                    source,
                })?;

            self.store
                .create_generated_relation(activity_id, &version_id)
                .await
                .map_err(|source| ProvenanceError::GeneratedRelation {
                    path: path.clone(),
                    version_id: version_id.clone(),
                    source,
                })?;
            debug!(%path, %version_id, "Attached generated relation");
        }
        Ok(())
    }
}
