//! Provenance activity records.

use serde::{Deserialize, Serialize};

/// One provenance event to be recorded in the remote store.
///
/// Timestamps are opaque and passed to the store verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub started_on: String,

    #[serde(default)]
    pub ended_on: String,

    /// Remote file version ids consumed by the activity
    #[serde(rename = "input_file_version_ids", default)]
    pub input_identifiers: Vec<String>,

    /// Local paths of uploaded files produced by the activity
    #[serde(rename = "output_file_paths", default)]
    pub output_paths: Vec<String>,
}

impl ActivityRecord {
    /// Create a record with no inputs or outputs
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        started_on: impl Into<String>,
        ended_on: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            started_on: started_on.into(),
            ended_on: ended_on.into(),
            input_identifiers: Vec::new(),
            output_paths: Vec::new(),
        }
    }

    pub fn with_inputs<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_identifiers = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_paths = paths.into_iter().map(Into::into).collect();
        self
    }
}
