//! Duke Data Service (DukeDS) adapter.
//!
//! Talks to the DukeDS REST API over HTTP. Besides the provenance calls of
//! [`RemoteStore`], it can rebuild the tree of an already uploaded project
//! so local output paths can be matched against remote files.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::RemoteStore;
use crate::config::StoreSettings;
use crate::domain::{ActivityRecord, RemoteTreeNode};

/// Entity kind used for relations that point at file versions
const FILE_VERSION_KIND: &str = "dds-file-version";

const KIND_FILE: &str = "dds-file";
const KIND_FOLDER: &str = "dds-folder";

/// Children requested per page when listing a project or folder
const PAGE_SIZE: u32 = 100;

type BoxedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// DukeDS REST API client
pub struct DukeDsClient {
    /// API base url, e.g. https://api.dataservice.duke.edu/api/v1
    base_url: String,
    /// Value sent in the Authorization header
    auth_token: Option<String>,
    /// HTTP client
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    current_version: IdResponse,
}

#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    results: Vec<ChildEntry>,
}

/// A project or folder child as listed by DukeDS
#[derive(Debug, Clone, Deserialize)]
struct ChildEntry {
    kind: String,
    id: String,
    name: String,
}

impl DukeDsClient {
    /// Create a new DukeDS client
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
            client: reqwest::Client::new(),
        }
    }

    /// Create from resolved settings
    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.url.clone(), settings.auth_token.clone())
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.api_url(path));
        match &self.auth_token {
            Some(token) => builder.header(AUTHORIZATION, token),
            None => builder,
        }
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Response> {
        let response = self
            .request(Method::POST, path)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send DukeDS request POST {}", path))?;
        expect_success(response, path).await
    }

    async fn get(&self, path: &str, query: &[(&str, u32)]) -> Result<Response> {
        let response = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send DukeDS request GET {}", path))?;
        expect_success(response, path).await
    }

    /// List every child of a project or folder, following pagination
    async fn list_children(&self, parent: &str) -> Result<Vec<ChildEntry>> {
        let path = format!("{}/children", parent);
        let mut children = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .get(&path, &[("page", page), ("per_page", PAGE_SIZE)])
                .await?;
            let total_pages = response
                .headers()
                .get("x-total-pages")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(1);

            let body: ChildrenResponse = response
                .json()
                .await
                .with_context(|| format!("Failed to parse DukeDS response for {}", path))?;
            children.extend(body.results);

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(children)
    }

    /// Rebuild the tree of an uploaded project.
    ///
    /// `uploaded_paths` are the local paths that were uploaded into the
    /// project root. A top-level remote child is matched to the uploaded
    /// path with the same file name; children that match none are skipped.
    /// Below that level, local paths are derived by joining remote names.
    pub async fn fetch_project_tree(
        &self,
        project_id: &str,
        uploaded_paths: &[String],
    ) -> Result<RemoteTreeNode> {
        let entries = self
            .list_children(&format!("projects/{}", project_id))
            .await
            .with_context(|| format!("Failed to list project {}", project_id))?;

        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(local_path) = uploaded_root_for(&entry.name, uploaded_paths) else {
                debug!(name = %entry.name, "Skipping project child not in uploaded paths");
                continue;
            };
            if let Some(node) = self.fetch_entry(entry, local_path).await? {
                children.push(node);
            }
        }

        Ok(RemoteTreeNode::project(project_id, children))
    }

    /// Convert one listed child into a tree node, descending into folders
    fn fetch_entry(
        &self,
        entry: ChildEntry,
        local_path: PathBuf,
    ) -> BoxedFuture<'_, Result<Option<RemoteTreeNode>>> {
        Box::pin(async move {
            match entry.kind.as_str() {
                KIND_FILE => Ok(Some(RemoteTreeNode::file(
                    entry.id,
                    local_path.to_string_lossy().into_owned(),
                ))),
                KIND_FOLDER => {
                    let listed = self
                        .list_children(&format!("folders/{}", entry.id))
                        .await
                        .with_context(|| format!("Failed to list folder {}", entry.id))?;

                    let mut children = Vec::with_capacity(listed.len());
                    for child in listed {
                        let child_path = local_path.join(&child.name);
                        if let Some(node) = self.fetch_entry(child, child_path).await? {
                            children.push(node);
                        }
                    }
                    Ok(Some(RemoteTreeNode::folder(entry.id, children)))
                }
                other => {
                    debug!(kind = %other, id = %entry.id, "Ignoring unknown child kind");
                    Ok(None)
                }
            }
        })
    }
}

#[async_trait]
impl RemoteStore for DukeDsClient {
    fn name(&self) -> &str {
        "dukeds"
    }

    async fn create_activity(&self, activity: &ActivityRecord) -> Result<String> {
        let response = self
            .post_json("activities", &activity_body(activity))
            .await?;
        let created: IdResponse = response
            .json()
            .await
            .context("Failed to parse DukeDS activity response")?;
        Ok(created.id)
    }

    async fn create_used_relation(&self, activity_id: &str, file_version_id: &str) -> Result<()> {
        self.post_json(
            "relations/used",
            &relation_body(activity_id, file_version_id),
        )
        .await?;
        Ok(())
    }

    async fn create_generated_relation(
        &self,
        activity_id: &str,
        file_version_id: &str,
    ) -> Result<()> {
        self.post_json(
            "relations/was_generated_by",
            &relation_body(activity_id, file_version_id),
        )
        .await?;
        Ok(())
    }

    async fn current_version_id(&self, file_id: &str) -> Result<String> {
        let response = self.get(&format!("files/{}", file_id), &[]).await?;
        let file: FileResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse DukeDS file {}", file_id))?;
        Ok(file.current_version.id)
    }
}

async fn expect_success(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!(
        "DukeDS request {} failed with status {}: {}",
        path,
        status,
        body.trim()
    );
}

fn activity_body(activity: &ActivityRecord) -> Value {
    json!({
        "name": activity.name,
        "description": activity.description,
        "started_on": activity.started_on,
        "ended_on": activity.ended_on,
    })
}

fn relation_body(activity_id: &str, file_version_id: &str) -> Value {
    json!({
        "activity": { "id": activity_id },
        "entity": { "kind": FILE_VERSION_KIND, "id": file_version_id },
    })
}

/// Uploaded local path whose file name equals a top-level remote name
fn uploaded_root_for(name: &str, uploaded_paths: &[String]) -> Option<PathBuf> {
    uploaded_paths
        .iter()
        .map(Path::new)
        .find(|path| path.file_name().is_some_and(|n| n == name))
        .map(Path::to_path_buf)
}
