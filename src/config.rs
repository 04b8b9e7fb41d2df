//! Configuration for lando-util.
//!
//! Store connection sources (highest priority first):
//! 1. Environment variables (LANDO_STORE_URL, LANDO_STORE_TOKEN)
//! 2. Config file ($LANDO_CONFIG or ~/.lando/config.yaml)
//! 3. Defaults (public DukeDS API, no token)
//!
//! Settings are resolved once by the CLI and passed down explicitly.
//! This module also loads the JSON command files that describe a run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::ActivityRecord;

/// Default DukeDS API endpoint
pub const DEFAULT_STORE_URL: &str = "https://api.dataservice.duke.edu/api/v1";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub auth_token: Option<String>,
}

/// Resolved store connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub url: String,
    pub auth_token: Option<String>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.to_string(),
            auth_token: None,
            config_file: None,
        }
    }
}

/// Locate the config file: $LANDO_CONFIG, then ~/.lando/config.yaml
fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("LANDO_CONFIG") {
        return Some(PathBuf::from(path));
    }

    let path = dirs::home_dir()?.join(".lando").join("config.yaml");
    path.exists().then_some(path)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge env values over a parsed config file
fn resolve_settings(
    file: ConfigFile,
    config_file: Option<PathBuf>,
    env_url: Option<String>,
    env_token: Option<String>,
) -> StoreSettings {
    StoreSettings {
        url: env_url
            .or(file.store.url)
            .unwrap_or_else(|| DEFAULT_STORE_URL.to_string()),
        auth_token: env_token.or(file.store.auth_token),
        config_file,
    }
}

/// Load store settings from all sources
pub fn load_store_settings() -> Result<StoreSettings> {
    let config_file = find_config_file();
    let file = match &config_file {
        Some(path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    Ok(resolve_settings(
        file,
        config_file,
        std::env::var("LANDO_STORE_URL").ok(),
        std::env::var("LANDO_STORE_TOKEN").ok(),
    ))
}

/// Command file for `create-activity`
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityCommand {
    /// Project the outputs were uploaded to
    pub project_id: String,

    /// Local paths uploaded into the project root
    pub uploaded_paths: Vec<String>,

    /// Workflow output document; supplies output paths when the activity
    /// lists none
    #[serde(default)]
    pub workflow_output_path: Option<PathBuf>,

    pub activity: ActivityRecord,
}

impl ActivityCommand {
    /// Load a command file from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read command file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse command file: {}", path.display()))
    }
}
