//! Command-line interface for lando-util.
//!
//! Provides commands for summarizing a workflow's outputs and for recording
//! the provenance of an uploaded run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::adapters::DukeDsClient;
use crate::config::{load_store_settings, ActivityCommand};
use crate::core::{flatten, JobSummary, OutputTree, ProvenanceBuilder};

/// lando-util - workflow output inventory and provenance recording
#[derive(Parser, Debug)]
#[command(name = "lando-util")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count output files and bytes of a workflow output document
    Summary {
        /// JSON document printed by the workflow runner
        workflow_output: PathBuf,

        /// When the workflow started (ISO 8601)
        #[arg(long, default_value = "")]
        started: String,

        /// When the workflow finished (ISO 8601)
        #[arg(long, default_value = "")]
        finished: String,
    },

    /// Record a provenance activity for an uploaded project
    CreateActivity {
        /// JSON command file describing the project and activity
        cmdfile: PathBuf,

        /// Write the created activity id to this file as JSON
        #[arg(short, long)]
        outfile: Option<PathBuf>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Summary {
                workflow_output,
                started,
                finished,
            } => summarize(&workflow_output, &started, &finished).await,
            Commands::CreateActivity { cmdfile, outfile } => {
                create_activity(&cmdfile, outfile.as_deref()).await
            }
        }
    }
}

async fn summarize(workflow_output: &Path, started: &str, finished: &str) -> Result<()> {
    let outputs = OutputTree::from_path(workflow_output)
        .await
        .context("Failed to parse workflow output")?;

    let summary = JobSummary::new(&outputs, started, finished);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn create_activity(cmdfile: &Path, outfile: Option<&Path>) -> Result<()> {
    let command = ActivityCommand::load(cmdfile).await?;

    let mut activity = command.activity;
    if activity.output_paths.is_empty() {
        if let Some(path) = &command.workflow_output_path {
            let outputs = OutputTree::from_path(path)
                .await
                .context("Failed to parse workflow output")?;
            activity.output_paths = outputs.file_paths();
            info!(
                count = activity.output_paths.len(),
                "Using workflow output files as activity outputs"
            );
        }
    }

    let settings = load_store_settings()?;
    let client = DukeDsClient::from_settings(&settings);

    let tree = client
        .fetch_project_tree(&command.project_id, &command.uploaded_paths)
        .await
        .context("Failed to fetch uploaded project tree")?;
    let uploaded = flatten(&tree);
    info!(files = uploaded.len(), project_id = %command.project_id, "Loaded uploaded files");

    let activity_id = ProvenanceBuilder::new(&client)
        .with_progress(|progress| println!("{}", progress))
        .build(&activity, &uploaded)
        .await?;
    println!("Created activity {}", activity_id);

    if let Some(outfile) = outfile {
        write_results(&activity_id, outfile).await?;
    }
    Ok(())
}

async fn write_results(activity_id: &str, outfile: &Path) -> Result<()> {
    println!("Writing activity id {} to {}", activity_id, outfile.display());
    let contents = serde_json::to_string(&serde_json::json!({ "activity_id": activity_id }))?;
    tokio::fs::write(outfile, contents)
        .await
        .with_context(|| format!("Failed to write {}", outfile.display()))
}
