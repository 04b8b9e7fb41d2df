//! Job summary handed to the report renderer.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

use super::output_parser::OutputTree;

/// Counts and timing for a finished workflow run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub started: String,
    pub finished: String,
    pub run_time_minutes: f64,
    pub num_output_files: usize,
    /// Raw byte total; formatting is left to the renderer
    pub total_file_size: u64,
}

impl JobSummary {
    pub fn new(outputs: &OutputTree, started: &str, finished: &str) -> Self {
        let inventory = outputs.inventory();
        Self {
            started: started.to_string(),
            finished: finished.to_string(),
            run_time_minutes: elapsed_minutes(started, finished),
            num_output_files: inventory.file_count,
            total_file_size: inventory.total_size,
        }
    }
}

/// Minutes between two ISO 8601 timestamps.
///
/// Zero when either value is empty or cannot be parsed. Timestamps without
/// an offset are taken as UTC.
pub fn elapsed_minutes(started: &str, finished: &str) -> f64 {
    let (Some(start), Some(end)) = (parse_timestamp(started), parse_timestamp(finished)) else {
        return 0.0;
    };
    (end - start).num_seconds() as f64 / 60.0
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}
