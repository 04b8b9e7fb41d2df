//! Parser for workflow output descriptions.
//!
//! The runner prints a JSON object keyed by output port. Each port holds a
//! single File/Directory object or an array of them. Parsing decides the
//! node kind once, then all queries run over the typed forest.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::fs;

use crate::domain::{ArtifactNode, FileArtifact, Walk};

/// Errors raised while parsing a workflow output description
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read workflow output {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Workflow output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workflow output must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Output '{port}' must be a File, Directory or array of them, found {found}")]
    UnexpectedValue { port: String, found: &'static str },

    #[error("Malformed artifact at {at}: {reason}")]
    MalformedNode { at: String, reason: String },
}

/// Artifacts produced on one output port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPort {
    pub name: String,
    pub artifacts: Vec<ArtifactNode>,
}

/// Aggregate counts over every file reachable from an output description
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactInventory {
    pub file_count: usize,
    pub total_size: u64,
}

/// Parsed workflow output: ports in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTree {
    ports: Vec<OutputPort>,
}

impl OutputTree {
    /// Parse a workflow output JSON document.
    ///
    /// Nesting depth is not capped: the recursion limit is lifted and the
    /// deserializer grows its stack on demand.
    pub fn parse(json: &str) -> Result<Self, ParseError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;
        Self::from_value(value)
    }

    /// Read and parse a workflow output file
    pub async fn from_path(path: &Path) -> Result<Self, ParseError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| ParseError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::parse(&content)
    }

    /// Build from an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ParseError::NotAnObject {
                    found: value_kind(&other),
                })
            }
        };

        let mut ports = Vec::with_capacity(map.len());
        for (name, value) in map {
            let artifacts = match value {
                // Optional output that was not produced
                Value::Null => Vec::new(),
                Value::Array(items) => items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| parse_node(item, format!("{}[{}]", name, idx)))
                    .collect::<Result<Vec<_>, _>>()?,
                Value::Object(_) => vec![parse_node(value, name.clone())?],
                other => {
                    return Err(ParseError::UnexpectedValue {
                        port: name,
                        found: value_kind(&other),
                    })
                }
            };
            ports.push(OutputPort { name, artifacts });
        }

        Ok(Self { ports })
    }

    pub fn ports(&self) -> &[OutputPort] {
        &self.ports
    }

    /// Top-level artifacts of every port, in document order
    pub fn roots(&self) -> impl DoubleEndedIterator<Item = &ArtifactNode> {
        self.ports.iter().flat_map(|port| port.artifacts.iter())
    }

    /// Pre-order walk over every node, including attachments and listings
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self.roots())
    }

    /// Every file node, pre-order
    pub fn files(&self) -> impl Iterator<Item = &FileArtifact> {
        self.walk().filter_map(|node| match node {
            ArtifactNode::File(file) => Some(file),
            ArtifactNode::Directory(_) => None,
        })
    }

    /// Number of file nodes, attachments included
    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// Sum of file sizes in bytes (missing sizes count as zero)
    pub fn total_size(&self) -> u64 {
        self.files()
            .map(|file| file.size.unwrap_or(0))
            .fold(0u64, u64::saturating_add)
    }

    /// Filesystem paths of every file node, pre-order
    pub fn file_paths(&self) -> Vec<String> {
        self.files().map(FileArtifact::path).collect()
    }

    pub fn inventory(&self) -> ArtifactInventory {
        ArtifactInventory {
            file_count: self.file_count(),
            total_size: self.total_size(),
        }
    }
}

fn parse_node(value: Value, at: String) -> Result<ArtifactNode, ParseError> {
    ArtifactNode::deserialize(serde_stacker::Deserializer::new(value)).map_err(|e| {
        ParseError::MalformedNode {
            at,
            reason: e.to_string(),
        }
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_file_with_secondary() {
        let tree = OutputTree::parse(
            r#"{"align_log": [{"class":"File","checksum":"sha1$abc","location":"/tmp/a.txt","size":900,
                "secondaryFiles":[{"class":"File","checksum":"sha1$def","location":"/tmp/a.idx","size":123}]}]}"#,
        )
        .unwrap();

        assert_eq!(tree.file_count(), 2);
        assert_eq!(tree.total_size(), 1023);
        assert_eq!(tree.file_paths(), vec!["/tmp/a.txt", "/tmp/a.idx"]);
    }

    #[test]
    fn test_scalar_and_array_ports_accepted() {
        let tree = OutputTree::parse(
            r#"{
                "report": {"class": "File", "location": "file:///out/report.html", "size": 10},
                "reads": [
                    {"class": "File", "location": "/out/r1.fq", "size": 1},
                    {"class": "File", "location": "/out/r2.fq", "size": 2}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(tree.ports().len(), 2);
        assert_eq!(tree.ports()[0].name, "report");
        assert_eq!(tree.file_count(), 3);
        assert_eq!(tree.total_size(), 13);
        assert_eq!(tree.file_paths()[0], "/out/report.html");
    }

    #[test]
    fn test_missing_size_counts_zero() {
        let tree = OutputTree::parse(r#"{"x": {"class": "File", "location": "/a"}}"#).unwrap();
        assert_eq!(tree.inventory(), ArtifactInventory { file_count: 1, total_size: 0 });
    }

    #[test]
    fn test_null_port_is_empty() {
        let tree = OutputTree::parse(r#"{"optional_out": null}"#).unwrap();
        assert_eq!(tree.file_count(), 0);
        assert_eq!(tree.ports()[0].artifacts.len(), 0);
    }

    #[test]
    fn test_malformed_node_names_location() {
        let err = OutputTree::parse(
            r#"{"out": [{"class": "File", "location": "/a", "size": 1},
                        {"class": "File", "location": "/b", "size": -5}]}"#,
        )
        .unwrap_err();

        match err {
            ParseError::MalformedNode { at, .. } => assert_eq!(at, "out[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_class_aborts_parse() {
        let err = OutputTree::parse(r#"{"out": {"class": "Pipe", "location": "/a"}}"#).unwrap_err();
        assert!(matches!(err, ParseError::MalformedNode { .. }));
    }

    #[test]
    fn test_deeply_nested_secondary_files() {
        let depth = 150;
        let mut json = String::new();
        for i in 0..depth {
            json.push_str(&format!(
                r#"{{"class": "File", "location": "/f{}", "size": 1, "secondaryFiles": ["#,
                i
            ));
        }
        json.push_str(r#"{"class": "File", "location": "/leaf", "size": 1}"#);
        for _ in 0..depth {
            json.push_str("]}");
        }

        let tree = OutputTree::parse(&format!(r#"{{"deep": {}}}"#, json)).unwrap();
        assert_eq!(tree.file_count(), depth + 1);
        assert_eq!(tree.total_size(), depth as u64 + 1);
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(matches!(
            OutputTree::parse(r#"{"x": null} extra"#).unwrap_err(),
            ParseError::Json(_)
        ));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            OutputTree::parse("[1, 2]").unwrap_err(),
            ParseError::NotAnObject { found: "an array" }
        ));
        assert!(matches!(
            OutputTree::parse(r#"{"out": 5}"#).unwrap_err(),
            ParseError::UnexpectedValue { .. }
        ));
        assert!(matches!(OutputTree::parse("{").unwrap_err(), ParseError::Json(_)));
    }
}
