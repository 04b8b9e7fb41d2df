//! Artifacts described by a workflow's output document.
//!
//! A workflow output is a forest of File and Directory nodes. Files may carry
//! secondary files (attachments), directories may carry a nested listing.
//! Both nest without a depth limit.

use serde::{Deserialize, Serialize};
use url::Url;

/// One node of a workflow output description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum ArtifactNode {
    File(FileArtifact),
    Directory(DirectoryArtifact),
}

/// A single produced file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileArtifact {
    /// Location as written by the workflow runner (may be a `file://` URI)
    pub location: String,

    /// Checksum string, e.g. `sha1$abc`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Secondary files bound to this file
    #[serde(
        default,
        rename = "secondaryFiles",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attachments: Vec<ArtifactNode>,
}

/// A produced directory and its listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryArtifact {
    pub location: String,

    #[serde(default, rename = "listing", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ArtifactNode>,
}

impl FileArtifact {
    /// Create a file artifact with a size and no attachments
    pub fn new(location: impl Into<String>, size: u64) -> Self {
        Self {
            location: location.into(),
            checksum: None,
            size: Some(size),
            attachments: Vec::new(),
        }
    }

    /// Attach a secondary file
    pub fn with_attachment(mut self, attachment: FileArtifact) -> Self {
        self.attachments.push(ArtifactNode::File(attachment));
        self
    }

    /// Location with any URI scheme removed
    pub fn path(&self) -> String {
        normalize_location(&self.location)
    }
}

impl DirectoryArtifact {
    pub fn new(location: impl Into<String>, children: Vec<ArtifactNode>) -> Self {
        Self {
            location: location.into(),
            children,
        }
    }

    pub fn path(&self) -> String {
        normalize_location(&self.location)
    }
}

impl ArtifactNode {
    /// Raw location of this node
    pub fn location(&self) -> &str {
        match self {
            ArtifactNode::File(file) => &file.location,
            ArtifactNode::Directory(dir) => &dir.location,
        }
    }

    /// Filesystem path of this node
    pub fn path(&self) -> String {
        normalize_location(self.location())
    }

    pub fn is_file(&self) -> bool {
        matches!(self, ArtifactNode::File(_))
    }

    /// Nested nodes: attachments for files, the listing for directories
    pub fn nested(&self) -> &[ArtifactNode] {
        match self {
            ArtifactNode::File(file) => &file.attachments,
            ArtifactNode::Directory(dir) => &dir.children,
        }
    }
}

/// Depth-first, pre-order traversal over a forest of artifact nodes.
///
/// Uses an explicit stack, so nesting depth is bounded only by memory.
pub struct Walk<'a> {
    stack: Vec<&'a ArtifactNode>,
}

impl<'a> Walk<'a> {
    pub fn new<I>(roots: I) -> Self
    where
        I: IntoIterator<Item = &'a ArtifactNode>,
        I::IntoIter: DoubleEndedIterator,
    {
        Self {
            stack: roots.into_iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a ArtifactNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the first nested node is visited next
        self.stack.extend(node.nested().iter().rev());
        Some(node)
    }
}

/// Strip a leading URI scheme from a location.
///
/// `file://` URIs are converted to a filesystem path (percent-decoding
/// included). Other `scheme://` prefixes are dropped. Plain paths pass
/// through unchanged, as do opaque values such as `sample:1.txt`.
///
/// URL parsing rules apply to `file` URIs: `file:relative/x` resolves to
/// `/relative/x`, and `file://host/path` (a non-local host, which has no
/// local path) falls back to dropping the prefix, giving `host/path`.
pub fn normalize_location(location: &str) -> String {
    let Ok(url) = Url::parse(location) else {
        return location.to_string();
    };

    if url.scheme() == "file" {
        if let Ok(path) = url.to_file_path() {
            return path.to_string_lossy().into_owned();
        }
    }

    match location.split_once("://") {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(url.scheme()) => rest.to_string(),
        _ => location.to_string(),
    }
}
