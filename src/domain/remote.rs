//! Remote project trees and the path lookup derived from them.
//!
//! A project tree is produced after local paths have been uploaded to the
//! remote store. Every file leaf remembers the local path it came from.

use std::collections::hash_map;
use std::collections::HashMap;

/// One node of an uploaded remote project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteTreeNode {
    Project {
        remote_id: String,
        children: Vec<RemoteTreeNode>,
    },
    Folder {
        remote_id: String,
        children: Vec<RemoteTreeNode>,
    },
    File {
        remote_id: String,
        /// Local filesystem path this file was uploaded from
        local_path: String,
    },
}

impl RemoteTreeNode {
    pub fn project(remote_id: impl Into<String>, children: Vec<RemoteTreeNode>) -> Self {
        Self::Project {
            remote_id: remote_id.into(),
            children,
        }
    }

    pub fn folder(remote_id: impl Into<String>, children: Vec<RemoteTreeNode>) -> Self {
        Self::Folder {
            remote_id: remote_id.into(),
            children,
        }
    }

    pub fn file(remote_id: impl Into<String>, local_path: impl Into<String>) -> Self {
        Self::File {
            remote_id: remote_id.into(),
            local_path: local_path.into(),
        }
    }

    /// Identifier assigned by the remote store
    pub fn remote_id(&self) -> &str {
        match self {
            Self::Project { remote_id, .. }
            | Self::Folder { remote_id, .. }
            | Self::File { remote_id, .. } => remote_id,
        }
    }

    /// Child nodes (always empty for files)
    pub fn children(&self) -> &[RemoteTreeNode] {
        match self {
            Self::Project { children, .. } | Self::Folder { children, .. } => children,
            Self::File { .. } => &[],
        }
    }
}

/// Lookup from local path to remote file identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathToRemoteIdMap {
    entries: HashMap<String, String>,
}

impl PathToRemoteIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the identifier it replaced
    pub fn insert(&mut self, local_path: String, remote_id: String) -> Option<String> {
        self.entries.insert(local_path, remote_id)
    }

    /// Remote file identifier for a local path
    pub fn get(&self, local_path: &str) -> Option<&str> {
        self.entries.get(local_path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.entries.iter()
    }
}

impl FromIterator<(String, String)> for PathToRemoteIdMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_accessors() {
        let tree = RemoteTreeNode::project(
            "p1",
            vec![RemoteTreeNode::file("f1", "/data/results/a.txt")],
        );

        assert_eq!(tree.remote_id(), "p1");
        assert_eq!(tree.children().len(), 1);
        assert_eq!(tree.children()[0].remote_id(), "f1");
        assert!(tree.children()[0].children().is_empty());
    }

    #[test]
    fn test_map_lookup() {
        let map: PathToRemoteIdMap = [("/data/a.txt".to_string(), "678".to_string())]
            .into_iter()
            .collect();

        assert_eq!(map.get("/data/a.txt"), Some("678"));
        assert_eq!(map.get("/data/b.txt"), None);
        assert_eq!(map.len(), 1);
    }
}
