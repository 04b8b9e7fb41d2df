//! Reduces an uploaded project tree to a local path lookup.

use tracing::{debug, warn};

use crate::domain::{PathToRemoteIdMap, RemoteTreeNode};

/// Collect every file leaf of `root` into a local path -> remote id map.
///
/// Projects and folders are traversed but not recorded. A repeated local
/// path keeps the last file seen.
pub fn flatten(root: &RemoteTreeNode) -> PathToRemoteIdMap {
    let mut map = PathToRemoteIdMap::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match node {
            RemoteTreeNode::File {
                remote_id,
                local_path,
            } => {
                if let Some(previous) = map.insert(local_path.clone(), remote_id.clone()) {
                    warn!(
                        path = %local_path,
                        previous = %previous,
                        replacement = %remote_id,
                        "Duplicate local path in uploaded project"
                    );
                }
            }
            RemoteTreeNode::Project { children, .. } | RemoteTreeNode::Folder { children, .. } => {
                stack.extend(children.iter().rev());
            }
        }
    }

    debug!(files = map.len(), "Flattened uploaded project");
    map
}
