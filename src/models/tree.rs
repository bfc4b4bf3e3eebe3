//! Hierarchical tree view for downstream rendering.

use serde::{Deserialize, Serialize};

use super::Gender;

/// A node in the projected descendant tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    /// Display name (`"<surname> <name>"`).
    pub name: String,
    pub generation: Option<i32>,
    pub gender: Option<Gender>,
    pub is_deceased: bool,
    pub phai: Option<String>,
    /// Ordered by birth year (unknown last), then name.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Total number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// Length of the longest root-to-leaf path, counting edges.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}
