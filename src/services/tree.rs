//! Tree projection of the family graph for visualization.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use crate::context::Context;
use crate::graph::RecordStore;
use crate::models::TreeNode;

/// Service building depth-bounded descendant trees.
#[derive(Clone)]
pub struct TreeService {
    store: Arc<RecordStore>,
}

impl From<&Context> for TreeService {
    fn from(ctx: &Context) -> Self {
        Self {
            store: ctx.store.clone(),
        }
    }
}

impl TreeService {
    /// Build the descendant tree rooted at `root_id`.
    ///
    /// The root is at depth 0; nodes deeper than `max_depth` are not built,
    /// so nodes at `max_depth` have no children. An unknown root yields
    /// `None`. Children are ordered by birth year (unknown last), then by
    /// display name.
    pub fn build_tree(&self, root_id: &str, max_depth: Option<usize>) -> Option<TreeNode> {
        let mut path = HashSet::new();
        self.build_node(root_id, 0, max_depth, &mut path)
    }

    fn build_node<'a>(
        &'a self,
        id: &'a str,
        depth: usize,
        max_depth: Option<usize>,
        path: &mut HashSet<&'a str>,
    ) -> Option<TreeNode> {
        if max_depth.is_some_and(|max| depth > max) {
            return None;
        }
        let person = self.store.get(id)?;
        if !path.insert(id) {
            tracing::warn!("Descendant cycle through {}, not descending further", id);
            return None;
        }

        let mut children: Vec<(Option<i32>, TreeNode)> = self
            .store
            .children_of(id)
            .unwrap_or_default()
            .iter()
            .filter_map(|child_id| {
                let birth_year = self.store.get(child_id).and_then(|c| c.birth_year());
                let node = self.build_node(child_id, depth + 1, max_depth, path)?;
                Some((birth_year, node))
            })
            .collect();
        children.sort_by(|(a_year, a), (b_year, b)| {
            birth_order(*a_year, *b_year).then_with(|| a.name.cmp(&b.name))
        });

        path.remove(id);

        Some(TreeNode {
            id: person.id.clone(),
            name: person.display_name(),
            generation: person.generation,
            gender: person.gender,
            is_deceased: person.is_deceased,
            phai: person.phai.clone(),
            children: children.into_iter().map(|(_, node)| node).collect(),
        })
    }
}

/// Known years ascending, unknown years last.
fn birth_order(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
