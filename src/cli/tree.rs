//! Tree command handler.

use std::path::Path;

use color_eyre::Result;

use crate::error::AppError;
use crate::services::TreeService;

use super::App;

impl App {
    /// Print the descendant tree of `root` (default: the founder) as JSON.
    pub fn run_tree(&self, input: &Path, root: Option<&str>, depth: Option<usize>) -> Result<()> {
        let ctx = self.load_context(input)?;
        let root = root.unwrap_or(ctx.founder_id());
        let depth = depth.unwrap_or(ctx.config.export.tree_depth);

        let tree = TreeService::from(&ctx)
            .build_tree(root, Some(depth))
            .ok_or_else(|| AppError::MissingEntity(root.to_string()))?;
        tracing::info!("Tree rooted at {} has {} nodes", root, tree.size());

        println!("{}", serde_json::to_string_pretty(&tree)?);
        Ok(())
    }
}
