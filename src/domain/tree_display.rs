/*
Text rendering of report trees via termtree.
A trait keeps rendering out of the report record itself, the same seam the
serializer uses for JSON.
 */
use termtree::Tree;

use crate::domain::report::ReportNode;

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for ReportNode {
    fn to_tree_string(&self) -> Tree<String> {
        let label = format!("{} [{}] cost={}", self.name, self.id, self.cost.normalize());

        // Recursively construct the children
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();

        Tree::new(label).with_leaves(leaves)
    }
}

/// Render every root as its own tree, separated by newlines.
pub fn render_forest(roots: &[ReportNode]) -> String {
    if roots.is_empty() {
        return "Empty forest".to_string();
    }
    roots
        .iter()
        .map(|r| r.to_tree_string().to_string())
        .collect::<Vec<_>>()
        .join("")
}
