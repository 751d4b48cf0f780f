//! Report projection: forest + rollup into serializable nested records.

use generational_arena::Index;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::domain::aggregate::CostRollup;
use crate::domain::arena::Forest;
use crate::domain::error::{DomainError, DomainResult};

/// One company in the output report, with its rolled-up cost and children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportNode {
    pub id: String,
    pub created_at: Option<String>,
    pub name: String,
    pub parent_id: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub cost: Decimal,
    pub children: Vec<ReportNode>,
}

/// Deepest hierarchy the report accepts, counting the root as level 1.
///
/// The nested report is serialized and dropped recursively, so depth is
/// capped well below what a thread stack can hold.
pub const MAX_REPORT_DEPTH: usize = 256;

/// Project every root of `forest` into a [`ReportNode`], in forest order.
///
/// Reads costs from `rollup` only; nothing is recomputed. Fails with
/// [`DomainError::HierarchyTooDeep`] past [`MAX_REPORT_DEPTH`] levels.
#[instrument(level = "debug", skip_all, fields(roots = forest.roots().len()))]
pub fn project(forest: &Forest, rollup: &CostRollup) -> DomainResult<Vec<ReportNode>> {
    forest
        .roots()
        .iter()
        .map(|&root| project_tree(forest, rollup, root))
        .collect()
}

enum Step {
    Enter(Index, usize),
    Exit(Index),
}

/// Post-order build over an explicit stack; finished children wait on `done`.
fn project_tree(forest: &Forest, rollup: &CostRollup, root: Index) -> DomainResult<ReportNode> {
    let mut stack = vec![Step::Enter(root, 1)];
    let mut done: Vec<ReportNode> = Vec::new();

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(idx, depth) => {
                let node = forest.get_node(idx).ok_or(DomainError::UnknownNode)?;
                if depth > MAX_REPORT_DEPTH {
                    return Err(DomainError::HierarchyTooDeep {
                        unit_id: node.unit.id().to_string(),
                        max_depth: MAX_REPORT_DEPTH,
                    });
                }
                stack.push(Step::Exit(idx));
                for &child in node.children.iter().rev() {
                    stack.push(Step::Enter(child, depth + 1));
                }
            }
            Step::Exit(idx) => {
                let node = forest.get_node(idx).ok_or(DomainError::UnknownNode)?;
                let cost = rollup.cost_of(idx).ok_or(DomainError::UnknownNode)?;
                let first_child = done
                    .len()
                    .checked_sub(node.children.len())
                    .ok_or(DomainError::UnknownNode)?;
                let children = done.split_off(first_child);

                done.push(ReportNode {
                    id: node.unit.id().to_string(),
                    created_at: node.unit.created_at().map(str::to_string),
                    name: node.unit.name().to_string(),
                    parent_id: node.unit.parent_id().map(str::to_string),
                    cost,
                    children,
                });
            }
        }
    }

    done.pop().ok_or(DomainError::UnknownNode)
}
