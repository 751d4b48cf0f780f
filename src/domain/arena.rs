use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{Expense, Unit};

/// Tree node in the arena-based company forest.
#[derive(Debug)]
pub struct UnitNode {
    /// Company record for this node
    pub unit: Unit,
    /// Index of the honored parent, None for roots
    pub parent: Option<Index>,
    /// Indices of child nodes, in input order
    pub children: Vec<Index>,
    /// Travels billed directly to this company, in input order
    pub expenses: Vec<Expense>,
}

/// Counts from attaching travels to the forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachSummary {
    pub attached: usize,
    pub dropped: usize,
}

/// Arena-based forest of companies.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Every distinct company lives in the arena exactly once, whether or not a
/// root reaches it.
#[derive(Debug, Default)]
pub struct Forest {
    arena: Arena<UnitNode>,
    /// Company id to arena index
    lookup: HashMap<String, Index>,
    /// All distinct companies in first-seen input order
    order: Vec<Index>,
    /// Root companies in input order
    roots: Vec<Index>,
    attach_summary: AttachSummary,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a company, or replace the data of an earlier company with the same id.
    ///
    /// Returns the index and whether an earlier record was replaced. A replaced
    /// company keeps its first-seen position.
    #[instrument(level = "trace", skip_all, fields(id = unit.id()))]
    pub(crate) fn upsert_unit(&mut self, unit: Unit) -> (Index, bool) {
        if let Some(&idx) = self.lookup.get(unit.id()) {
            if let Some(node) = self.arena.get_mut(idx) {
                node.unit = unit;
                return (idx, true);
            }
        }
        let id = unit.id().to_string();
        let idx = self.arena.insert(UnitNode {
            unit,
            parent: None,
            children: Vec::new(),
            expenses: Vec::new(),
        });
        self.lookup.insert(id, idx);
        self.order.push(idx);
        (idx, false)
    }

    /// Attach `child` under `parent`, appending to the parent's child list.
    pub(crate) fn link(&mut self, parent: Index, child: Index) {
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
    }

    pub(crate) fn push_root(&mut self, idx: Index) {
        self.roots.push(idx);
    }

    pub(crate) fn set_expenses(&mut self, idx: Index, expenses: Vec<Expense>) {
        if let Some(node) = self.arena.get_mut(idx) {
            node.expenses = expenses;
        }
    }

    pub(crate) fn set_attach_summary(&mut self, summary: AttachSummary) {
        self.attach_summary = summary;
    }

    pub fn get_node(&self, idx: Index) -> Option<&UnitNode> {
        self.arena.get(idx)
    }

    /// Look up a company's arena index by id.
    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.lookup.get(id).copied()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&UnitNode> {
        self.index_of(id).and_then(|idx| self.get_node(idx))
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    /// All distinct companies in first-seen input order.
    pub fn units(&self) -> &[Index] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn attach_summary(&self) -> AttachSummary {
        self.attach_summary
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    /// Height of the tallest tree, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter_with_depth().map(|(_, d)| d).max().unwrap_or(0)
    }

    fn iter_with_depth(&self) -> impl Iterator<Item = (Index, usize)> + '_ {
        let mut stack: Vec<(Index, usize)> = self.roots.iter().rev().map(|&r| (r, 1)).collect();
        std::iter::from_fn(move || {
            let (idx, depth) = stack.pop()?;
            if let Some(node) = self.get_node(idx) {
                for &child in node.children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
            Some((idx, depth))
        })
    }

    /// Ids of companies that no root reaches (members of, or hanging off, a parent cycle).
    pub fn unreachable_ids(&self) -> Vec<&str> {
        let reached: std::collections::HashSet<Index> = self.iter().map(|(idx, _)| idx).collect();
        self.order
            .iter()
            .filter(|idx| !reached.contains(idx))
            .filter_map(|&idx| self.get_node(idx).map(|n| n.unit.id()))
            .collect()
    }
}

/// Pre-order iterator over every tree of the forest, roots in forest order.
pub struct ForestIterator<'a> {
    forest: &'a Forest,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a UnitNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
