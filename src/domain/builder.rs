//! Forest builder: assembles flat company and travel records into a hierarchy.

use std::collections::HashMap;

use generational_arena::Index;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::domain::arena::{AttachSummary, Forest};
use crate::domain::entities::{Expense, Unit};

/// Constructs a company forest from flat records.
///
/// Parent references are resolved against the full company set. A company
/// whose parent is absent, unknown, or itself becomes a root.
#[derive(Debug, Default)]
pub struct ForestBuilder {
    duplicates: Vec<String>,
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the forest from companies, then attach travels to it.
    #[instrument(level = "debug", skip_all, fields(units = units.len(), expenses = expenses.len()))]
    pub fn build(&mut self, units: Vec<Unit>, expenses: Vec<Expense>) -> Forest {
        let mut forest = self.build_hierarchy(units);
        let summary = Self::attach_expenses(&mut forest, expenses);
        forest.set_attach_summary(summary);
        forest
    }

    /// Ids that appeared more than once in the last build, in order of repetition.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Build the parent/child structure from company records.
    #[instrument(level = "debug", skip_all, fields(units = units.len()))]
    pub fn build_hierarchy(&mut self, units: Vec<Unit>) -> Forest {
        self.duplicates.clear();
        let mut forest = Forest::new();

        for unit in units {
            let id = unit.id().to_string();
            let (_, replaced) = forest.upsert_unit(unit);
            if replaced {
                warn!("duplicate company id '{}', later record replaces earlier one", id);
                self.duplicates.push(id);
            }
        }

        // Resolve parents only after every company is known, so forward references work
        let links: Vec<(Index, Option<Index>)> = forest
            .units()
            .iter()
            .map(|&idx| (idx, Self::resolve_parent(&forest, idx)))
            .collect();

        for (idx, parent) in links {
            match parent {
                Some(parent_idx) => forest.link(parent_idx, idx),
                None => forest.push_root(idx),
            }
        }

        debug!(
            "built forest: {} companies, {} roots",
            forest.len(),
            forest.roots().len()
        );
        forest
    }

    fn resolve_parent(forest: &Forest, idx: Index) -> Option<Index> {
        let node = forest.get_node(idx)?;
        let parent_id = node.unit.parent_id()?;

        if parent_id == node.unit.id() {
            debug!("company '{}' references itself as parent, treating as root", parent_id);
            return None;
        }
        match forest.index_of(parent_id) {
            Some(parent_idx) => Some(parent_idx),
            None => {
                debug!(
                    "company '{}' has unknown parent '{}', treating as root",
                    node.unit.id(),
                    parent_id
                );
                None
            }
        }
    }

    /// Group travels by company id and attach each group to its company.
    ///
    /// Travels billed to an unknown company are dropped.
    #[instrument(level = "debug", skip_all, fields(expenses = expenses.len()))]
    pub fn attach_expenses(forest: &mut Forest, expenses: Vec<Expense>) -> AttachSummary {
        let mut summary = AttachSummary::default();
        let mut groups: HashMap<String, Vec<Expense>> = expenses
            .into_iter()
            .into_group_map_by(|e| e.company_id().to_string());

        // Walk companies in input order so attachment is deterministic
        for idx in forest.units().to_vec() {
            let Some(id) = forest.get_node(idx).map(|n| n.unit.id().to_string()) else {
                continue;
            };
            if let Some(group) = groups.remove(&id) {
                summary.attached += group.len();
                forest.set_expenses(idx, group);
            }
        }

        for (company_id, group) in groups.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            debug!(
                "dropping {} travel(s) for unknown company '{}'",
                group.len(),
                company_id
            );
            summary.dropped += group.len();
        }

        debug!(
            "attached {} travels, dropped {}",
            summary.attached, summary.dropped
        );
        summary
    }
}
