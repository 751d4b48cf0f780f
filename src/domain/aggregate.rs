//! Bottom-up cost rollup over a company forest.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::domain::arena::Forest;
use crate::domain::error::{DomainError, DomainResult};

/// Total cost per company, computed once per forest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostRollup {
    costs: HashMap<Index, Decimal>,
}

impl CostRollup {
    /// Rolled-up cost of the company at `idx`.
    pub fn cost_of(&self, idx: Index) -> Option<Decimal> {
        self.costs.get(&idx).copied()
    }

    pub fn cost_by_id(&self, forest: &Forest, id: &str) -> Option<Decimal> {
        forest.index_of(id).and_then(|idx| self.cost_of(idx))
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Sum of all root costs.
    pub fn grand_total(&self, forest: &Forest) -> DomainResult<Decimal> {
        forest.roots().iter().try_fold(Decimal::ZERO, |acc, &idx| {
            let cost = self.cost_of(idx).ok_or(DomainError::UnknownNode)?;
            acc.checked_add(cost).ok_or_else(|| DomainError::CostOverflow {
                unit_id: "<total>".to_string(),
            })
        })
    }
}

enum Visit {
    Enter(Index),
    Exit(Index),
}

/// Computes `cost(unit) = sum(own travel prices) + sum(cost(child))` for every company.
///
/// Traversal is iterative post-order over an explicit stack. Each company is
/// computed once; re-entering a company that is still on the active path
/// fails with [`DomainError::CyclicHierarchy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CostAggregator {
    parallel: bool,
}

impl CostAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fan out across root subtrees with rayon.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Aggregate every company in the forest, including those no root reaches.
    ///
    /// A parent cycle anywhere fails the whole aggregation.
    #[instrument(level = "debug", skip_all, fields(units = forest.len(), parallel = self.parallel))]
    pub fn aggregate(&self, forest: &Forest) -> DomainResult<CostRollup> {
        let mut rollup = self.aggregate_reachable(forest)?;
        for &idx in forest.units() {
            if !rollup.costs.contains_key(&idx) {
                Self::fold_from(forest, idx, &mut rollup.costs)?;
            }
        }

        debug!("aggregated costs for {} companies", rollup.costs.len());
        Ok(rollup)
    }

    /// Aggregate the trees below the roots only.
    ///
    /// Companies no root reaches get no cost; see [`Self::check_detached`].
    #[instrument(level = "debug", skip_all, fields(roots = forest.roots().len(), parallel = self.parallel))]
    pub fn aggregate_reachable(&self, forest: &Forest) -> DomainResult<CostRollup> {
        let costs = if self.parallel {
            Self::aggregate_roots_parallel(forest)?
        } else {
            let mut costs = HashMap::with_capacity(forest.len());
            for &root in forest.roots() {
                Self::fold_from(forest, root, &mut costs)?;
            }
            costs
        };
        Ok(CostRollup { costs })
    }

    /// Fold the companies `rollup` left out, failing on the first parent cycle among them.
    ///
    /// `rollup` itself is not modified.
    #[instrument(level = "debug", skip_all)]
    pub fn check_detached(forest: &Forest, rollup: &CostRollup) -> DomainResult<()> {
        let mut costs = rollup.costs.clone();
        for &idx in forest.units() {
            if !costs.contains_key(&idx) {
                Self::fold_from(forest, idx, &mut costs)?;
            }
        }
        Ok(())
    }

    /// Cost of a single subtree, computed from scratch.
    #[instrument(level = "debug", skip(forest))]
    pub fn total_cost(forest: &Forest, idx: Index) -> DomainResult<Decimal> {
        let mut costs = HashMap::new();
        Self::fold_from(forest, idx, &mut costs)
    }

    fn aggregate_roots_parallel(forest: &Forest) -> DomainResult<HashMap<Index, Decimal>> {
        let partials = forest
            .roots()
            .par_iter()
            .map(|&root| -> DomainResult<HashMap<Index, Decimal>> {
                let mut local = HashMap::new();
                Self::fold_from(forest, root, &mut local)?;
                Ok(local)
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let mut costs = HashMap::with_capacity(forest.len());
        for partial in partials {
            costs.extend(partial);
        }
        Ok(costs)
    }

    /// Post-order fold from `start`, reusing and extending `costs`.
    fn fold_from(
        forest: &Forest,
        start: Index,
        costs: &mut HashMap<Index, Decimal>,
    ) -> DomainResult<Decimal> {
        let mut stack = vec![Visit::Enter(start)];
        let mut path: Vec<Index> = Vec::new();
        let mut on_path: HashSet<Index> = HashSet::new();

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(idx) => {
                    if costs.contains_key(&idx) {
                        continue;
                    }
                    if on_path.contains(&idx) {
                        return Err(Self::cycle_error(forest, &path, idx));
                    }
                    let node = forest.get_node(idx).ok_or(DomainError::UnknownNode)?;
                    path.push(idx);
                    on_path.insert(idx);
                    stack.push(Visit::Exit(idx));
                    for &child in node.children.iter().rev() {
                        stack.push(Visit::Enter(child));
                    }
                }
                Visit::Exit(idx) => {
                    let node = forest.get_node(idx).ok_or(DomainError::UnknownNode)?;
                    let overflow = || DomainError::CostOverflow {
                        unit_id: node.unit.id().to_string(),
                    };

                    // Own travels first, then children, in established order
                    let mut total = Decimal::ZERO;
                    for expense in &node.expenses {
                        total = total.checked_add(expense.price()).ok_or_else(overflow)?;
                    }
                    for child in &node.children {
                        let child_cost = costs.get(child).copied().ok_or(DomainError::UnknownNode)?;
                        total = total.checked_add(child_cost).ok_or_else(overflow)?;
                    }

                    costs.insert(idx, total);
                    path.pop();
                    on_path.remove(&idx);
                }
            }
        }

        costs.get(&start).copied().ok_or(DomainError::UnknownNode)
    }

    fn cycle_error(forest: &Forest, path: &[Index], reentered: Index) -> DomainError {
        let id_of = |idx: Index| {
            forest
                .get_node(idx)
                .map(|n| n.unit.id().to_string())
                .unwrap_or_default()
        };
        let start = path.iter().position(|&i| i == reentered).unwrap_or(0);
        let mut cycle: Vec<String> = path[start..].iter().map(|&i| id_of(i)).collect();
        cycle.push(id_of(reentered));

        DomainError::CyclicHierarchy {
            unit_id: id_of(reentered),
            path: cycle,
        }
    }
}
