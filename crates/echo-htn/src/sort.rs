// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Linearization of primitive task sets.
use std::collections::{BTreeMap, BTreeSet};

use crate::constraint::Constraint;
use crate::error::{PlanNotFound, SearchFailure};
use crate::ident::TaskId;
use crate::task::Task;

/// Orders a set of tasks consistently with a set of constraints.
pub trait SortService: std::fmt::Debug {
    /// Returns `tasks` in an order that respects every precedence edge in
    /// `constraints`.
    ///
    /// # Errors
    /// Returns [`PlanNotFound`] when no linear order exists.
    fn sort_by_constraints(
        &self,
        tasks: &[Task],
        constraints: &[Constraint],
    ) -> Result<Vec<Task>, PlanNotFound>;
}

/// Kahn's algorithm over precedence edges.
///
/// Ready tasks are released in [`TaskId`] order, so equal inputs always
/// produce the same order. Edges touching tasks outside `tasks` are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalSort;

impl SortService for TopologicalSort {
    fn sort_by_constraints(
        &self,
        tasks: &[Task],
        constraints: &[Constraint],
    ) -> Result<Vec<Task>, PlanNotFound> {
        let by_id: BTreeMap<TaskId, &Task> = tasks.iter().map(|t| (t.id(), t)).collect();
        let mut successors: BTreeMap<TaskId, BTreeSet<TaskId>> = BTreeMap::new();
        let mut indegree: BTreeMap<TaskId, usize> = by_id.keys().map(|id| (*id, 0)).collect();
        for (p, q) in constraints.iter().flat_map(Constraint::edges) {
            if !by_id.contains_key(&p) || !by_id.contains_key(&q) {
                continue;
            }
            if successors.entry(p).or_default().insert(q) {
                *indegree.entry(q).or_default() += 1;
            }
        }

        let mut ready: BTreeSet<TaskId> = indegree
            .iter()
            .filter(|(_, n)| **n == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut ordered = Vec::with_capacity(by_id.len());
        while let Some(id) = ready.pop_first() {
            if let Some(task) = by_id.get(&id) {
                ordered.push((*task).clone());
            }
            for next in successors.get(&id).into_iter().flatten() {
                if let Some(n) = indegree.get_mut(next) {
                    *n -= 1;
                    if *n == 0 {
                        ready.insert(*next);
                    }
                }
            }
        }
        if ordered.len() == by_id.len() {
            Ok(ordered)
        } else {
            Err(SearchFailure::Unorderable.into())
        }
    }
}
