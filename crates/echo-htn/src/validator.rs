// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Constraint validation and precedence-cycle detection.
//!
//! The validator tracks the task occurrences of one network and the
//! constraints accepted over them. Precedence constraints are indexed by
//! their preceding endpoints; that index is the adjacency of the ordering
//! graph, and a cycle check is a reachability query over it.
//!
//! Admitting a precedence with preceding set `P` and proceeding set `Q` adds
//! the edges `p -> q` for every pair. The new edges close a cycle exactly when
//! some `p` is reachable from some `q` through edges already present, or when
//! `p == q`. Edges of one constraint all point from `P` into `Q`, so a cycle
//! through two new edges would still need an existing path from `Q` back to
//! `P`; checking each pair against the existing graph is therefore enough.
use std::collections::{BTreeMap, BTreeSet};

use echo_logic::Substitution;
use tracing::trace;

use crate::constraint::{Constraint, ConstraintKind};
use crate::error::{DecompositionError, InvalidConstraint, Rejection};
use crate::ident::TaskId;
use crate::network::TaskNetwork;

/// Accepted tasks and constraints of one task network.
#[derive(Debug, Clone, Default)]
pub struct ConstraintValidator {
    tasks: BTreeSet<TaskId>,
    precedences: BTreeSet<Constraint>,
    befores: BTreeSet<Constraint>,
    afters: BTreeSet<Constraint>,
    betweens: BTreeSet<Constraint>,
    /// Precedence constraints keyed by each of their preceding tasks.
    by_preceding: BTreeMap<TaskId, BTreeSet<Constraint>>,
}

impl ConstraintValidator {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `task` as a member. Unconditional and idempotent.
    pub fn add_task(&mut self, task: TaskId) {
        self.tasks.insert(task);
    }

    /// Returns `true` if `task` is a member.
    pub fn contains_task(&self, task: TaskId) -> bool {
        self.tasks.contains(&task)
    }

    /// Member tasks in id order.
    pub fn tasks(&self) -> &BTreeSet<TaskId> {
        &self.tasks
    }

    /// Every accepted constraint, grouped by kind.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.precedences
            .iter()
            .chain(&self.befores)
            .chain(&self.afters)
            .chain(&self.betweens)
    }

    /// Number of accepted constraints.
    pub fn constraint_count(&self) -> usize {
        self.precedences.len() + self.befores.len() + self.afters.len() + self.betweens.len()
    }

    /// Returns `true` if a value-equal constraint was already accepted.
    pub fn contains_constraint(&self, constraint: &Constraint) -> bool {
        self.bucket(constraint.kind()).contains(constraint)
    }

    fn bucket(&self, kind: ConstraintKind) -> &BTreeSet<Constraint> {
        match kind {
            ConstraintKind::Precedence => &self.precedences,
            ConstraintKind::Before => &self.befores,
            ConstraintKind::After => &self.afters,
            ConstraintKind::Between => &self.betweens,
        }
    }

    fn bucket_mut(&mut self, kind: ConstraintKind) -> &mut BTreeSet<Constraint> {
        match kind {
            ConstraintKind::Precedence => &mut self.precedences,
            ConstraintKind::Before => &mut self.befores,
            ConstraintKind::After => &mut self.afters,
            ConstraintKind::Between => &mut self.betweens,
        }
    }

    /// Checks `constraint` against the current state without mutating it.
    ///
    /// Membership is checked first, then duplicates, then (for precedence)
    /// cycles.
    ///
    /// # Errors
    /// Returns the [`Rejection`] describing the first violated rule.
    pub fn check(&self, constraint: &Constraint) -> Result<(), Rejection> {
        if let Some(missing) = constraint.references().find(|id| !self.tasks.contains(id)) {
            return Err(Rejection::UnknownTask(missing));
        }
        if self.contains_constraint(constraint) {
            return Err(Rejection::Duplicate);
        }
        if let Constraint::Precedence {
            preceding,
            proceeding,
        } = constraint
        {
            if let Some((from, to)) = self.closing_edge(preceding, proceeding) {
                return Err(Rejection::Cycle { from, to });
            }
        }
        Ok(())
    }

    /// Pure validity query.
    pub fn validate(&self, constraint: &Constraint) -> bool {
        self.check(constraint).is_ok()
    }

    /// Re-checks and records `constraint`.
    ///
    /// # Errors
    /// Returns [`InvalidConstraint`] if the constraint is not admissible; the
    /// validator is unchanged in that case.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), InvalidConstraint> {
        if let Err(reason) = self.check(&constraint) {
            trace!(%constraint, %reason, "constraint rejected");
            return Err(InvalidConstraint {
                kind: constraint.kind(),
                reason,
            });
        }
        self.record(constraint);
        Ok(())
    }

    /// Stores an already validated constraint and updates the index.
    pub(crate) fn record(&mut self, constraint: Constraint) {
        if let Constraint::Precedence { preceding, .. } = &constraint {
            for p in preceding {
                self.by_preceding
                    .entry(*p)
                    .or_default()
                    .insert(constraint.clone());
            }
        }
        self.bucket_mut(constraint.kind()).insert(constraint);
    }

    /// Returns the first edge `p -> q` that would close a cycle.
    fn closing_edge(
        &self,
        preceding: &BTreeSet<TaskId>,
        proceeding: &BTreeSet<TaskId>,
    ) -> Option<(TaskId, TaskId)> {
        for p in preceding {
            for q in proceeding {
                if p == q || self.reachable(*q, *p) {
                    return Some((*p, *q));
                }
            }
        }
        None
    }

    /// Direct successors of `task` along accepted precedence edges.
    fn successors(&self, task: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.by_preceding
            .get(&task)
            .into_iter()
            .flatten()
            .filter_map(|c| match c {
                Constraint::Precedence { proceeding, .. } => Some(proceeding),
                _ => None,
            })
            .flatten()
            .copied()
    }

    /// Returns `true` if `target` is reachable from `from` via precedence edges.
    pub fn reachable(&self, from: TaskId, target: TaskId) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if !seen.insert(node) {
                continue;
            }
            stack.extend(self.successors(node).filter(|n| !seen.contains(n)));
        }
        false
    }

    /// Rewrites every held constraint through `substitution`.
    ///
    /// Task identities are unaffected. Constraints that become value-equal
    /// merge.
    pub fn apply(&mut self, substitution: &Substitution) {
        let mut next = ConstraintValidator {
            tasks: self.tasks.clone(),
            ..ConstraintValidator::default()
        };
        for constraint in self.constraints() {
            next.record(constraint.apply(substitution));
        }
        *self = next;
    }

    /// Replaces `old` by the tasks of `network`.
    ///
    /// Every constraint that referenced `old` is rewritten to reference the
    /// whole replacement task set (fan-out); constraints whose side becomes
    /// empty are dropped. The replacement network's own constraints are then
    /// added. Rewritten constraints equal to accepted ones merge.
    ///
    /// # Errors
    /// [`DecompositionError::UnknownTask`] if `old` is not a member;
    /// [`DecompositionError::InvalidConstraint`] if the result has a dangling
    /// reference or a precedence cycle. The validator is unchanged on error.
    pub fn replace(
        &mut self,
        old: TaskId,
        network: &TaskNetwork,
    ) -> Result<(), DecompositionError> {
        if !self.tasks.contains(&old) {
            return Err(DecompositionError::UnknownTask(old));
        }
        let replacement = network.task_ids();
        let mut next = ConstraintValidator::new();
        for task in self.tasks.iter().filter(|t| **t != old) {
            next.add_task(*task);
        }
        for task in &replacement {
            next.add_task(*task);
        }
        let rewritten = self
            .constraints()
            .filter_map(|c| {
                if c.mentions(old) {
                    c.replace_task(old, &replacement)
                } else {
                    Some(c.clone())
                }
            })
            .collect::<Vec<_>>();
        for constraint in rewritten.into_iter().chain(network.constraints().cloned()) {
            next.merge(constraint)?;
        }
        *self = next;
        Ok(())
    }

    /// Like [`Self::add_constraint`] but treats duplicates as already present.
    fn merge(&mut self, constraint: Constraint) -> Result<(), InvalidConstraint> {
        match self.check(&constraint) {
            Ok(()) => {
                self.record(constraint);
                Ok(())
            }
            Err(Rejection::Duplicate) => Ok(()),
            Err(reason) => {
                trace!(%constraint, %reason, "rewritten constraint rejected");
                Err(InvalidConstraint {
                    kind: constraint.kind(),
                    reason,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use echo_logic::Condition;

    fn id(raw: u64) -> TaskId {
        TaskId::from_raw(raw)
    }

    fn with_tasks(n: u64) -> ConstraintValidator {
        let mut v = ConstraintValidator::new();
        for raw in 1..=n {
            v.add_task(id(raw));
        }
        v
    }

    fn edge(a: u64, b: u64) -> Constraint {
        Constraint::precedence([id(a)], [id(b)])
    }

    #[test]
    fn dangling_reference_is_rejected_without_state_change() {
        let mut v = with_tasks(1);
        let c = edge(1, 2);
        assert!(!v.validate(&c));
        let err = v.add_constraint(c).unwrap_err();
        assert_eq!(err.reason, Rejection::UnknownTask(id(2)));
        assert_eq!(v.constraint_count(), 0);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut v = with_tasks(1);
        let err = v.add_constraint(edge(1, 1)).unwrap_err();
        assert_eq!(err.reason, Rejection::Cycle { from: id(1), to: id(1) });
    }

    #[test]
    fn shared_endpoint_in_one_constraint_is_a_cycle() {
        let mut v = with_tasks(3);
        let c = Constraint::precedence([id(1), id(2)], [id(2), id(3)]);
        assert!(matches!(
            v.add_constraint(c).unwrap_err().reason,
            Rejection::Cycle { .. }
        ));
    }

    #[test]
    fn duplicate_before_is_rejected() {
        let mut v = with_tasks(1);
        let c = Constraint::before([id(1)], Condition::truth());
        v.add_constraint(c.clone()).unwrap();
        assert_eq!(
            v.add_constraint(c).unwrap_err().reason,
            Rejection::Duplicate
        );
        assert_eq!(v.constraint_count(), 1);
    }

    #[test]
    fn between_checks_both_sides() {
        let mut v = with_tasks(1);
        let c = Constraint::between([id(1)], [id(9)], Condition::truth());
        assert_eq!(
            v.add_constraint(c).unwrap_err().reason,
            Rejection::UnknownTask(id(9))
        );
    }

    #[test]
    fn reachability_follows_fanned_edges() {
        let mut v = with_tasks(4);
        v.add_constraint(Constraint::precedence([id(1)], [id(2), id(3)]))
            .unwrap();
        v.add_constraint(edge(3, 4)).unwrap();
        assert!(v.reachable(id(1), id(4)));
        assert!(!v.reachable(id(2), id(4)));
        assert!(!v.reachable(id(4), id(1)));
    }

    fn network_of(tasks: &[&crate::Task]) -> TaskNetwork {
        let mut b = TaskNetwork::builder();
        for t in tasks {
            b.add_task((*t).clone());
        }
        b.build()
    }

    #[test]
    fn replace_fans_out_and_removes_the_old_task() {
        let mut v = with_tasks(3);
        v.add_constraint(edge(1, 2)).unwrap();
        v.add_constraint(Constraint::after([id(2)], Condition::truth()))
            .unwrap();
        let s1 = crate::Task::builder("s1").primitive(true).build();
        let s2 = crate::Task::builder("s2").primitive(true).build();
        v.replace(id(2), &network_of(&[&s1, &s2])).unwrap();
        assert!(!v.contains_task(id(2)));
        assert!(v.contains_task(s1.id()) && v.contains_task(s2.id()));
        assert!(v.constraints().all(|c| !c.mentions(id(2))));
        assert!(v.contains_constraint(&Constraint::precedence(
            [id(1)],
            [s1.id(), s2.id()]
        )));
        assert!(v.reachable(id(1), s2.id()));
    }

    #[test]
    fn replace_rejects_cycle_and_keeps_state() {
        // 1 < 2; replacing 2 by a network that contains 1 yields 1 < {1}.
        let mut v = with_tasks(2);
        v.add_constraint(edge(1, 2)).unwrap();
        let mut b = TaskNetwork::builder();
        let one = crate::Task::builder("one").build();
        b.add_task(one.clone());
        let sub = b.build();
        // Rebind the sub-network's task to id 1 by seeding a validator that
        // already knows it.
        let mut v2 = ConstraintValidator::new();
        v2.add_task(one.id());
        v2.add_task(id(2));
        v2.add_constraint(Constraint::precedence([one.id()], [id(2)]))
            .unwrap();
        let before: Vec<Constraint> = v2.constraints().cloned().collect();
        let err = v2.replace(id(2), &sub).unwrap_err();
        assert_eq!(
            err,
            DecompositionError::InvalidConstraint(InvalidConstraint {
                kind: ConstraintKind::Precedence,
                reason: Rejection::Cycle {
                    from: one.id(),
                    to: one.id()
                },
            })
        );
        assert!(v2.contains_task(id(2)));
        assert_eq!(v2.constraints().cloned().collect::<Vec<_>>(), before);
        assert_eq!(v.constraint_count(), 1);
    }

    #[test]
    fn replacing_a_non_member_is_rejected() {
        let mut v = with_tasks(2);
        v.add_constraint(edge(1, 2)).unwrap();
        let s1 = crate::Task::builder("s1").primitive(true).build();
        let err = v.replace(id(7), &network_of(&[&s1])).unwrap_err();
        assert_eq!(err, DecompositionError::UnknownTask(id(7)));
        assert!(!v.contains_task(s1.id()));
        assert_eq!(v.tasks().len(), 2);
        assert_eq!(v.constraint_count(), 1);
    }
}
