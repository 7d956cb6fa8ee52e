// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Task networks and their validator-backed builder.
use std::collections::{BTreeMap, BTreeSet};

use core::fmt;

use echo_logic::{Substitution, Variable};

use crate::constraint::Constraint;
use crate::error::{DecompositionError, InvalidConstraint};
use crate::ident::TaskId;
use crate::task::Task;
use crate::validator::ConstraintValidator;

/// An immutable set of task occurrences plus constraints over them.
///
/// # Invariants
/// - Referential closure: every constraint references member tasks only.
/// - Acyclicity: precedence edges form no cycle, self-loops included.
///
/// Both hold because the only way to obtain a `TaskNetwork` is through a
/// [`TaskNetworkBuilder`], which validates each constraint before committing
/// it. Substitution and decomposition return new networks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskNetwork {
    tasks: BTreeMap<TaskId, Task>,
    constraints: BTreeSet<Constraint>,
}

impl TaskNetwork {
    /// Starts an empty builder.
    pub fn builder() -> TaskNetworkBuilder {
        TaskNetworkBuilder::new()
    }

    /// The network with no tasks and no constraints.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tasks in id (creation) order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Looks up a task occurrence.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Returns `true` if `id` is a member.
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Ids of every member task.
    pub fn task_ids(&self) -> BTreeSet<TaskId> {
        self.tasks.keys().copied().collect()
    }

    /// Constraints in canonical order.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when the network has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Returns `true` when every task is primitive (vacuously for the empty
    /// network).
    pub fn is_primitive(&self) -> bool {
        self.tasks.values().all(Task::is_primitive)
    }

    /// Non-primitive tasks in id order.
    pub fn non_primitive_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values().filter(|t| !t.is_primitive())
    }

    /// Variables mentioned by tasks and constraint conditions.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out: BTreeSet<Variable> = self.tasks.values().flat_map(Task::variables).collect();
        for condition in self.constraints.iter().filter_map(Constraint::condition) {
            out.extend(condition.variables());
        }
        out
    }

    /// Returns a copy with `substitution` applied to every task and condition.
    ///
    /// Task occurrences keep their ids.
    #[must_use]
    pub fn apply(&self, substitution: &Substitution) -> Self {
        let mut builder = TaskNetworkBuilder::copy(self);
        builder.apply(substitution);
        builder.build()
    }

    /// Returns a copy where `old` is replaced by the tasks of `network`, with
    /// constraints on `old` fanned out to all of them.
    ///
    /// # Errors
    /// [`DecompositionError::UnknownTask`] if `old` is not a member;
    /// [`DecompositionError::InvalidConstraint`] if the rewritten constraints
    /// are not admissible.
    pub fn replace(&self, old: TaskId, network: &TaskNetwork) -> Result<Self, DecompositionError> {
        let mut builder = TaskNetworkBuilder::copy(self);
        builder.replace(old, network)?;
        Ok(builder.build())
    }

    /// Returns an isomorphic network whose tasks are new occurrences.
    ///
    /// Used when instantiating a method template so repeated applications
    /// never share task identities.
    #[must_use]
    pub fn reissued(&self) -> Self {
        let mut renames = BTreeMap::new();
        let mut tasks = BTreeMap::new();
        for task in self.tasks.values() {
            let fresh = task.reissued();
            renames.insert(task.id(), fresh.id());
            tasks.insert(fresh.id(), fresh);
        }
        let constraints = self.constraints.iter().map(|c| c.remap(&renames)).collect();
        Self { tasks, constraints }
    }
}

impl fmt::Display for TaskNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("tasks:")?;
        for task in self.tasks.values() {
            write!(f, " {}={task}", task.id())?;
        }
        for constraint in &self.constraints {
            write!(f, "\n  {constraint}")?;
        }
        Ok(())
    }
}

/// Incremental, validating builder for [`TaskNetwork`].
///
/// Each constraint is checked against a bound [`ConstraintValidator`] before
/// it is stored, so a failed call leaves the builder exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct TaskNetworkBuilder {
    tasks: BTreeMap<TaskId, Task>,
    constraints: BTreeSet<Constraint>,
    validator: ConstraintValidator,
}

impl TaskNetworkBuilder {
    /// Creates an empty builder with a fresh validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reseeds a builder from `network` against a fresh validator.
    pub fn copy(network: &TaskNetwork) -> Self {
        let mut validator = ConstraintValidator::new();
        for id in network.tasks.keys() {
            validator.add_task(*id);
        }
        // The network's constraints were validated when it was built.
        for constraint in &network.constraints {
            validator.record(constraint.clone());
        }
        Self {
            tasks: network.tasks.clone(),
            constraints: network.constraints.clone(),
            validator,
        }
    }

    /// Adds a task and returns its id.
    pub fn add_task(&mut self, task: Task) -> TaskId {
        let id = task.id();
        self.validator.add_task(id);
        self.tasks.insert(id, task);
        id
    }

    /// Validates and adds a constraint.
    ///
    /// # Errors
    /// Returns [`InvalidConstraint`] for a dangling reference, a duplicate or
    /// a precedence cycle; the builder is unchanged.
    pub fn add_constraint(
        &mut self,
        constraint: Constraint,
    ) -> Result<&mut Self, InvalidConstraint> {
        self.validator.add_constraint(constraint.clone())?;
        self.constraints.insert(constraint);
        Ok(self)
    }

    /// Tasks added so far.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Read access to the bound validator.
    pub fn validator(&self) -> &ConstraintValidator {
        &self.validator
    }

    /// Applies `substitution` to every task and constraint.
    pub fn apply(&mut self, substitution: &Substitution) {
        self.tasks = self
            .tasks
            .iter()
            .map(|(id, task)| (*id, task.apply(substitution)))
            .collect();
        self.validator.apply(substitution);
        self.mirror_constraints();
    }

    /// Replaces `old` with the tasks of `network`, fanning out constraints.
    ///
    /// # Errors
    /// Fails like [`TaskNetwork::replace`]; the builder is unchanged.
    pub fn replace(
        &mut self,
        old: TaskId,
        network: &TaskNetwork,
    ) -> Result<(), DecompositionError> {
        self.validator.replace(old, network)?;
        self.tasks.remove(&old);
        self.tasks
            .extend(network.tasks.iter().map(|(id, t)| (*id, t.clone())));
        self.mirror_constraints();
        Ok(())
    }

    fn mirror_constraints(&mut self) {
        self.constraints = self.validator.constraints().cloned().collect();
    }

    /// Freezes the network.
    pub fn build(self) -> TaskNetwork {
        TaskNetwork {
            tasks: self.tasks,
            constraints: self.constraints,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::error::Rejection;
    use echo_logic::{make_constant, make_variable, Condition};

    fn prim(name: &str) -> Task {
        Task::builder(name).primitive(true).build()
    }

    #[test]
    fn failed_constraint_leaves_builder_unchanged() {
        let mut b = TaskNetwork::builder();
        let a = b.add_task(prim("a"));
        let c = b.add_task(prim("c"));
        b.add_constraint(Constraint::precedence([a], [c])).unwrap();
        let err = b
            .add_constraint(Constraint::precedence([c], [a]))
            .unwrap_err();
        assert!(matches!(err.reason, Rejection::Cycle { .. }));
        let net = b.build();
        assert_eq!(net.constraint_count(), 1);
        assert_eq!(net.len(), 2);
    }

    #[test]
    fn empty_network_is_primitive() {
        assert!(TaskNetwork::empty().is_primitive());
        assert!(TaskNetwork::empty().is_empty());
    }

    #[test]
    fn apply_rewrites_tasks_and_conditions() {
        let x = make_variable("x");
        let mut b = TaskNetwork::builder();
        let t = b.add_task(Task::builder("drop").arg(x.clone()).primitive(true).build());
        let cond: Condition =
            echo_logic::make_atom("have", [echo_logic::Term::from(x.clone())]).into();
        b.add_constraint(Constraint::before([t], cond)).unwrap();
        let net = b.build();
        let mut s = Substitution::new();
        s.bind(x, make_constant("kiwi").into()).unwrap();
        let bound = net.apply(&s);
        assert_eq!(bound.task(t).map(ToString::to_string).as_deref(), Some("drop(kiwi)"));
        assert!(bound.variables().is_empty());
        assert!(!net.variables().is_empty());
    }

    #[test]
    fn replacing_a_non_member_leaves_the_network_alone() {
        let mut b = TaskNetwork::builder();
        b.add_task(prim("a"));
        let net = b.build();
        let mut sub = TaskNetwork::builder();
        sub.add_task(prim("s"));
        let stranger = TaskId::from_raw(u64::MAX);
        let err = net.replace(stranger, &sub.build()).unwrap_err();
        assert_eq!(err, DecompositionError::UnknownTask(stranger));
        assert_eq!(net.len(), 1);
    }

    #[test]
    fn reissued_network_is_isomorphic() {
        let mut b = TaskNetwork::builder();
        let a = b.add_task(prim("a"));
        let c = b.add_task(prim("c"));
        b.add_constraint(Constraint::precedence([a], [c])).unwrap();
        let net = b.build();
        let copy = net.reissued();
        assert_eq!(copy.len(), 2);
        assert!(copy.task_ids().is_disjoint(&net.task_ids()));
        let c2 = copy.constraints().next().unwrap();
        assert!(c2.references().all(|id| copy.contains(id)));
    }
}
