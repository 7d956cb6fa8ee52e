// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-search helper: task selection, pruning and plan linearization.
use std::collections::{BTreeMap, BTreeSet};

use echo_logic::{Condition, Effect, State};
use tracing::trace;

use crate::action::{ActionFactory, Plan};
use crate::config::{PlannerConfig, StateProgression};
use crate::constraint::{Constraint, ConstraintKind};
use crate::domain::{Domain, DomainHelper, Method};
use crate::error::{NonPrimitiveTaskNotFound, SearchFailure};
use crate::ident::TaskId;
use crate::network::TaskNetwork;
use crate::sort::SortService;
use crate::task::Task;

/// Domain lookups plus the read-only initial state of one search.
#[derive(Debug)]
pub struct PlannerHelper<'d> {
    domain: DomainHelper<'d>,
    state: &'d State,
    progression: StateProgression,
    check_conditions: bool,
}

impl<'d> PlannerHelper<'d> {
    /// Creates a helper with the default plan-checking policy.
    pub fn new(domain: &'d Domain, state: &'d State) -> Self {
        Self::with_config(domain, state, &PlannerConfig::default())
    }

    /// Creates a helper using the checking policy from `config`.
    pub fn with_config(domain: &'d Domain, state: &'d State, config: &PlannerConfig) -> Self {
        Self {
            domain: DomainHelper::new(domain),
            state,
            progression: config.state_progression,
            check_conditions: config.check_constraint_conditions,
        }
    }

    /// Domain lookup tables.
    pub fn domain(&self) -> &DomainHelper<'d> {
        &self.domain
    }

    /// The initial state.
    pub fn state(&self) -> &'d State {
        self.state
    }

    /// Returns `true` when `network` provably has no solution.
    ///
    /// A network is unsolvable when some non-primitive task has no method
    /// whose pattern matches its name and arity, or some primitive task has
    /// no operator with its name and arity. Neither can be repaired by
    /// further decomposition, so no solvable branch is ever rejected.
    pub fn is_unsolvable(&self, network: &TaskNetwork) -> bool {
        network.tasks().any(|task| {
            let dead = if task.is_primitive() {
                self.domain
                    .get_operator_by_name(task.name())
                    .is_none_or(|op| op.arity() != task.arity())
            } else {
                !self
                    .domain
                    .get_methods_by_task(task)
                    .iter()
                    .any(|m| m.task().arity() == task.arity())
            };
            if dead {
                trace!(task = %task, "dead end");
            }
            dead
        })
    }

    /// First non-primitive task in id order.
    ///
    /// # Errors
    /// Returns [`NonPrimitiveTaskNotFound`] when the network is primitive.
    pub fn find_non_primitive<'n>(
        &self,
        network: &'n TaskNetwork,
    ) -> Result<&'n Task, NonPrimitiveTaskNotFound> {
        network.non_primitive_tasks().next().ok_or(NonPrimitiveTaskNotFound)
    }

    /// Methods that may decompose `task`, in declaration order.
    pub fn candidate_methods(&self, task: &Task) -> Vec<&'d Method> {
        self.domain.get_methods_by_task(task)
    }

    /// Orders a primitive network and grounds it into a plan.
    ///
    /// Every precondition is checked against the state selected by the
    /// progression policy; Before/After/Between conditions are checked on the
    /// resulting state sequence when enabled.
    ///
    /// # Errors
    /// [`SearchFailure::Unorderable`], [`SearchFailure::NotActionable`],
    /// [`SearchFailure::PreconditionFailed`] or
    /// [`SearchFailure::ConditionViolated`].
    pub fn linearize(
        &self,
        network: &TaskNetwork,
        sorter: &dyn SortService,
    ) -> Result<Plan, SearchFailure> {
        let tasks: Vec<Task> = network.tasks().cloned().collect();
        let constraints: Vec<Constraint> = network.constraints().cloned().collect();
        let ordered = sorter
            .sort_by_constraints(&tasks, &constraints)
            .map_err(|e| e.cause)?;

        let factory = ActionFactory::new(&self.domain);
        let mut trajectory = Trajectory::new(self.state, self.progression);
        let mut positions = BTreeMap::new();
        let mut plan = Plan::new();
        for (index, task) in ordered.iter().enumerate() {
            let (action, operator) = factory.create_with_operator(task)?;
            let precondition = action.ground(operator.precondition());
            if !trajectory.before(index).ask(&precondition) {
                return Err(SearchFailure::PreconditionFailed {
                    action: action.to_string(),
                    condition: precondition.to_string(),
                });
            }
            trajectory.advance(&action.ground_effects(operator));
            positions.insert(task.id(), index);
            plan.push(action);
        }

        if self.check_conditions {
            for constraint in &constraints {
                check_condition(constraint, &positions, &trajectory)?;
            }
        }
        Ok(plan)
    }
}

/// States along a linear plan: `before(i)` is the state action `i` sees.
#[derive(Debug)]
struct Trajectory<'s> {
    initial: &'s State,
    progression: StateProgression,
    applied: Vec<State>,
}

impl<'s> Trajectory<'s> {
    fn new(initial: &'s State, progression: StateProgression) -> Self {
        Self {
            initial,
            progression,
            applied: Vec::new(),
        }
    }

    fn advance(&mut self, effects: &[Effect]) {
        if self.progression == StateProgression::Apply {
            let next = self.latest().apply_effects(effects);
            self.applied.push(next);
        }
    }

    fn latest(&self) -> &State {
        self.applied.last().unwrap_or(self.initial)
    }

    fn before(&self, index: usize) -> &State {
        match (self.progression, index.checked_sub(1)) {
            (StateProgression::Apply, Some(prev)) => self.applied.get(prev).unwrap_or(self.initial),
            _ => self.initial,
        }
    }
}

fn check_condition(
    constraint: &Constraint,
    positions: &BTreeMap<TaskId, usize>,
    trajectory: &Trajectory<'_>,
) -> Result<(), SearchFailure> {
    let first = |ids: &BTreeSet<TaskId>| {
        ids.iter().filter_map(|id| positions.get(id)).copied().min()
    };
    let last = |ids: &BTreeSet<TaskId>| {
        ids.iter().filter_map(|id| positions.get(id)).copied().max()
    };
    let violated = |kind: ConstraintKind, condition: &Condition| SearchFailure::ConditionViolated {
        kind,
        condition: condition.to_string(),
    };
    match constraint {
        Constraint::Precedence { .. } => Ok(()),
        Constraint::Before { tasks, condition } => match first(tasks) {
            Some(i) if !trajectory.before(i).ask(condition) => {
                Err(violated(ConstraintKind::Before, condition))
            }
            _ => Ok(()),
        },
        Constraint::After { tasks, condition } => match last(tasks) {
            Some(i) if !trajectory.before(i + 1).ask(condition) => {
                Err(violated(ConstraintKind::After, condition))
            }
            _ => Ok(()),
        },
        Constraint::Between {
            preceding,
            proceeding,
            condition,
        } => {
            let (Some(open), Some(close)) = (last(preceding), first(proceeding)) else {
                return Ok(());
            };
            // An interval that closes before it opens holds vacuously.
            if (open + 1..=close).any(|i| !trajectory.before(i).ask(condition)) {
                return Err(violated(ConstraintKind::Between, condition));
            }
            Ok(())
        }
    }
}
