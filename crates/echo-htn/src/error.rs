// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Failure kinds.
//!
//! Two failures are externally visible: [`InvalidConstraint`] and
//! [`PlanNotFound`]. [`UnifierNotFound`], [`TaskNotActionable`] and
//! [`NonPrimitiveTaskNotFound`] are search-internal signals that the planner
//! turns into backtracking.
use thiserror::Error;

use crate::constraint::ConstraintKind;
use crate::ident::TaskId;

/// Why a constraint was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The constraint references a task that is not a member of the network.
    #[error("task {0} is not a member of the network")]
    UnknownTask(TaskId),
    /// A value-equal constraint was already accepted.
    #[error("an equal constraint was already accepted")]
    Duplicate,
    /// Admitting the ordering edge `from -> to` would close a cycle.
    #[error("ordering {from} before {to} closes a cycle")]
    Cycle {
        /// Preceding endpoint of the offending edge.
        from: TaskId,
        /// Proceeding endpoint of the offending edge.
        to: TaskId,
    },
}

/// A constraint could not be accepted (dangling reference, duplicate or cycle).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} constraint: {reason}")]
pub struct InvalidConstraint {
    /// Kind of the rejected constraint.
    pub kind: ConstraintKind,
    /// Reason for the rejection.
    pub reason: Rejection,
}

/// Why a task does not unify with a method's pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnifyFailure {
    /// Task and pattern names differ.
    #[error("name mismatch")]
    NameMismatch,
    /// Task and pattern take a different number of arguments.
    #[error("arity mismatch: pattern takes {expected}, task has {found}")]
    ArityMismatch {
        /// Pattern arity.
        expected: usize,
        /// Task arity.
        found: usize,
    },
    /// Two distinct constants would have to be equal.
    #[error("cannot unify {left} with {right}")]
    Clash {
        /// Term on the pattern side (after walking bindings).
        left: String,
        /// Term on the task side (after walking bindings).
        right: String,
    },
}

/// No substitution makes a method's pattern equal to the task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no unifier for {task} with method {method}: {reason}")]
pub struct UnifierNotFound {
    /// Rendered task.
    pub task: String,
    /// Method name.
    pub method: String,
    /// Failure detail.
    pub reason: UnifyFailure,
}

/// Why a primitive task cannot be turned into an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotActionableReason {
    /// No operator carries the task's name.
    #[error("no operator named {0}")]
    UnknownOperator(String),
    /// The operator takes a different number of parameters.
    #[error("operator takes {expected} parameters, task has {found}")]
    ArityMismatch {
        /// Operator arity.
        expected: usize,
        /// Task arity.
        found: usize,
    },
    /// An argument is still a variable.
    #[error("argument {0} is unbound")]
    UnboundArgument(String),
}

/// A primitive task has no matching operator or is not ground.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task {task} is not actionable: {reason}")]
pub struct TaskNotActionable {
    /// Rendered task.
    pub task: String,
    /// Failure detail.
    pub reason: NotActionableReason,
}

/// The network holds no non-primitive task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("network contains no non-primitive task")]
pub struct NonPrimitiveTaskNotFound;

/// Failure to replace or decompose a task inside a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecompositionError {
    /// The task to replace is not a member of the network.
    #[error("task {0} is not a member of the network")]
    UnknownTask(TaskId),
    /// The rewritten constraints are not admissible.
    #[error(transparent)]
    InvalidConstraint(#[from] InvalidConstraint),
}

/// The specific reason a search branch (or the whole search) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchFailure {
    /// Every candidate method for the task failed.
    #[error("no method decomposes {0}")]
    MethodsExhausted(String),
    /// The network was pruned as unsolvable.
    #[error("network pruned as unsolvable")]
    Pruned,
    /// The precedence constraints admit no linear order.
    #[error("constraints admit no linear order")]
    Unorderable,
    /// A primitive task could not become an action.
    #[error(transparent)]
    NotActionable(#[from] TaskNotActionable),
    /// An operator precondition does not hold.
    #[error("precondition {condition} of {action} does not hold")]
    PreconditionFailed {
        /// Rendered action.
        action: String,
        /// Rendered grounded precondition.
        condition: String,
    },
    /// A Before/After/Between condition does not hold.
    #[error("{kind} condition {condition} does not hold")]
    ConditionViolated {
        /// Kind of the violated constraint.
        kind: ConstraintKind,
        /// Rendered condition.
        condition: String,
    },
    /// The branch reached the configured decomposition depth.
    #[error("decomposition depth limit {0} reached")]
    DepthLimit(usize),
    /// The configured node budget ran out.
    #[error("search budget of {0} nodes exhausted")]
    BudgetExhausted(u64),
}

/// No complete primitive decomposition satisfies constraints and preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("plan not found: {cause}")]
pub struct PlanNotFound {
    /// The last failure observed before the search gave up.
    pub cause: SearchFailure,
}

impl From<SearchFailure> for PlanNotFound {
    fn from(cause: SearchFailure) -> Self {
        Self { cause }
    }
}
