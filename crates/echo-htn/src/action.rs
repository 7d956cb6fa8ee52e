// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Grounded actions, plans, and the factory turning primitive tasks into actions.
use std::collections::BTreeMap;

use core::fmt;

use echo_logic::{Condition, Constant, Effect, Substitution, Term, Variable};

use crate::domain::{DomainHelper, Operator};
use crate::error::{NotActionableReason, TaskNotActionable};
use crate::task::Task;

/// An operator applied to constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    operator: String,
    arguments: Vec<Constant>,
    bindings: BTreeMap<Variable, Constant>,
}

impl Action {
    /// Operator name.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Ground arguments in parameter order.
    pub fn arguments(&self) -> &[Constant] {
        &self.arguments
    }

    /// Parameter bindings.
    pub fn bindings(&self) -> &BTreeMap<Variable, Constant> {
        &self.bindings
    }

    /// The bindings as a substitution.
    pub fn substitution(&self) -> Substitution {
        self.bindings
            .iter()
            .map(|(v, c)| (v.clone(), Term::Constant(c.clone())))
            .collect()
    }

    /// Grounds a condition over the operator's parameters.
    pub fn ground(&self, condition: &Condition) -> Condition {
        condition.apply(&self.substitution())
    }

    /// Grounds the effects of `operator` with this action's bindings.
    pub fn ground_effects(&self, operator: &Operator) -> Vec<Effect> {
        let substitution = self.substitution();
        operator
            .effects()
            .iter()
            .map(|e| e.apply(&substitution))
            .collect()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operator)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// An ordered sequence of actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    actions: Vec<Action>,
}

impl Plan {
    /// The empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action.
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Actions in execution order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` for the empty plan.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterates actions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }
}

impl FromIterator<Action> for Plan {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Plan {
    type Item = Action;
    type IntoIter = std::vec::IntoIter<Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{action}")?;
        }
        f.write_str("]")
    }
}

/// Turns primitive tasks into actions using the domain's operators.
#[derive(Debug, Clone, Copy)]
pub struct ActionFactory<'h, 'd> {
    helper: &'h DomainHelper<'d>,
}

impl<'h, 'd> ActionFactory<'h, 'd> {
    /// Creates a factory over `helper`'s operators.
    pub fn new(helper: &'h DomainHelper<'d>) -> Self {
        Self { helper }
    }

    /// Binds the operator named after `task` to the task's arguments.
    ///
    /// # Errors
    /// Returns [`TaskNotActionable`] when no operator has the task's name,
    /// the arity differs, or an argument is not a constant.
    pub fn create(&self, task: &Task) -> Result<Action, TaskNotActionable> {
        self.create_with_operator(task).map(|(action, _)| action)
    }

    /// Like [`ActionFactory::create`], also returning the matched operator.
    ///
    /// # Errors
    /// See [`ActionFactory::create`].
    pub fn create_with_operator(
        &self,
        task: &Task,
    ) -> Result<(Action, &'d Operator), TaskNotActionable> {
        let fail = |reason| TaskNotActionable {
            task: task.to_string(),
            reason,
        };
        let operator = self
            .helper
            .get_operator_by_name(task.name())
            .ok_or_else(|| fail(NotActionableReason::UnknownOperator(task.name().to_owned())))?;
        if operator.arity() != task.arity() {
            return Err(fail(NotActionableReason::ArityMismatch {
                expected: operator.arity(),
                found: task.arity(),
            }));
        }
        let mut arguments = Vec::with_capacity(task.arity());
        let mut bindings = BTreeMap::new();
        for (parameter, arg) in operator.parameters().iter().zip(task.args()) {
            let Some(constant) = arg.as_constant() else {
                return Err(fail(NotActionableReason::UnboundArgument(arg.to_string())));
            };
            arguments.push(constant.clone());
            bindings.insert(parameter.clone(), constant.clone());
        }
        let action = Action {
            operator: operator.name().to_owned(),
            arguments,
            bindings,
        };
        Ok((action, operator))
    }
}
