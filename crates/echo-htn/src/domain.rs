// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Planning domain models: operators, methods, domains and problems.
use std::collections::BTreeSet;

use echo_logic::{fresh_scope, Condition, Effect, State, Substitution, Term, Variable};
use rustc_hash::FxHashMap;

use crate::network::TaskNetwork;
use crate::task::Task;

/// An action template: parameters, a precondition and effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    name: String,
    parameters: Vec<Variable>,
    precondition: Condition,
    effects: Vec<Effect>,
}

impl Operator {
    /// Creates an operator with a trivially true precondition and no effects.
    pub fn new(name: impl Into<String>, parameters: impl IntoIterator<Item = Variable>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().collect(),
            precondition: Condition::truth(),
            effects: Vec::new(),
        }
    }

    /// Sets the precondition.
    pub fn with_precondition(mut self, precondition: Condition) -> Self {
        self.precondition = precondition;
        self
    }

    /// Appends an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Operator name; primitive tasks refer to it by name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered parameters.
    pub fn parameters(&self) -> &[Variable] {
        &self.parameters
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Precondition over the parameters.
    pub fn precondition(&self) -> &Condition {
        &self.precondition
    }

    /// Effects over the parameters.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }
}

/// A decomposition: a compound task pattern and the subtask network that
/// accomplishes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    name: String,
    task: Task,
    network: TaskNetwork,
}

impl Method {
    /// Creates a method from its pattern task and template network.
    pub fn new(name: impl Into<String>, task: Task, network: TaskNetwork) -> Self {
        Self {
            name: name.into(),
            task,
            network,
        }
    }

    /// Method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The abstract task pattern this method decomposes.
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// The subtask network template.
    pub fn network(&self) -> &TaskNetwork {
        &self.network
    }

    /// Variables local to the method (pattern and template).
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut vars = self.task.variables();
        vars.extend(self.network.variables());
        vars
    }

    /// Returns a fresh instance of this method: every local variable is moved
    /// into a new scope and every task becomes a new occurrence.
    #[must_use]
    pub fn standardize_apart(&self) -> Self {
        let scope = fresh_scope();
        let renaming: Substitution = self
            .variables()
            .into_iter()
            .map(|v| {
                let renamed = Term::Variable(v.rescoped(scope));
                (v, renamed)
            })
            .collect();
        Self {
            name: self.name.clone(),
            task: self.task.apply(&renaming).reissued(),
            network: self.network.apply(&renaming).reissued(),
        }
    }
}

/// A planning domain: operators and methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domain {
    name: String,
    operators: Vec<Operator>,
    methods: Vec<Method>,
}

impl Domain {
    /// Starts a builder for a domain named `name`.
    pub fn builder(name: impl Into<String>) -> DomainBuilder {
        DomainBuilder {
            domain: Domain {
                name: name.into(),
                ..Domain::default()
            },
        }
    }

    /// Domain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operators in declaration order.
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

/// Builder for [`Domain`].
#[derive(Debug, Clone)]
pub struct DomainBuilder {
    domain: Domain,
}

impl DomainBuilder {
    /// Adds an operator.
    pub fn operator(mut self, operator: Operator) -> Self {
        self.domain.operators.push(operator);
        self
    }

    /// Adds a method.
    pub fn method(mut self, method: Method) -> Self {
        self.domain.methods.push(method);
        self
    }

    /// Finishes the domain.
    pub fn build(self) -> Domain {
        self.domain
    }
}

/// A planning problem: an initial state and the task network to accomplish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Problem {
    name: String,
    state: State,
    network: TaskNetwork,
}

impl Problem {
    /// Creates a problem.
    pub fn new(name: impl Into<String>, state: State, network: TaskNetwork) -> Self {
        Self {
            name: name.into(),
            state,
            network,
        }
    }

    /// Problem name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Initial state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Initial task network.
    pub fn network(&self) -> &TaskNetwork {
        &self.network
    }
}

/// Lookup tables over a [`Domain`].
#[derive(Debug)]
pub struct DomainHelper<'d> {
    domain: &'d Domain,
    methods_by_task: FxHashMap<&'d str, Vec<usize>>,
    operators_by_name: FxHashMap<&'d str, usize>,
}

impl<'d> DomainHelper<'d> {
    /// Indexes `domain`.
    ///
    /// When two operators share a name the first declared wins.
    pub fn new(domain: &'d Domain) -> Self {
        let mut methods_by_task: FxHashMap<&'d str, Vec<usize>> = FxHashMap::default();
        for (index, method) in domain.methods.iter().enumerate() {
            methods_by_task
                .entry(method.task.name())
                .or_default()
                .push(index);
        }
        let mut operators_by_name = FxHashMap::default();
        for (index, operator) in domain.operators.iter().enumerate() {
            operators_by_name.entry(operator.name()).or_insert(index);
        }
        Self {
            domain,
            methods_by_task,
            operators_by_name,
        }
    }

    /// The indexed domain.
    pub fn domain(&self) -> &'d Domain {
        self.domain
    }

    /// Candidate methods whose pattern name matches `task`, in declaration order.
    pub fn get_methods_by_task(&self, task: &Task) -> Vec<&'d Method> {
        let domain = self.domain;
        self.methods_by_task
            .get(task.name())
            .map(|indices| indices.iter().map(|i| &domain.methods[*i]).collect())
            .unwrap_or_default()
    }

    /// Looks up an operator by name.
    pub fn get_operator_by_name(&self, name: &str) -> Option<&'d Operator> {
        let domain = self.domain;
        self.operators_by_name
            .get(name)
            .map(|i| &domain.operators[*i])
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use echo_logic::make_variable;

    #[test]
    fn standardize_apart_renames_variables_and_tasks() {
        let x = make_variable("x");
        let pattern = Task::builder("go").arg(x.clone()).build();
        let mut b = TaskNetwork::builder();
        b.add_task(Task::builder("walk").arg(x.clone()).primitive(true).build());
        let method = Method::new("go-walk", pattern, b.build());

        let fresh = method.standardize_apart();
        assert_ne!(fresh.task().id(), method.task().id());
        assert!(fresh.variables().is_disjoint(&method.variables()));
        assert_eq!(fresh.variables().len(), 1);
        let pattern_var = fresh.task().args()[0].as_variable().cloned();
        let sub_var = fresh.network().tasks().next().unwrap().args()[0]
            .as_variable()
            .cloned();
        assert_eq!(pattern_var, sub_var);
    }

    #[test]
    fn helper_indexes_by_name() {
        let domain = Domain::builder("d")
            .operator(Operator::new("walk", [make_variable("x")]))
            .method(Method::new(
                "m1",
                Task::builder("go").build(),
                TaskNetwork::empty(),
            ))
            .method(Method::new(
                "m2",
                Task::builder("go").build(),
                TaskNetwork::empty(),
            ))
            .build();
        let helper = DomainHelper::new(&domain);
        let probe = Task::builder("go").build();
        let methods = helper.get_methods_by_task(&probe);
        let names: Vec<&str> = methods.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["m1", "m2"]);
        assert!(helper.get_operator_by_name("walk").is_some());
        assert!(helper.get_operator_by_name("fly").is_none());
        assert!(helper
            .get_methods_by_task(&Task::builder("stay").build())
            .is_empty());
    }
}
