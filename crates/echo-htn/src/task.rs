// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tasks and the task builder.
use std::collections::BTreeSet;

use core::fmt;

use echo_logic::{apply_terms, Substitution, Term, Variable};

use crate::ident::TaskId;

/// One task occurrence: a symbolic name over ordered arguments.
///
/// A task carries two notions of equality:
/// - occurrence identity ([`Task::id`]), used for network membership and
///   constraint references;
/// - structural value ([`Task::same_structure`]), name plus arguments, used
///   for pattern matching.
///
/// Tasks are immutable; [`Task::apply`] returns a new value for the same
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Task {
    id: TaskId,
    name: String,
    args: Vec<Term>,
    primitive: bool,
}

impl Task {
    /// Starts building a task named `name`.
    pub fn builder(name: impl Into<String>) -> TaskBuilder {
        TaskBuilder::new(name)
    }

    /// Occurrence identity.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered arguments.
    pub fn args(&self) -> &[Term] {
        &self.args
    }

    /// Number of arguments.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` for tasks an operator executes directly.
    pub fn is_primitive(&self) -> bool {
        self.primitive
    }

    /// Returns `true` if every argument is a constant.
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    /// Structural equality: same name, arguments and primitiveness,
    /// regardless of occurrence.
    pub fn same_structure(&self, other: &Task) -> bool {
        self.name == other.name && self.args == other.args && self.primitive == other.primitive
    }

    /// Variables appearing in the arguments.
    pub fn variables(&self) -> BTreeSet<Variable> {
        self.args.iter().filter_map(Term::as_variable).cloned().collect()
    }

    /// Returns the same occurrence with `substitution` applied to its arguments.
    #[must_use]
    pub fn apply(&self, substitution: &Substitution) -> Task {
        Task {
            id: self.id,
            name: self.name.clone(),
            args: apply_terms(&self.args, substitution),
            primitive: self.primitive,
        }
    }

    /// Returns a structurally equal task under a new occurrence id.
    #[must_use]
    pub fn reissued(&self) -> Task {
        Task {
            id: TaskId::fresh(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// Builder for [`Task`]. Every [`TaskBuilder::build`] issues a new occurrence.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    name: String,
    args: Vec<Term>,
    primitive: bool,
}

impl TaskBuilder {
    /// Starts a non-primitive task named `name` with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            primitive: false,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, term: impl Into<Term>) -> Self {
        self.args.push(term.into());
        self
    }

    /// Appends several arguments.
    pub fn args(mut self, terms: impl IntoIterator<Item = Term>) -> Self {
        self.args.extend(terms);
        self
    }

    /// Marks the task primitive (or not).
    pub fn primitive(mut self, primitive: bool) -> Self {
        self.primitive = primitive;
        self
    }

    /// Freezes the task under a fresh [`TaskId`].
    pub fn build(&self) -> Task {
        Task {
            id: TaskId::fresh(),
            name: self.name.clone(),
            args: self.args.clone(),
            primitive: self.primitive,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use echo_logic::{make_constant, make_variable};

    #[test]
    fn occurrences_differ_but_structure_matches() {
        let b = Task::builder("pickup").arg(make_constant("kiwi")).primitive(true);
        let first = b.build();
        let second = b.build();
        assert_ne!(first.id(), second.id());
        assert_ne!(first, second);
        assert!(first.same_structure(&second));
    }

    #[test]
    fn apply_keeps_the_occurrence() {
        let x = make_variable("x");
        let task = Task::builder("drop").arg(x.clone()).primitive(true).build();
        assert!(!task.is_ground());
        let mut s = Substitution::new();
        s.bind(x, make_constant("kiwi").into()).unwrap();
        let bound = task.apply(&s);
        assert_eq!(bound.id(), task.id());
        assert!(bound.is_ground());
        assert_eq!(bound.to_string(), "drop(kiwi)");
    }
}
