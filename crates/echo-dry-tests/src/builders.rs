// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Terse constructors for terms, atoms and tasks.
//!
//! Arguments written `?x` become variables; everything else is a constant.

use echo_htn::{Constraint, InvalidConstraint, Task, TaskId, TaskNetworkBuilder};
use echo_logic::{make_atom, make_term, Atom, Condition, State};

/// `pred(args...)` as an atom.
pub fn atom(predicate: &str, args: &[&str]) -> Atom {
    make_atom(predicate, args.iter().map(|a| make_term(a)))
}

/// `pred(args...)` as a condition.
pub fn holds(predicate: &str, args: &[&str]) -> Condition {
    atom(predicate, args).into()
}

/// `not(pred(args...))`.
pub fn lacks(predicate: &str, args: &[&str]) -> Condition {
    Condition::not(holds(predicate, args))
}

/// A primitive task.
pub fn prim(name: &str, args: &[&str]) -> Task {
    Task::builder(name)
        .args(args.iter().map(|a| make_term(a)))
        .primitive(true)
        .build()
}

/// A non-primitive task.
pub fn compound(name: &str, args: &[&str]) -> Task {
    Task::builder(name)
        .args(args.iter().map(|a| make_term(a)))
        .build()
}

/// A state holding the given ground atoms.
pub fn state(facts: impl IntoIterator<Item = Atom>) -> State {
    facts.into_iter().collect()
}

/// Orders `ids` one after another with pairwise precedence constraints.
///
/// # Errors
/// Propagates the first rejected constraint.
pub fn chain(builder: &mut TaskNetworkBuilder, ids: &[TaskId]) -> Result<(), InvalidConstraint> {
    for pair in ids.windows(2) {
        builder.add_constraint(Constraint::precedence([pair[0]], [pair[1]]))?;
    }
    Ok(())
}
