// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Atoms, conditions and effects.
use std::collections::BTreeSet;

use core::fmt;

use crate::substitution::Substitution;
use crate::term::{Term, Variable};

/// A predicate applied to an ordered list of terms, e.g. `have(kiwi)`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atom {
    predicate: String,
    args: Vec<Term>,
}

impl Atom {
    /// Creates an atom.
    pub fn new(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// Predicate symbol.
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Arguments in order.
    pub fn args(&self) -> &[Term] {
        &self.args
    }

    /// Returns `true` if every argument is a constant.
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    /// Returns a copy with `substitution` applied to every argument.
    #[must_use]
    pub fn apply(&self, substitution: &Substitution) -> Self {
        Self {
            predicate: self.predicate.clone(),
            args: crate::apply_terms(&self.args, substitution),
        }
    }

    fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        out.extend(self.args.iter().filter_map(Term::as_variable).cloned());
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, &self.predicate, &self.args)
    }
}

/// Writes `name(a, b, ...)`.
pub(crate) fn write_call(f: &mut fmt::Formatter<'_>, name: &str, args: &[Term]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}

/// A logical condition over a [`crate::State`].
///
/// Evaluation is closed-world: an atom absent from the state is false.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    /// A single atom.
    Atom(Atom),
    /// Negation.
    Not(Box<Condition>),
    /// Conjunction; the empty conjunction is true.
    And(Vec<Condition>),
    /// Disjunction; the empty disjunction is false.
    Or(Vec<Condition>),
}

impl Condition {
    /// The trivially true condition (empty conjunction).
    pub fn truth() -> Self {
        Condition::And(Vec::new())
    }

    /// Wraps `condition` in a negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    /// Returns `true` for an empty conjunction.
    pub fn is_truth(&self) -> bool {
        matches!(self, Condition::And(parts) if parts.is_empty())
    }

    /// Returns a copy with `substitution` applied to every atom.
    #[must_use]
    pub fn apply(&self, substitution: &Substitution) -> Self {
        match self {
            Condition::Atom(a) => Condition::Atom(a.apply(substitution)),
            Condition::Not(inner) => Condition::Not(Box::new(inner.apply(substitution))),
            Condition::And(parts) => {
                Condition::And(parts.iter().map(|c| c.apply(substitution)).collect())
            }
            Condition::Or(parts) => {
                Condition::Or(parts.iter().map(|c| c.apply(substitution)).collect())
            }
        }
    }

    /// Returns `true` if every atom in the condition is ground.
    pub fn is_ground(&self) -> bool {
        match self {
            Condition::Atom(a) => a.is_ground(),
            Condition::Not(inner) => inner.is_ground(),
            Condition::And(parts) | Condition::Or(parts) => parts.iter().all(Self::is_ground),
        }
    }

    /// Collects every variable mentioned by the condition.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        match self {
            Condition::Atom(a) => a.collect_variables(out),
            Condition::Not(inner) => inner.collect_variables(out),
            Condition::And(parts) | Condition::Or(parts) => {
                for part in parts {
                    part.collect_variables(out);
                }
            }
        }
    }
}

impl From<Atom> for Condition {
    fn from(a: Atom) -> Self {
        Condition::Atom(a)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Atom(a) => a.fmt(f),
            Condition::Not(inner) => write!(f, "not({inner})"),
            Condition::And(parts) => write_junction(f, "and", parts),
            Condition::Or(parts) => write_junction(f, "or", parts),
        }
    }
}

fn write_junction(f: &mut fmt::Formatter<'_>, op: &str, parts: &[Condition]) -> fmt::Result {
    write!(f, "{op}(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{part}")?;
    }
    f.write_str(")")
}

/// An operator effect: add or delete one atom.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effect {
    /// The atom becomes true.
    Add(Atom),
    /// The atom becomes false.
    Delete(Atom),
}

impl Effect {
    /// The affected atom.
    pub fn atom(&self) -> &Atom {
        match self {
            Effect::Add(a) | Effect::Delete(a) => a,
        }
    }

    /// Returns a copy with `substitution` applied.
    #[must_use]
    pub fn apply(&self, substitution: &Substitution) -> Self {
        match self {
            Effect::Add(a) => Effect::Add(a.apply(substitution)),
            Effect::Delete(a) => Effect::Delete(a.apply(substitution)),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Add(a) => a.fmt(f),
            Effect::Delete(a) => write!(f, "not({a})"),
        }
    }
}
