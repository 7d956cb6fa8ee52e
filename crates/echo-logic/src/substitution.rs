// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Variable substitutions (unifiers).
use std::collections::{BTreeMap, BTreeSet};

use core::fmt;
use thiserror::Error;

use crate::term::{Term, Variable};

/// Error returned by [`Substitution::bind`] when a variable is already bound
/// to a different term.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{variable} is bound to {bound}, cannot rebind to {requested}")]
pub struct BindingConflict {
    /// The variable that was being bound.
    pub variable: Variable,
    /// The term it is already bound to.
    pub bound: Term,
    /// The term the caller tried to bind.
    pub requested: Term,
}

/// Mapping from [`Variable`] to [`Term`].
///
/// Substitutions are never applied in place: every `apply` on a term, atom,
/// condition or task produces a new value. Bindings may chain (`?x -> ?y`,
/// `?y -> kiwi`); [`Substitution::walk`] follows chains to their end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Substitution {
    bindings: BTreeMap<Variable, Term>,
}

impl Substitution {
    /// Creates an empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `variable` to `term`.
    ///
    /// Rebinding to the same term is a no-op. Binding a variable to itself is
    /// ignored.
    ///
    /// # Errors
    /// Returns [`BindingConflict`] if `variable` is already bound to a
    /// different term.
    pub fn bind(&mut self, variable: Variable, term: Term) -> Result<(), BindingConflict> {
        if term.as_variable() == Some(&variable) {
            return Ok(());
        }
        match self.bindings.get(&variable) {
            Some(bound) if *bound == term => Ok(()),
            Some(bound) => Err(BindingConflict {
                variable,
                bound: bound.clone(),
                requested: term,
            }),
            None => {
                self.bindings.insert(variable, term);
                Ok(())
            }
        }
    }

    /// Returns the direct binding of `variable`, if any.
    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.bindings.get(variable)
    }

    /// Returns `true` if `variable` has a binding.
    pub fn contains(&self, variable: &Variable) -> bool {
        self.bindings.contains_key(variable)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` when no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates bindings in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.bindings.iter()
    }

    /// Follows the binding chain starting at `term` and returns its end.
    ///
    /// Constants and unbound variables are returned unchanged. Cyclic chains
    /// (which [`Substitution::bind`] alone cannot prevent) stop at the first
    /// revisited variable.
    pub fn walk(&self, term: &Term) -> Term {
        let mut current = term;
        let mut seen: BTreeSet<&Variable> = BTreeSet::new();
        while let Term::Variable(v) = current {
            if !seen.insert(v) {
                break;
            }
            match self.bindings.get(v) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.clone()
    }

    /// Returns a substitution where every binding is walked to its end, so a
    /// single lookup suffices.
    #[must_use]
    pub fn resolved(&self) -> Self {
        let bindings = self
            .bindings
            .iter()
            .map(|(var, term)| (var.clone(), self.walk(term)))
            .filter(|(var, term)| term.as_variable() != Some(var))
            .collect();
        Self { bindings }
    }
}

impl FromIterator<(Variable, Term)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (Variable, Term)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (var, term)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{var} -> {term}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::term::Constant;

    fn var(n: &str) -> Variable {
        Variable::new(n)
    }

    fn constant(n: &str) -> Term {
        Term::Constant(Constant::new(n))
    }

    #[test]
    fn rebinding_to_a_different_term_conflicts() {
        let mut s = Substitution::new();
        s.bind(var("x"), constant("kiwi")).unwrap();
        s.bind(var("x"), constant("kiwi")).unwrap();
        let err = s.bind(var("x"), constant("banjo")).unwrap_err();
        assert_eq!(err.bound, constant("kiwi"));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn walk_follows_chains() {
        let mut s = Substitution::new();
        s.bind(var("x"), Term::Variable(var("y"))).unwrap();
        s.bind(var("y"), constant("kiwi")).unwrap();
        assert_eq!(s.walk(&Term::Variable(var("x"))), constant("kiwi"));
        let r = s.resolved();
        assert_eq!(r.get(&var("x")), Some(&constant("kiwi")));
    }

    #[test]
    fn walk_terminates_on_cycles() {
        let s: Substitution = [
            (var("x"), Term::Variable(var("y"))),
            (var("y"), Term::Variable(var("x"))),
        ]
        .into_iter()
        .collect();
        let end = s.walk(&Term::Variable(var("x")));
        assert!(end.as_variable().is_some());
    }

    #[test]
    fn self_binding_is_ignored() {
        let mut s = Substitution::new();
        s.bind(var("x"), Term::Variable(var("x"))).unwrap();
        assert!(s.is_empty());
    }
}
