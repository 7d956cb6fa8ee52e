// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Construction helpers for terms and atoms, plus bulk substitution.
use std::sync::atomic::{AtomicU32, Ordering};

use crate::sentence::Atom;
use crate::substitution::Substitution;
use crate::term::{Constant, Term, Variable};

static NEXT_SCOPE: AtomicU32 = AtomicU32::new(1);

/// Creates a root-scope variable named `name` (without the `?` sigil).
pub fn make_variable(name: &str) -> Variable {
    Variable::new(name.trim_start_matches('?'))
}

/// Creates a constant.
pub fn make_constant(name: &str) -> Constant {
    Constant::new(name)
}

/// Parses a bare symbol into a term: `?x` is a variable, anything else a constant.
pub fn make_term(symbol: &str) -> Term {
    if symbol.starts_with('?') {
        Term::Variable(make_variable(symbol))
    } else {
        Term::Constant(make_constant(symbol))
    }
}

/// Creates an atom from a predicate and its arguments.
pub fn make_atom(predicate: &str, args: impl IntoIterator<Item = Term>) -> Atom {
    Atom::new(predicate, args.into_iter().collect())
}

/// Applies `substitution` to every term, returning new terms.
pub fn apply_terms(terms: &[Term], substitution: &Substitution) -> Vec<Term> {
    terms.iter().map(|t| t.apply(substitution)).collect()
}

/// Returns a process-unique, non-zero variable scope.
///
/// Scope `0` is reserved for user-authored variables. The counter wraps at
/// `u32::MAX` and then skips zero.
pub fn fresh_scope() -> u32 {
    loop {
        let scope = NEXT_SCOPE.fetch_add(1, Ordering::Relaxed);
        if scope != 0 {
            return scope;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_term_distinguishes_sigil() {
        assert_eq!(make_term("?x"), Term::Variable(Variable::new("x")));
        assert_eq!(make_term("kiwi"), Term::Constant(Constant::new("kiwi")));
    }

    #[test]
    fn fresh_scopes_are_unique_and_non_zero() {
        let a = fresh_scope();
        let b = fresh_scope();
        assert_ne!(a, 0);
        assert_ne!(a, b);
    }
}
