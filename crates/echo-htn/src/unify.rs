// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Unification of concrete tasks against method patterns.
use echo_logic::{Substitution, Term};

use crate::domain::Method;
use crate::error::{UnifierNotFound, UnifyFailure};
use crate::task::Task;

/// Computes most general unifiers between tasks and method patterns.
///
/// Terms are flat, so unification is a pairwise walk over the arguments:
/// equal terms agree, a variable on either side is bound to the other side,
/// and two distinct constants clash. Pattern-side variables are bound first,
/// so a pattern variable facing a task variable maps onto the task variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnificationService;

impl UnificationService {
    /// Creates the service.
    pub fn new() -> Self {
        Self
    }

    /// Finds the substitution that makes `method`'s pattern structurally
    /// identical to `task`.
    ///
    /// The returned substitution is resolved: every binding maps directly to
    /// its final term.
    ///
    /// # Errors
    /// Returns [`UnifierNotFound`] on a name or arity mismatch, or when some
    /// variable would need two different constants.
    pub fn find_unifier(
        &self,
        task: &Task,
        method: &Method,
    ) -> Result<Substitution, UnifierNotFound> {
        let pattern = method.task();
        let fail = |reason| UnifierNotFound {
            task: task.to_string(),
            method: method.name().to_owned(),
            reason,
        };
        if pattern.name() != task.name() {
            return Err(fail(UnifyFailure::NameMismatch));
        }
        if pattern.arity() != task.arity() {
            return Err(fail(UnifyFailure::ArityMismatch {
                expected: pattern.arity(),
                found: task.arity(),
            }));
        }
        let mut substitution = Substitution::new();
        for (left, right) in pattern.args().iter().zip(task.args()) {
            unify_terms(left, right, &mut substitution).map_err(fail)?;
        }
        Ok(substitution.resolved())
    }
}

fn unify_terms(
    left: &Term,
    right: &Term,
    substitution: &mut Substitution,
) -> Result<(), UnifyFailure> {
    let left = substitution.walk(left);
    let right = substitution.walk(right);
    if left == right {
        return Ok(());
    }
    let clash = |left: &Term, right: &Term| UnifyFailure::Clash {
        left: left.to_string(),
        right: right.to_string(),
    };
    match (&left, &right) {
        (Term::Variable(v), other) | (other, Term::Variable(v)) => substitution
            .bind(v.clone(), other.clone())
            .map_err(|_| clash(&left, &right)),
        (Term::Constant(_), Term::Constant(_)) => Err(clash(&left, &right)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::network::TaskNetwork;
    use echo_logic::make_term;

    fn task(name: &str, args: &[&str]) -> Task {
        Task::builder(name)
            .args(args.iter().map(|a| make_term(a)))
            .build()
    }

    fn method(pattern: &[&str]) -> Method {
        Method::new("m", task("swap", pattern), TaskNetwork::empty())
    }

    #[test]
    fn binds_pattern_variables_to_concrete_terms() {
        let u = UnificationService::new();
        let s = u
            .find_unifier(&task("swap", &["kiwi", "banjo"]), &method(&["?x", "?y"]))
            .unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.walk(&make_term("?x")), make_term("kiwi"));
        assert_eq!(s.walk(&make_term("?y")), make_term("banjo"));
    }

    #[test]
    fn name_and_arity_mismatch() {
        let u = UnificationService::new();
        let err = u
            .find_unifier(&task("drop", &["kiwi"]), &method(&["?x"]))
            .unwrap_err();
        assert_eq!(err.reason, UnifyFailure::NameMismatch);
        let err = u
            .find_unifier(&task("swap", &["kiwi"]), &method(&["?x", "?y"]))
            .unwrap_err();
        assert!(matches!(err.reason, UnifyFailure::ArityMismatch { expected: 2, found: 1 }));
    }

    #[test]
    fn repeated_pattern_variable_must_agree() {
        let u = UnificationService::new();
        assert!(u
            .find_unifier(&task("swap", &["kiwi", "kiwi"]), &method(&["?x", "?x"]))
            .is_ok());
        let err = u
            .find_unifier(&task("swap", &["kiwi", "banjo"]), &method(&["?x", "?x"]))
            .unwrap_err();
        assert!(matches!(err.reason, UnifyFailure::Clash { .. }));
    }

    #[test]
    fn pattern_constant_binds_task_variable() {
        let u = UnificationService::new();
        let s = u
            .find_unifier(&task("swap", &["?a", "banjo"]), &method(&["kiwi", "?y"]))
            .unwrap();
        assert_eq!(s.walk(&make_term("?a")), make_term("kiwi"));
        assert_eq!(s.walk(&make_term("?y")), make_term("banjo"));
    }

    #[test]
    fn chained_variables_resolve() {
        // ?x -> ?a, then ?x meets kiwi so ?a -> kiwi; resolved maps ?x to kiwi.
        let u = UnificationService::new();
        let s = u
            .find_unifier(&task("swap", &["?a", "kiwi"]), &method(&["?x", "?x"]))
            .unwrap();
        assert_eq!(s.get(&echo_logic::make_variable("x")), Some(&make_term("kiwi")));
        assert_eq!(s.get(&echo_logic::make_variable("a")), Some(&make_term("kiwi")));
    }
}
