// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! echo-logic: the first-order vocabulary used by Echo's HTN planner.
//!
//! Terms are flat (variables and constants only). Conditions are evaluated
//! closed-world against a [`State`]. Every transformation is copy-and-rewrite:
//! applying a [`Substitution`] never mutates its input.
#![forbid(unsafe_code)]

mod factory;
mod sentence;
mod state;
mod substitution;
mod term;

/// Term/atom constructors and bulk substitution (the logic factory surface).
pub use factory::{apply_terms, fresh_scope, make_atom, make_constant, make_term, make_variable};
/// Atoms, conditions and effects.
pub use sentence::{Atom, Condition, Effect};
/// Closed-world fact base with `ask`/`tell`.
pub use state::State;
/// Variable bindings.
pub use substitution::{BindingConflict, Substitution};
/// Variables, constants and terms.
pub use term::{Constant, Term, Variable};
