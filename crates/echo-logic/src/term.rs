// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Terms: variables and constants.
use core::fmt;

use crate::substitution::Substitution;

/// A logic variable.
///
/// Variables are identified by `(name, scope)`. User-authored variables live
/// in scope `0`; the planner moves method-local variables into a fresh scope
/// (see [`crate::fresh_scope`]) so two applications of the same method never
/// share bindings.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    name: String,
    scope: u32,
}

impl Variable {
    /// Creates a variable in the root scope.
    pub fn new(name: impl Into<String>) -> Self {
        Self::scoped(name, 0)
    }

    /// Creates a variable in an explicit scope.
    pub fn scoped(name: impl Into<String>, scope: u32) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }

    /// Returns the variable's name without the `?` sigil.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the scope this variable belongs to.
    pub const fn scope(&self) -> u32 {
        self.scope
    }

    /// Returns the same-named variable moved into `scope`.
    #[must_use]
    pub fn rescoped(&self, scope: u32) -> Self {
        Self::scoped(self.name.clone(), scope)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope == 0 {
            write!(f, "?{}", self.name)
        } else {
            write!(f, "?{}#{}", self.name, self.scope)
        }
    }
}

/// A symbolic constant (an object of the planning universe).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constant(String);

impl Constant {
    /// Creates a constant.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the constant's symbol.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A term: either a [`Variable`] or a [`Constant`].
///
/// Terms are flat; there are no function symbols, so unification needs no
/// occurs check.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Term {
    /// A logic variable.
    Variable(Variable),
    /// A ground constant.
    Constant(Constant),
}

impl Term {
    /// Returns `true` when the term contains no variables.
    pub const fn is_ground(&self) -> bool {
        matches!(self, Term::Constant(_))
    }

    /// Returns the variable when this term is one.
    pub const fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            Term::Constant(_) => None,
        }
    }

    /// Returns the constant when this term is one.
    pub const fn as_constant(&self) -> Option<&Constant> {
        match self {
            Term::Constant(c) => Some(c),
            Term::Variable(_) => None,
        }
    }

    /// Returns a copy of this term with `substitution` applied.
    ///
    /// A variable is looked up once; the mapped term is not rewritten again.
    /// Use [`Substitution::walk`] to follow chains of bindings.
    #[must_use]
    pub fn apply(&self, substitution: &Substitution) -> Term {
        match self {
            Term::Variable(v) => substitution.get(v).cloned().unwrap_or_else(|| self.clone()),
            Term::Constant(_) => self.clone(),
        }
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Variable(v)
    }
}

impl From<Constant> for Term {
    fn from(c: Constant) -> Self {
        Term::Constant(c)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => v.fmt(f),
            Term::Constant(c) => c.fmt(f),
        }
    }
}
