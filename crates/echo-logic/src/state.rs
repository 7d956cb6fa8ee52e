// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Closed-world fact base.
use std::collections::BTreeSet;

use core::fmt;

use crate::sentence::{Atom, Condition, Effect};

/// A world state: the set of ground atoms that are currently true.
///
/// Anything not in the set is false. The planner treats a `State` as
/// read-only for the duration of a search; [`State::tell`] exists for callers
/// that build or advance states themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    facts: BTreeSet<Atom>,
}

impl State {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `atom` is a known fact.
    pub fn contains(&self, atom: &Atom) -> bool {
        self.facts.contains(atom)
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns `true` when no fact holds.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterates facts in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.facts.iter()
    }

    /// Evaluates `condition` against this state.
    ///
    /// Non-ground atoms are never satisfied: conditions must be grounded by
    /// the caller before asking.
    pub fn ask(&self, condition: &Condition) -> bool {
        match condition {
            Condition::Atom(a) => a.is_ground() && self.facts.contains(a),
            Condition::Not(inner) => inner.is_ground() && !self.ask(inner),
            Condition::And(parts) => parts.iter().all(|c| self.ask(c)),
            Condition::Or(parts) => parts.iter().any(|c| self.ask(c)),
        }
    }

    /// Applies one effect in place.
    ///
    /// Non-ground effects are ignored.
    pub fn tell(&mut self, effect: &Effect) {
        if !effect.atom().is_ground() {
            return;
        }
        match effect {
            Effect::Add(a) => {
                self.facts.insert(a.clone());
            }
            Effect::Delete(a) => {
                self.facts.remove(a);
            }
        }
    }

    /// Returns a new state with `effects` applied in order.
    #[must_use]
    pub fn apply_effects(&self, effects: &[Effect]) -> Self {
        let mut next = self.clone();
        for effect in effects {
            next.tell(effect);
        }
        next
    }
}

impl FromIterator<Atom> for State {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        Self {
            facts: iter.into_iter().filter(Atom::is_ground).collect(),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, fact) in self.facts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{fact}")?;
        }
        f.write_str("}")
    }
}
