// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Task-network constraints.
use std::collections::{BTreeMap, BTreeSet};

use core::fmt;

use echo_logic::{Condition, Substitution};

use crate::ident::TaskId;

/// Discriminant of a [`Constraint`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstraintKind {
    /// [`Constraint::Precedence`].
    Precedence,
    /// [`Constraint::Before`].
    Before,
    /// [`Constraint::After`].
    After,
    /// [`Constraint::Between`].
    Between,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintKind::Precedence => "precedence",
            ConstraintKind::Before => "before",
            ConstraintKind::After => "after",
            ConstraintKind::Between => "between",
        })
    }
}

/// A constraint over task occurrences of one network.
///
/// Every [`TaskId`] a constraint holds must be a member of the enclosing
/// network at acceptance time; [`crate::ConstraintValidator`] enforces this.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Constraint {
    /// Every task in `preceding` comes before every task in `proceeding`.
    Precedence {
        /// Tasks ordered first.
        preceding: BTreeSet<TaskId>,
        /// Tasks ordered after all of `preceding`.
        proceeding: BTreeSet<TaskId>,
    },
    /// `condition` holds immediately before the first of `tasks`.
    Before {
        /// Constrained tasks.
        tasks: BTreeSet<TaskId>,
        /// Required condition.
        condition: Condition,
    },
    /// `condition` holds immediately after the last of `tasks`.
    After {
        /// Constrained tasks.
        tasks: BTreeSet<TaskId>,
        /// Required condition.
        condition: Condition,
    },
    /// `condition` holds from the end of `preceding` to the start of `proceeding`.
    Between {
        /// Tasks opening the interval.
        preceding: BTreeSet<TaskId>,
        /// Tasks closing the interval.
        proceeding: BTreeSet<TaskId>,
        /// Condition maintained over the interval.
        condition: Condition,
    },
}

impl Constraint {
    /// Builds a precedence constraint.
    pub fn precedence(
        preceding: impl IntoIterator<Item = TaskId>,
        proceeding: impl IntoIterator<Item = TaskId>,
    ) -> Self {
        Constraint::Precedence {
            preceding: preceding.into_iter().collect(),
            proceeding: proceeding.into_iter().collect(),
        }
    }

    /// Builds a before constraint.
    pub fn before(tasks: impl IntoIterator<Item = TaskId>, condition: Condition) -> Self {
        Constraint::Before {
            tasks: tasks.into_iter().collect(),
            condition,
        }
    }

    /// Builds an after constraint.
    pub fn after(tasks: impl IntoIterator<Item = TaskId>, condition: Condition) -> Self {
        Constraint::After {
            tasks: tasks.into_iter().collect(),
            condition,
        }
    }

    /// Builds a between constraint.
    pub fn between(
        preceding: impl IntoIterator<Item = TaskId>,
        proceeding: impl IntoIterator<Item = TaskId>,
        condition: Condition,
    ) -> Self {
        Constraint::Between {
            preceding: preceding.into_iter().collect(),
            proceeding: proceeding.into_iter().collect(),
            condition,
        }
    }

    /// Returns the constraint's kind.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Precedence { .. } => ConstraintKind::Precedence,
            Constraint::Before { .. } => ConstraintKind::Before,
            Constraint::After { .. } => ConstraintKind::After,
            Constraint::Between { .. } => ConstraintKind::Between,
        }
    }

    /// The condition carried by Before/After/Between, `None` for Precedence.
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Constraint::Precedence { .. } => None,
            Constraint::Before { condition, .. }
            | Constraint::After { condition, .. }
            | Constraint::Between { condition, .. } => Some(condition),
        }
    }

    fn sides(&self) -> (&BTreeSet<TaskId>, Option<&BTreeSet<TaskId>>) {
        match self {
            Constraint::Precedence {
                preceding,
                proceeding,
            }
            | Constraint::Between {
                preceding,
                proceeding,
                ..
            } => (preceding, Some(proceeding)),
            Constraint::Before { tasks, .. } | Constraint::After { tasks, .. } => (tasks, None),
        }
    }

    /// Every task referenced, in order, possibly with repeats across sides.
    pub fn references(&self) -> impl Iterator<Item = TaskId> + '_ {
        let (first, second) = self.sides();
        first.iter().chain(second.into_iter().flatten()).copied()
    }

    /// Returns `true` if `task` is referenced on any side.
    pub fn mentions(&self, task: TaskId) -> bool {
        let (first, second) = self.sides();
        first.contains(&task) || second.is_some_and(|s| s.contains(&task))
    }

    /// Ordering edges `(p, q)` spanned by a precedence constraint; empty for
    /// every other kind.
    pub fn edges(&self) -> Vec<(TaskId, TaskId)> {
        match self {
            Constraint::Precedence {
                preceding,
                proceeding,
            } => preceding
                .iter()
                .flat_map(|p| proceeding.iter().map(move |q| (*p, *q)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns a copy with `substitution` applied to the carried condition.
    #[must_use]
    pub fn apply(&self, substitution: &Substitution) -> Self {
        match self {
            Constraint::Precedence { .. } => self.clone(),
            Constraint::Before { tasks, condition } => Constraint::Before {
                tasks: tasks.clone(),
                condition: condition.apply(substitution),
            },
            Constraint::After { tasks, condition } => Constraint::After {
                tasks: tasks.clone(),
                condition: condition.apply(substitution),
            },
            Constraint::Between {
                preceding,
                proceeding,
                condition,
            } => Constraint::Between {
                preceding: preceding.clone(),
                proceeding: proceeding.clone(),
                condition: condition.apply(substitution),
            },
        }
    }

    /// Rewrites every reference to `old` into references to all of
    /// `replacement` (fan-out).
    ///
    /// Returns `None` when a side ends up empty: the constraint no longer
    /// constrains anything and is dropped.
    pub fn replace_task(&self, old: TaskId, replacement: &BTreeSet<TaskId>) -> Option<Self> {
        let rewrite = |side: &BTreeSet<TaskId>| -> Option<BTreeSet<TaskId>> {
            let mut out = side.clone();
            if out.remove(&old) {
                out.extend(replacement.iter().copied());
            }
            (!out.is_empty()).then_some(out)
        };
        Some(match self {
            Constraint::Precedence {
                preceding,
                proceeding,
            } => Constraint::Precedence {
                preceding: rewrite(preceding)?,
                proceeding: rewrite(proceeding)?,
            },
            Constraint::Before { tasks, condition } => Constraint::Before {
                tasks: rewrite(tasks)?,
                condition: condition.clone(),
            },
            Constraint::After { tasks, condition } => Constraint::After {
                tasks: rewrite(tasks)?,
                condition: condition.clone(),
            },
            Constraint::Between {
                preceding,
                proceeding,
                condition,
            } => Constraint::Between {
                preceding: rewrite(preceding)?,
                proceeding: rewrite(proceeding)?,
                condition: condition.clone(),
            },
        })
    }

    /// Renames references through `map`; ids missing from the map are kept.
    pub(crate) fn remap(&self, map: &BTreeMap<TaskId, TaskId>) -> Self {
        let rename = |side: &BTreeSet<TaskId>| -> BTreeSet<TaskId> {
            side.iter().map(|id| *map.get(id).unwrap_or(id)).collect()
        };
        match self {
            Constraint::Precedence {
                preceding,
                proceeding,
            } => Constraint::Precedence {
                preceding: rename(preceding),
                proceeding: rename(proceeding),
            },
            Constraint::Before { tasks, condition } => Constraint::Before {
                tasks: rename(tasks),
                condition: condition.clone(),
            },
            Constraint::After { tasks, condition } => Constraint::After {
                tasks: rename(tasks),
                condition: condition.clone(),
            },
            Constraint::Between {
                preceding,
                proceeding,
                condition,
            } => Constraint::Between {
                preceding: rename(preceding),
                proceeding: rename(proceeding),
                condition: condition.clone(),
            },
        }
    }
}

fn write_ids(f: &mut fmt::Formatter<'_>, ids: &BTreeSet<TaskId>) -> fmt::Result {
    f.write_str("{")?;
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{id}")?;
    }
    f.write_str("}")
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Precedence {
                preceding,
                proceeding,
            } => {
                write_ids(f, preceding)?;
                f.write_str(" < ")?;
                write_ids(f, proceeding)
            }
            Constraint::Before { tasks, condition } => {
                write!(f, "before ")?;
                write_ids(f, tasks)?;
                write!(f, ": {condition}")
            }
            Constraint::After { tasks, condition } => {
                write!(f, "after ")?;
                write_ids(f, tasks)?;
                write!(f, ": {condition}")
            }
            Constraint::Between {
                preceding,
                proceeding,
                condition,
            } => {
                write!(f, "between ")?;
                write_ids(f, preceding)?;
                f.write_str(" and ")?;
                write_ids(f, proceeding)?;
                write!(f, ": {condition}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn ids(raw: &[u64]) -> BTreeSet<TaskId> {
        raw.iter().copied().map(TaskId::from_raw).collect()
    }

    #[test]
    fn precedence_spans_cartesian_edges() {
        let c = Constraint::precedence(ids(&[1, 2]), ids(&[3]));
        assert_eq!(c.edges().len(), 2);
        assert!(c.mentions(TaskId::from_raw(3)));
        assert!(!c.mentions(TaskId::from_raw(4)));
        assert_eq!(c.references().count(), 3);
    }

    #[test]
    fn replace_task_fans_out() {
        let c = Constraint::precedence(ids(&[1]), ids(&[2]));
        let out = c.replace_task(TaskId::from_raw(2), &ids(&[5, 6])).unwrap();
        assert_eq!(out, Constraint::precedence(ids(&[1]), ids(&[5, 6])));
    }

    #[test]
    fn replace_task_with_nothing_drops_the_constraint() {
        let c = Constraint::before(ids(&[2]), Condition::truth());
        assert!(c.replace_task(TaskId::from_raw(2), &BTreeSet::new()).is_none());
        // Untouched sides survive.
        let c = Constraint::before(ids(&[1, 2]), Condition::truth());
        let out = c.replace_task(TaskId::from_raw(2), &BTreeSet::new()).unwrap();
        assert_eq!(out, Constraint::before(ids(&[1]), Condition::truth()));
    }

    #[test]
    fn non_precedence_kinds_have_no_edges() {
        let c = Constraint::between(ids(&[1]), ids(&[2]), Condition::truth());
        assert!(c.edges().is_empty());
        assert_eq!(c.kind(), ConstraintKind::Between);
        assert!(c.condition().is_some());
    }
}
