// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Task occurrence identifiers.
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one task occurrence.
///
/// Two tasks with the same name and arguments are still distinct occurrences
/// when their ids differ; constraints and network membership are keyed by
/// `TaskId`, never by task value.
///
/// # Invariants
/// - Ids are issued from a process-wide monotonic counter, so ordering by
///   `TaskId` is creation order.
/// - Zero is never issued.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// Issues a new, never-before-seen id.
    pub(crate) fn fresh() -> Self {
        loop {
            let raw = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
            if raw != 0 {
                return Self(raw);
            }
        }
    }

    /// Constructs a `TaskId` from a raw value.
    ///
    /// Intended for tests and diagnostics; ids built this way may collide with
    /// issued ones.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "t{}", self.0)
    }
}
