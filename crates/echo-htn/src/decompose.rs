// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Task-network rewriting by method application.
use echo_logic::Substitution;
use tracing::debug;

use crate::domain::Method;
use crate::error::DecompositionError;
use crate::network::{TaskNetwork, TaskNetworkBuilder};
use crate::task::Task;

/// Replaces one task of a network with a method's bound subtask network.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecompositionEngine;

impl DecompositionEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }

    /// Decomposes `task` in `network` using `method` under `substitution`.
    ///
    /// The substitution is applied to the method's template and to `network`;
    /// `task` is removed; the bound subtasks are added as new occurrences;
    /// every constraint that referenced `task` is fanned out to the whole
    /// bound subtask set; the template's own constraints are added.
    ///
    /// The input network is not modified. A method with no subtasks removes
    /// `task` and drops the constraints that only it satisfied.
    ///
    /// # Errors
    /// [`DecompositionError::UnknownTask`] if `task` is not a member of
    /// `network`; [`DecompositionError::InvalidConstraint`] if the rewritten
    /// constraints are not admissible.
    pub fn decompose(
        &self,
        substitution: &Substitution,
        network: &TaskNetwork,
        task: &Task,
        method: &Method,
    ) -> Result<TaskNetwork, DecompositionError> {
        if !network.contains(task.id()) {
            return Err(DecompositionError::UnknownTask(task.id()));
        }
        let subtasks = method.network().apply(substitution).reissued();
        let mut builder = TaskNetworkBuilder::copy(network);
        builder.apply(substitution);
        builder.replace(task.id(), &subtasks)?;
        let decomposed = builder.build();
        debug!(
            task = %task,
            method = method.name(),
            subtasks = subtasks.len(),
            remaining = decomposed.len(),
            "decomposed"
        );
        Ok(decomposed)
    }
}
