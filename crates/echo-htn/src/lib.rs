// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! echo-htn: hierarchical task network planning.
//!
//! A [`Problem`] names an initial [`echo_logic::State`] and a [`TaskNetwork`]
//! of tasks to accomplish. The [`Planner`] decomposes non-primitive tasks with
//! the [`Domain`]'s methods until only primitive tasks remain, orders them,
//! grounds them into actions, and checks preconditions and constraint
//! conditions. Failed alternatives are backtracked.
//!
//! Task networks are values. Every constraint passes a [`ConstraintValidator`]
//! before it is stored, so no network ever holds a dangling reference or a
//! precedence cycle, and every rewrite returns a new network.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]

mod action;
mod config;
mod constraint;
mod decompose;
mod domain;
mod error;
mod helper;
mod ident;
mod network;
mod planner;
mod sort;
mod task;
mod unify;
mod validator;

// Re-exports for stable public API
/// Actions, plans and the factory grounding primitive tasks.
pub use action::{Action, ActionFactory, Plan};
/// Planner configuration and its JSON-backed storage port.
pub use config::{
    ConfigError, ConfigService, ConfigStore, PlannerConfig, StateProgression, PLANNER_CONFIG_KEY,
};
/// Task-network constraints.
pub use constraint::{Constraint, ConstraintKind};
/// Method application.
pub use decompose::DecompositionEngine;
/// Domain containers and lookups.
pub use domain::{Domain, DomainBuilder, DomainHelper, Method, Operator, Problem};
/// Failure kinds.
pub use error::{
    DecompositionError, InvalidConstraint, NonPrimitiveTaskNotFound, NotActionableReason,
    PlanNotFound, Rejection, SearchFailure, TaskNotActionable, UnifierNotFound, UnifyFailure,
};
/// Per-search helper.
pub use helper::PlannerHelper;
/// Task occurrence identity.
pub use ident::TaskId;
/// Task networks.
pub use network::{TaskNetwork, TaskNetworkBuilder};
/// The search driver.
pub use planner::{Planner, SearchStats};
/// Linearization.
pub use sort::{SortService, TopologicalSort};
/// Tasks.
pub use task::{Task, TaskBuilder};
/// Task-to-method unification.
pub use unify::UnificationService;
/// Constraint bookkeeping and cycle detection.
pub use validator::ConstraintValidator;
