// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Echo's HTN planner.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`builders`] - Terse term, atom, task and state constructors
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`domains`] - Sample domains (juggling swap, logistics, spin) and problems

pub mod builders;
pub mod config;
pub mod domains;

// Re-export commonly used items at crate root for convenience
pub use builders::{atom, chain, compound, holds, lacks, prim, state};
pub use config::InMemoryConfigStore;
pub use domains::{
    logistics_config, logistics_domain, logistics_problem, spin_domain, spin_problem,
    swap_domain, swap_problem, SWAP_DIRECT, SWAP_SYMMETRIC,
};
