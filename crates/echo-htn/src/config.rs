// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Planner configuration and its storage port.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Key under which [`PlannerConfig`] is stored.
pub const PLANNER_CONFIG_KEY: &str = "planner";

/// How the world state evolves while a linearized plan is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateProgression {
    /// Every precondition is checked against the problem's initial state.
    #[default]
    Initial,
    /// Each action's effects are applied before the next action is checked.
    Apply,
}

/// Search limits and plan-checking policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum decomposition depth of one branch; `None` is unbounded.
    pub max_depth: Option<usize>,
    /// Maximum number of search nodes before the search gives up.
    pub node_budget: Option<u64>,
    /// State used for precondition checks.
    pub state_progression: StateProgression,
    /// Check Before/After/Between conditions on the linearized plan.
    pub check_constraint_conditions: bool,
    /// Skip networks that provably have no solution.
    pub prune_dead_ends: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            node_budget: None,
            state_progression: StateProgression::Initial,
            check_constraint_conditions: true,
            prune_dead_ends: true,
        }
    }
}

/// Where serialized planner settings live.
///
/// Implementations only move bytes; [`ConfigService`] owns the JSON encoding.
pub trait ConfigStore {
    /// Reads the blob stored under `key`, or [`ConfigError::NotFound`].
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Writes `data` under `key`, replacing any previous blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failure to read or write a stored setting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing is stored under the key.
    #[error("no document stored under the key")]
    NotFound,
    /// The stored document is not valid JSON for the requested type.
    #[error("malformed config document: {0}")]
    Json(#[from] serde_json::Error),
    /// The backing store failed.
    #[error("config store failed: {0}")]
    Store(String),
}

/// Serializes config values as JSON and delegates storage to a [`ConfigStore`].
#[derive(Debug)]
pub struct ConfigService<S> {
    store: S,
}

impl<S: ConfigStore> ConfigService<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Decodes the document under `key`. A missing key and an empty blob
    /// both read as `Ok(None)`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let bytes = match self.store.load_raw(key) {
            Err(ConfigError::NotFound) => return Ok(None),
            other => other?,
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Stores `value` under `key` as pretty-printed JSON.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let document = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &document)
    }

    /// Loads the planner configuration, falling back to defaults when absent.
    ///
    /// Fields missing from a stored document take their default values.
    pub fn load_planner_config(&self) -> Result<PlannerConfig, ConfigError> {
        Ok(self.load(PLANNER_CONFIG_KEY)?.unwrap_or_default())
    }

    /// Persists the planner configuration.
    pub fn save_planner_config(&self, config: &PlannerConfig) -> Result<(), ConfigError> {
        self.save(PLANNER_CONFIG_KEY, config)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn partial_documents_take_defaults() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"max_depth": 4, "state_progression": "apply"}"#).unwrap();
        assert_eq!(config.max_depth, Some(4));
        assert_eq!(config.state_progression, StateProgression::Apply);
        assert!(config.check_constraint_conditions);
        assert!(config.prune_dead_ends);
        assert_eq!(config.node_budget, None);
    }
}
