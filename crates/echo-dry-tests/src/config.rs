// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake for planner configuration tests.

use echo_htn::{ConfigError, ConfigStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory implementation of [`ConfigStore`] for testing.
///
/// Clones share the same backing map, so a test can hand one clone to a
/// [`echo_htn::ConfigService`] and inspect the other.
///
/// # Example
///
/// ```
/// use echo_dry_tests::InMemoryConfigStore;
/// use echo_htn::{ConfigService, PlannerConfig};
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
///
/// let config = PlannerConfig { max_depth: Some(8), ..PlannerConfig::default() };
/// service.save_planner_config(&config).unwrap();
/// assert_eq!(store.save_count(), 1);
/// assert_eq!(service.load_planner_config().unwrap(), config);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    data: HashMap<String, Vec<u8>>,
    load_count: usize,
    save_count: usize,
    fail_on_load: bool,
}

impl InMemoryConfigStore {
    /// Create a new empty in-memory config store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one raw document under `key`.
    pub fn with_document(key: &str, json: &str) -> Self {
        let store = Self::new();
        store.lock().data.insert(key.to_owned(), json.as_bytes().to_vec());
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every subsequent `load_raw` fail (or succeed again).
    pub fn set_fail_on_load(&self, fail: bool) {
        self.lock().fail_on_load = fail;
    }

    /// Number of `load_raw` attempts, failed ones included.
    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    /// Number of `save_raw` calls.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    /// Raw bytes stored under `key`, if any.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().data.get(key).cloned()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut inner = self.lock();
        inner.load_count += 1;

        if inner.fail_on_load {
            return Err(ConfigError::Store("simulated load failure".into()));
        }

        inner.data.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.save_count += 1;
        inner.data.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}
