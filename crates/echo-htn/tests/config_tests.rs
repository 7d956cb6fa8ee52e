// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
use echo_dry_tests::{logistics_domain, logistics_problem, InMemoryConfigStore};
use echo_htn::{
    ConfigError, ConfigService, Planner, PlannerConfig, StateProgression, PLANNER_CONFIG_KEY,
};

#[test]
fn missing_planner_config_falls_back_to_defaults() {
    let service = ConfigService::new(InMemoryConfigStore::new());
    let config = service.load_planner_config().unwrap();
    assert_eq!(config, PlannerConfig::default());
    assert_eq!(config.state_progression, StateProgression::Initial);
    assert!(config.check_constraint_conditions);
}

#[test]
fn saved_config_is_read_back() {
    let store = InMemoryConfigStore::new();
    let service = ConfigService::new(store.clone());
    let config = PlannerConfig {
        max_depth: Some(12),
        node_budget: Some(10_000),
        state_progression: StateProgression::Apply,
        check_constraint_conditions: false,
        prune_dead_ends: false,
    };
    service.save_planner_config(&config).unwrap();
    assert!(store.raw(PLANNER_CONFIG_KEY).is_some());
    assert_eq!(service.load_planner_config().unwrap(), config);
}

#[test]
fn hand_written_document_drives_the_planner() {
    let store = InMemoryConfigStore::with_document(
        PLANNER_CONFIG_KEY,
        r#"{ "state_progression": "apply", "node_budget": 64 }"#,
    );
    let config = ConfigService::new(store).load_planner_config().unwrap();
    assert_eq!(config.node_budget, Some(64));
    assert_eq!(config.max_depth, None);

    let plan = Planner::with_config(config)
        .find_plan(&logistics_domain(), &logistics_problem("crate", "harbor"))
        .unwrap();
    assert_eq!(plan.len(), 3);
}

#[test]
fn empty_document_reads_as_missing() {
    let store = InMemoryConfigStore::with_document(PLANNER_CONFIG_KEY, "");
    let config = ConfigService::new(store).load_planner_config().unwrap();
    assert_eq!(config, PlannerConfig::default());
}

#[test]
fn malformed_document_is_a_json_error() {
    let store =
        InMemoryConfigStore::with_document(PLANNER_CONFIG_KEY, r#"{ "max_depth": "deep" }"#);
    let err = ConfigService::new(store).load_planner_config().unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn store_failures_propagate() {
    let store = InMemoryConfigStore::new();
    store.set_fail_on_load(true);
    let err = ConfigService::new(store.clone())
        .load_planner_config()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Store(_)));
    assert_eq!(store.load_count(), 1);
}
