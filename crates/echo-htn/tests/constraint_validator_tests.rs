// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
use echo_dry_tests::{holds, prim};
use echo_htn::{Constraint, ConstraintKind, ConstraintValidator, Rejection, TaskId};
use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

fn validator_with(n: usize) -> (ConstraintValidator, Vec<TaskId>) {
    let mut v = ConstraintValidator::new();
    let ids: Vec<TaskId> = (0..n).map(|i| prim(&format!("t{i}"), &[]).id()).collect();
    for id in &ids {
        v.add_task(*id);
    }
    (v, ids)
}

fn edge(from: TaskId, to: TaskId) -> Constraint {
    Constraint::precedence([from], [to])
}

fn assert_cycle_rejected(v: &mut ConstraintValidator, closing: Constraint) {
    let before: Vec<Constraint> = v.constraints().cloned().collect();
    assert!(!v.validate(&closing));
    let err = v.add_constraint(closing).unwrap_err();
    assert_eq!(err.kind, ConstraintKind::Precedence);
    assert!(matches!(err.reason, Rejection::Cycle { .. }));
    let after: Vec<Constraint> = v.constraints().cloned().collect();
    assert_eq!(before, after, "failed add must not change accepted set");
}

#[test]
fn dangling_references_are_rejected_without_state_change() {
    let (mut v, ids) = validator_with(1);
    let stranger = prim("stranger", &[]).id();
    let candidates = [
        edge(ids[0], stranger),
        Constraint::before([stranger], holds("ready", &[])),
        Constraint::after([stranger], holds("ready", &[])),
        Constraint::between([ids[0]], [stranger], holds("ready", &[])),
    ];
    for c in candidates {
        assert!(!v.validate(&c));
        let err = v.add_constraint(c).unwrap_err();
        assert_eq!(err.reason, Rejection::UnknownTask(stranger));
    }
    assert_eq!(v.constraint_count(), 0);
}

#[test]
fn cycle_of_length_one_is_rejected() {
    let (mut v, ids) = validator_with(1);
    assert_cycle_rejected(&mut v, edge(ids[0], ids[0]));
    // The same task on both sides of a wider constraint is still a self loop.
    let (mut v, ids) = validator_with(2);
    assert_cycle_rejected(&mut v, Constraint::precedence([ids[0], ids[1]], [ids[1]]));
}

#[test]
fn cycle_of_length_two_is_rejected() {
    let (mut v, ids) = validator_with(2);
    v.add_constraint(edge(ids[0], ids[1])).unwrap();
    assert_cycle_rejected(&mut v, edge(ids[1], ids[0]));
}

#[test]
fn cycle_of_length_three_is_rejected() {
    let (mut v, ids) = validator_with(3);
    v.add_constraint(edge(ids[0], ids[1])).unwrap();
    v.add_constraint(edge(ids[1], ids[2])).unwrap();
    assert_cycle_rejected(&mut v, edge(ids[2], ids[0]));
}

#[test]
fn three_cycle_is_found_among_unrelated_edges() {
    let (mut v, ids) = validator_with(7);
    v.add_constraint(edge(ids[3], ids[4])).unwrap();
    v.add_constraint(edge(ids[0], ids[1])).unwrap();
    v.add_constraint(edge(ids[5], ids[6])).unwrap();
    v.add_constraint(edge(ids[1], ids[2])).unwrap();
    v.add_constraint(edge(ids[4], ids[6])).unwrap();
    v.add_constraint(edge(ids[0], ids[5])).unwrap();
    assert_cycle_rejected(&mut v, edge(ids[2], ids[0]));
    // A parallel, non-closing edge is still fine.
    v.add_constraint(edge(ids[2], ids[6])).unwrap();
}

#[test]
fn duplicate_constraint_is_rejected() {
    let (mut v, ids) = validator_with(2);
    let before = Constraint::before([ids[0], ids[1]], holds("ready", &[]));
    v.add_constraint(before.clone()).unwrap();
    let err = v.add_constraint(before).unwrap_err();
    assert_eq!(err.kind, ConstraintKind::Before);
    assert_eq!(err.reason, Rejection::Duplicate);
    v.add_constraint(edge(ids[0], ids[1])).unwrap();
    let err = v.add_constraint(edge(ids[0], ids[1])).unwrap_err();
    assert_eq!(err.reason, Rejection::Duplicate);
    assert_eq!(v.constraint_count(), 2);
}

#[test]
fn conditions_never_form_cycles() {
    let (mut v, ids) = validator_with(2);
    v.add_constraint(edge(ids[0], ids[1])).unwrap();
    v.add_constraint(Constraint::between([ids[1]], [ids[0]], holds("ready", &[])))
        .unwrap();
    assert_eq!(v.constraint_count(), 2);
}

#[test]
fn proptest_seed_pinned_acyclic_chains_accept_then_reject_back_edge() {
    // Pinned seed keeps generated graphs identical across machines.
    const SEED_BYTES: [u8; 32] = [
        0x17, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0,
    ];
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(PropConfig::default(), rng);

    // Forward edges (i < j) over up to 8 tasks, plus the length of a path to close.
    let strategy = (3usize..8).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n), 0..16),
            2usize..=n,
        )
    });

    runner
        .run(&strategy, |(n, raw_edges, path_len)| {
            let (mut v, ids) = validator_with(n);
            for (a, b) in raw_edges {
                let (lo, hi) = (a.min(b), a.max(b));
                if lo == hi {
                    continue;
                }
                match v.add_constraint(edge(ids[lo], ids[hi])) {
                    Ok(()) => {}
                    Err(err) => {
                        prop_assert_eq!(err.reason, Rejection::Duplicate);
                    }
                }
            }
            for pair in ids[..path_len].windows(2) {
                let c = edge(pair[0], pair[1]);
                if !v.contains_constraint(&c) {
                    prop_assert!(v.add_constraint(c).is_ok());
                }
            }
            prop_assert!(v.reachable(ids[0], ids[path_len - 1]));

            let count = v.constraint_count();
            let err = v
                .add_constraint(edge(ids[path_len - 1], ids[0]))
                .unwrap_err();
            prop_assert!(
                matches!(err.reason, Rejection::Cycle { .. }),
                "unexpected rejection"
            );
            prop_assert_eq!(v.constraint_count(), count);
            Ok(())
        })
        .unwrap();
}
