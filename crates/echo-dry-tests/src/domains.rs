// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sample planning domains and problems.

use echo_htn::{
    Constraint, Domain, Method, Operator, PlannerConfig, Problem, StateProgression, TaskNetwork,
};
use echo_logic::{make_variable, Condition, Effect, State};

use crate::builders::{atom, chain, compound, holds, lacks, prim, state};

/// Name of the method that drops the first argument and picks up the second.
pub const SWAP_DIRECT: &str = "swap-direct";
/// Name of the method that drops the second argument and picks up the first.
pub const SWAP_SYMMETRIC: &str = "swap-symmetric";

/// Juggling domain: `pickup`/`drop` operators and two `swap(?x, ?y)` methods.
///
/// - `pickup(?a)`: requires `not(have(?a))`, adds `have(?a)`.
/// - `drop(?a)`: requires `have(?a)`, deletes `have(?a)`.
/// - [`SWAP_DIRECT`]: `drop(?x) < pickup(?y)`, before-conditions
///   `have(?x)` on the drop and `not(have(?y))` on the pickup.
/// - [`SWAP_SYMMETRIC`]: the same with `?x` and `?y` exchanged.
pub fn swap_domain() -> Domain {
    let a = make_variable("a");
    Domain::builder("juggling")
        .operator(
            Operator::new("pickup", [a.clone()])
                .with_precondition(lacks("have", &["?a"]))
                .with_effect(Effect::Add(atom("have", &["?a"]))),
        )
        .operator(
            Operator::new("drop", [a])
                .with_precondition(holds("have", &["?a"]))
                .with_effect(Effect::Delete(atom("have", &["?a"]))),
        )
        .method(swap_method(SWAP_DIRECT, "?x", "?y"))
        .method(swap_method(SWAP_SYMMETRIC, "?y", "?x"))
        .build()
}

#[allow(clippy::expect_used)]
fn swap_method(name: &str, dropped: &str, picked: &str) -> Method {
    let mut b = TaskNetwork::builder();
    let d = b.add_task(prim("drop", &[dropped]));
    let p = b.add_task(prim("pickup", &[picked]));
    b.add_constraint(Constraint::precedence([d], [p]))
        .and_then(|b| b.add_constraint(Constraint::before([d], holds("have", &[dropped]))))
        .and_then(|b| b.add_constraint(Constraint::before([p], lacks("have", &[picked]))))
        .expect("swap template constraints are acyclic and closed");
    Method::new(name, compound("swap", &["?x", "?y"]), b.build())
}

/// Holding `held`, swap `give` for `take`.
pub fn swap_problem(held: &str, give: &str, take: &str) -> Problem {
    let mut b = TaskNetwork::builder();
    b.add_task(compound("swap", &[give, take]));
    Problem::new(
        format!("swap-{give}-{take}"),
        state([atom("have", &[held])]),
        b.build(),
    )
}

/// Parcel delivery: `deliver(?p, ?from, ?to)` is `pick < transport < place`,
/// and `transport` is either `drive` (needs a road) or `fly` (needs two
/// airports). The road method is declared first.
///
/// Effects matter here: `place` requires `held(?p)`, which only `pick`
/// establishes. Plan with [`logistics_config`].
pub fn logistics_domain() -> Domain {
    let p = make_variable("p");
    let l = make_variable("l");
    let from = make_variable("from");
    let to = make_variable("to");
    let moved = |name: &str, requirement: Condition| {
        Operator::new(name, [p.clone(), from.clone(), to.clone()])
            .with_precondition(Condition::And(vec![
                holds("at", &["?p", "?from"]),
                requirement,
            ]))
            .with_effect(Effect::Delete(atom("at", &["?p", "?from"])))
            .with_effect(Effect::Add(atom("at", &["?p", "?to"])))
    };
    Domain::builder("logistics")
        .operator(
            Operator::new("pick", [p.clone(), l.clone()])
                .with_precondition(holds("at", &["?p", "?l"]))
                .with_effect(Effect::Add(atom("held", &["?p"]))),
        )
        .operator(
            Operator::new("place", [p.clone(), l])
                .with_precondition(Condition::And(vec![
                    holds("held", &["?p"]),
                    holds("at", &["?p", "?l"]),
                ]))
                .with_effect(Effect::Delete(atom("held", &["?p"]))),
        )
        .operator(moved("drive", holds("road", &["?from", "?to"])))
        .operator(moved(
            "fly",
            Condition::And(vec![
                holds("airport", &["?from"]),
                holds("airport", &["?to"]),
            ]),
        ))
        .method(deliver_method())
        .method(transport_method("by-road", "drive"))
        .method(transport_method("by-air", "fly"))
        .build()
}

#[allow(clippy::expect_used)]
fn deliver_method() -> Method {
    let mut b = TaskNetwork::builder();
    let pick = b.add_task(prim("pick", &["?p", "?from"]));
    let transport = b.add_task(compound("transport", &["?p", "?from", "?to"]));
    let place = b.add_task(prim("place", &["?p", "?to"]));
    chain(&mut b, &[pick, transport, place]).expect("deliver template is a chain");
    Method::new(
        "deliver",
        compound("deliver", &["?p", "?from", "?to"]),
        b.build(),
    )
}

fn transport_method(name: &str, operator: &str) -> Method {
    let mut b = TaskNetwork::builder();
    b.add_task(prim(operator, &["?p", "?from", "?to"]));
    Method::new(
        name,
        compound("transport", &["?p", "?from", "?to"]),
        b.build(),
    )
}

/// Deliver `parcel` from the depot to `destination`.
///
/// The depot has an airport and a road to the market; the harbor has an
/// airport and no road.
pub fn logistics_problem(parcel: &str, destination: &str) -> Problem {
    let mut b = TaskNetwork::builder();
    b.add_task(compound("deliver", &[parcel, "depot", destination]));
    Problem::new(
        format!("deliver-{parcel}-{destination}"),
        state([
            atom("at", &[parcel, "depot"]),
            atom("airport", &["depot"]),
            atom("airport", &["harbor"]),
            atom("road", &["depot", "market"]),
        ]),
        b.build(),
    )
}

/// Planner configuration for [`logistics_domain`]: effects are applied.
pub fn logistics_config() -> PlannerConfig {
    PlannerConfig {
        state_progression: StateProgression::Apply,
        ..PlannerConfig::default()
    }
}

/// A task that may always decompose into itself again.
///
/// `spin()` has two methods: `spin-again` (one more `spin()`) is declared
/// before `spin-stop` (no subtasks). Unbounded search never terminates on its
/// own; a depth limit or node budget is needed.
pub fn spin_domain() -> Domain {
    let mut again = TaskNetwork::builder();
    again.add_task(compound("spin", &[]));
    Domain::builder("spin")
        .method(Method::new("spin-again", compound("spin", &[]), again.build()))
        .method(Method::new("spin-stop", compound("spin", &[]), TaskNetwork::empty()))
        .build()
}

/// A single `spin()` goal from the empty state.
pub fn spin_problem() -> Problem {
    let mut b = TaskNetwork::builder();
    b.add_task(compound("spin", &[]));
    Problem::new("spin", State::new(), b.build())
}
