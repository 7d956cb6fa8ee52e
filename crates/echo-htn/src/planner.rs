// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Depth-first HTN search with backtracking.
//!
//! The search runs over an explicit stack of frames. Each frame holds one
//! network, the non-primitive task chosen in it, and the candidate methods
//! not yet tried for that task. Trying a candidate either pushes a child frame
//! (more decomposition needed), returns a plan (network primitive and
//! checked), or records a local failure and moves on to the next candidate.
//! The enumeration order is the same as plain recursion over candidates.
use tracing::{debug, info, instrument, trace};

use crate::action::Plan;
use crate::config::PlannerConfig;
use crate::decompose::DecompositionEngine;
use crate::domain::{Domain, Method, Problem};
use crate::error::{PlanNotFound, SearchFailure};
use crate::helper::PlannerHelper;
use crate::network::TaskNetwork;
use crate::sort::{SortService, TopologicalSort};
use crate::task::Task;
use crate::unify::UnificationService;

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Networks examined (root included).
    pub nodes: u64,
    /// Successful decompositions.
    pub decompositions: u64,
    /// Alternatives abandoned: failed unifications, rejected decompositions,
    /// failed children and exhausted frames.
    pub backtracks: u64,
    /// Deepest decomposition depth reached.
    pub max_depth: usize,
}

/// HTN planner.
#[derive(Debug)]
pub struct Planner {
    config: PlannerConfig,
    unifier: UnificationService,
    engine: DecompositionEngine,
    sorter: Box<dyn SortService>,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    /// Creates a planner with the default configuration and a topological sorter.
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    /// Creates a planner with `config`.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            config,
            unifier: UnificationService::new(),
            engine: DecompositionEngine::new(),
            sorter: Box::new(TopologicalSort),
        }
    }

    /// Replaces the linearization strategy.
    #[must_use]
    pub fn with_sorter(mut self, sorter: impl SortService + 'static) -> Self {
        self.sorter = Box::new(sorter);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Searches for a plan accomplishing `problem`'s network in `domain`.
    ///
    /// # Errors
    /// Returns [`PlanNotFound`] when every decomposition fails, or when a
    /// configured limit stops the search.
    pub fn find_plan(&self, domain: &Domain, problem: &Problem) -> Result<Plan, PlanNotFound> {
        self.find_plan_with_stats(domain, problem).0
    }

    /// Like [`Planner::find_plan`], also reporting search counters.
    #[instrument(skip_all, fields(domain = domain.name(), problem = problem.name()))]
    pub fn find_plan_with_stats(
        &self,
        domain: &Domain,
        problem: &Problem,
    ) -> (Result<Plan, PlanNotFound>, SearchStats) {
        let helper = PlannerHelper::with_config(domain, problem.state(), &self.config);
        let mut stats = SearchStats::default();
        let outcome = self.search(&helper, problem.network().clone(), &mut stats);
        match &outcome {
            Ok(plan) => info!(
                actions = plan.len(),
                nodes = stats.nodes,
                backtracks = stats.backtracks,
                "plan found: {plan}"
            ),
            Err(failure) => info!(nodes = stats.nodes, %failure, "no plan"),
        }
        (outcome.map_err(PlanNotFound::from), stats)
    }

    fn search<'d>(
        &self,
        helper: &PlannerHelper<'d>,
        root: TaskNetwork,
        stats: &mut SearchStats,
    ) -> Result<Plan, SearchFailure> {
        let (mut stack, root_task) = match self.expand(helper, root, 0, stats)? {
            Step::Solved(plan) => return Ok(plan),
            Step::Failed(failure) => return Err(failure),
            Step::Open(frame) => {
                let root_task = frame.task.to_string();
                (vec![frame], root_task)
            }
        };

        while let Some(frame) = stack.last_mut() {
            let Some(method) = frame.candidates.next() else {
                stats.backtracks += 1;
                let failure = frame
                    .failure
                    .take()
                    .unwrap_or_else(|| SearchFailure::MethodsExhausted(frame.task.to_string()));
                debug!(task = %frame.task, depth = frame.depth, %failure, "candidates exhausted");
                stack.pop();
                match stack.last_mut() {
                    Some(parent) => parent.failure = Some(failure),
                    None => return Err(failure),
                }
                continue;
            };

            let Some(next) = self.try_method(frame, method, stats) else {
                continue;
            };
            let depth = frame.depth + 1;
            match self.expand(helper, next, depth, stats)? {
                Step::Solved(plan) => return Ok(plan),
                Step::Open(child) => stack.push(child),
                Step::Failed(failure) => {
                    stats.backtracks += 1;
                    debug!(method = method.name(), depth, %failure, "branch failed");
                    if let Some(frame) = stack.last_mut() {
                        frame.failure = Some(failure);
                    }
                }
            }
        }
        Err(SearchFailure::MethodsExhausted(root_task))
    }

    /// Unifies and decomposes one candidate; `None` means try the next one.
    fn try_method(
        &self,
        frame: &Frame<'_>,
        method: &Method,
        stats: &mut SearchStats,
    ) -> Option<TaskNetwork> {
        let instance = method.standardize_apart();
        let substitution = match self.unifier.find_unifier(&frame.task, &instance) {
            Ok(s) => s,
            Err(err) => {
                stats.backtracks += 1;
                trace!(%err, "candidate rejected");
                return None;
            }
        };
        match self
            .engine
            .decompose(&substitution, &frame.network, &frame.task, &instance)
        {
            Ok(next) => {
                stats.decompositions += 1;
                Some(next)
            }
            Err(err) => {
                stats.backtracks += 1;
                debug!(method = method.name(), %err, "decomposition rejected");
                None
            }
        }
    }

    /// Examines one network; only budget exhaustion is fatal.
    fn expand<'d>(
        &self,
        helper: &PlannerHelper<'d>,
        network: TaskNetwork,
        depth: usize,
        stats: &mut SearchStats,
    ) -> Result<Step<'d>, SearchFailure> {
        stats.nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);
        if let Some(budget) = self.config.node_budget {
            if stats.nodes > budget {
                return Err(SearchFailure::BudgetExhausted(budget));
            }
        }
        if self.config.prune_dead_ends && helper.is_unsolvable(&network) {
            return Ok(Step::Failed(SearchFailure::Pruned));
        }
        let Ok(task) = helper.find_non_primitive(&network) else {
            return Ok(match helper.linearize(&network, self.sorter.as_ref()) {
                Ok(plan) => Step::Solved(plan),
                Err(failure) => Step::Failed(failure),
            });
        };
        if let Some(limit) = self.config.max_depth {
            if depth >= limit {
                return Ok(Step::Failed(SearchFailure::DepthLimit(limit)));
            }
        }
        let task = task.clone();
        let candidates = helper.candidate_methods(&task);
        trace!(task = %task, depth, candidates = candidates.len(), "expanding");
        Ok(Step::Open(Frame {
            network,
            task,
            candidates: candidates.into_iter(),
            depth,
            failure: None,
        }))
    }
}

/// One suspended choice point.
#[derive(Debug)]
struct Frame<'d> {
    network: TaskNetwork,
    task: Task,
    candidates: std::vec::IntoIter<&'d Method>,
    depth: usize,
    /// Most recent failure among this frame's alternatives.
    failure: Option<SearchFailure>,
}

#[derive(Debug)]
enum Step<'d> {
    Solved(Plan),
    Open(Frame<'d>),
    Failed(SearchFailure),
}
