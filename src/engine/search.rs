//
// circuit-cp is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License  v3
// as published by the Free Software Foundation.
//
// circuit-cp is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY.
// See the GNU Lesser General Public License  for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with circuit-cp. If not, see http://www.gnu.org/licenses/lgpl-3.0.en.html
//
// Copyright (c)  2022 by X. Gillard
//

//! This module provides the depth first branch and bound that drives the
//! successor model.
//!
//! The search is a state machine running over an explicit stack of decision
//! frames (no recursion). Each frame remembers which city is being branched
//! on, the candidate successors of that city sorted by increasing cost, the
//! next candidate to try and the checkpoint taken before the candidate that is
//! currently being explored.
//!
//! The branching is fully deterministic: the city with the smallest domain is
//! picked first (ties go to the lowest index) and its candidates are tried by
//! increasing cost (ties go to the lowest index).

use std::time::Instant;

use log::{debug, trace};

use crate::{
    is_single_circuit, BoundEstimator, Checkpoint, City, Cost, CostMatrix, DomainStore,
    SaveAndRestore, SearchMode, SearchStatistics, SolutionListener, SolverConfig, StateManager,
    SuboptimalReason, SuccessorModel,
};

/// The states of the branch and bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    /// The current node passed propagation: time to expand it
    Exploring,
    /// Try the next candidate of the topmost frame
    Backtracking,
    /// The current node is a dead end and must be undone
    Pruned,
    /// All variables are fixed
    Feasible,
    /// The search is over. It was interrupted when a reason is given
    Exhausted(Option<SuboptimalReason>),
}

/// One branching decision
#[derive(Debug)]
struct Frame {
    /// the city whose successor is decided
    city: City,
    /// its candidate successors in the order they will be tried
    candidates: Vec<City>,
    /// index of the next candidate to try
    cursor: usize,
    /// the state right before the candidate under exploration was assigned
    checkpoint: Option<Checkpoint>,
}

/// What the search produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// the successor array and cost of the best tour found
    pub best: Option<(Vec<City>, Cost)>,
    /// set when the search stopped before exhausting the tree
    pub interrupted: Option<SuboptimalReason>,
    /// the counters of the search
    pub statistics: SearchStatistics,
}

/// The branch and bound itself
pub struct BranchAndBound<'a, T: StateManager> {
    costs: &'a CostMatrix,
    config: &'a SolverConfig,
    model: SuccessorModel<T>,
    stack: Vec<Frame>,
    best: Option<(Vec<City>, Cost)>,
    stats: SearchStatistics,
    start: Instant,
}

impl<'a, T: StateManager> BranchAndBound<'a, T> {
    /// Creates a search over the given costs. The matrix is expected to be
    /// valid.
    pub fn new(costs: &'a CostMatrix, config: &'a SolverConfig, state: T) -> Self {
        Self {
            costs,
            config,
            model: SuccessorModel::new(state, costs.n()),
            stack: vec![],
            best: None,
            stats: SearchStatistics::default(),
            start: Instant::now(),
        }
    }

    /// Runs the search to completion (or until a limit is hit)
    pub fn run(
        mut self,
        mut listener: Option<&mut (dyn SolutionListener + '_)>,
    ) -> SearchOutcome {
        self.start = Instant::now();

        let mut state = if self.model.post().is_ok() {
            SearchState::Exploring
        } else {
            debug!("root propagation failed");
            self.stats.failures += 1;
            SearchState::Exhausted(None)
        };

        let interrupted = loop {
            state = match state {
                SearchState::Exploring => self.explore(),
                SearchState::Backtracking => self.backtrack(),
                SearchState::Pruned => {
                    self.undo_last_decision();
                    SearchState::Backtracking
                }
                SearchState::Feasible => self.on_feasible(&mut listener),
                SearchState::Exhausted(reason) => break reason,
            };
        };

        self.stats.runtime = self.start.elapsed();
        SearchOutcome {
            best: self.best,
            interrupted,
            statistics: self.stats,
        }
    }

    /// Expands the current node
    fn explore(&mut self) -> SearchState {
        if self.model.is_complete() {
            return SearchState::Feasible;
        }
        if self.budget_exceeded() {
            debug!("budget exceeded after {} nodes", self.stats.nodes);
            return SearchState::Exhausted(Some(SuboptimalReason::BudgetExceeded));
        }

        if let Some((_, best)) = self.best {
            let bound = self.config.bound.lower_bound(&self.model, self.costs);
            if bound >= best {
                trace!("pruned at depth {} (bound {bound} >= {best})", self.stack.len());
                self.stats.pruned += 1;
                return SearchState::Pruned;
            }
        }

        let city = self.select_city();
        let candidates = self.sorted_candidates(city);
        self.stack.push(Frame {
            city,
            candidates,
            cursor: 0,
            checkpoint: None,
        });
        self.stats.max_depth = self.stats.max_depth.max(self.stack.len());
        self.backtrack()
    }

    /// Tries the next candidate of the topmost frame, or pops it when there
    /// is none left
    fn backtrack(&mut self) -> SearchState {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                return SearchState::Exhausted(None);
            };
            if frame.cursor >= frame.candidates.len() {
                trace!("backtrack from city {}", frame.city);
                self.stack.pop();
                self.undo_last_decision();
                continue;
            }

            let city = frame.city;
            let succ = frame.candidates[frame.cursor];
            frame.cursor += 1;
            frame.checkpoint = Some(self.model.checkpoint());
            self.stats.nodes += 1;

            let outcome = self
                .model
                .assign(city, succ)
                .and_then(|_| self.model.fixpoint());
            if outcome.is_ok() {
                return SearchState::Exploring;
            }
            self.stats.failures += 1;
            self.undo_last_decision();
        }
    }

    /// Records a complete assignment and decides whether to go on
    fn on_feasible(
        &mut self,
        listener: &mut Option<&mut (dyn SolutionListener + '_)>,
    ) -> SearchState {
        let Some(successors) = self.model.successors() else {
            return SearchState::Pruned;
        };
        if !is_single_circuit(&successors) {
            self.stats.failures += 1;
            return SearchState::Pruned;
        }

        let cost = self.costs.tour_cost(&successors);
        let improves = self.best.as_ref().map_or(true, |(_, best)| cost < *best);
        if !improves {
            return SearchState::Pruned;
        }

        debug!("new incumbent with cost {cost} after {} nodes", self.stats.nodes);
        self.stats.solutions += 1;
        if let Some(l) = listener.as_mut() {
            l.on_solution(&successors, cost);
        }
        self.best = Some((successors, cost));

        if self.config.mode == SearchMode::FirstFeasible {
            return SearchState::Exhausted(Some(SuboptimalReason::FirstFeasible));
        }
        if let Some(limit) = self.config.solution_limit {
            if self.stats.solutions >= limit as u64 {
                return SearchState::Exhausted(Some(SuboptimalReason::SolutionLimit));
            }
        }
        SearchState::Pruned
    }

    /// Restores the state from before the candidate currently explored by the
    /// topmost frame
    fn undo_last_decision(&mut self) {
        if let Some(cp) = self.stack.last_mut().and_then(|f| f.checkpoint.take()) {
            self.model.restore(cp);
        }
    }

    fn budget_exceeded(&self) -> bool {
        let out_of_time = self
            .config
            .time_limit
            .map_or(false, |limit| self.start.elapsed() >= limit);
        let out_of_nodes = self
            .config
            .node_limit
            .map_or(false, |limit| self.stats.nodes >= limit);
        out_of_time || out_of_nodes
    }

    /// Smallest domain first, lowest index on ties
    fn select_city(&self) -> City {
        (0..self.model.n_cities())
            .filter(|city| !self.model.is_fixed(*city))
            .min_by_key(|city| (self.model.size(*city), *city))
            .unwrap_or(0)
    }

    /// Cheapest first, lowest index on ties
    fn sorted_candidates(&self, city: City) -> Vec<City> {
        let mut candidates = self.model.candidates(city);
        candidates.sort_by_key(|succ| (self.costs.cost(city, *succ), *succ));
        candidates
    }
}
