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

//! This module provides the outcome of a call to solve.

use std::time::Duration;

use crate::{City, Cost};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why the returned tour is not proven optimal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SuboptimalReason {
    /// The time or node budget ran out
    BudgetExceeded,
    /// The requested number of improving tours was reached
    SolutionLimit,
    /// The search was asked to stop at the first tour
    FirstFeasible,
}

/// The status of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolveStatus {
    /// The tree was fully explored: the tour is the cheapest there is
    Optimal,
    /// The search stopped early. There might or might not be a tour
    Suboptimal(SuboptimalReason),
    /// The tree was fully explored and it holds no tour at all
    Infeasible,
}

/// Some counters about the search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchStatistics {
    /// number of branching decisions that have been tried
    pub nodes: u64,
    /// number of decisions that failed during propagation
    pub failures: u64,
    /// number of nodes cut by the bound
    pub pruned: u64,
    /// number of improving tours
    pub solutions: u64,
    /// deepest decision stack
    pub max_depth: usize,
    /// wall clock time of the search
    pub runtime: Duration,
}

/// What `solve` returns
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolutionReport {
    /// The cities in visiting order, starting at city 0 (empty if no tour)
    pub tour: Vec<City>,
    /// `successors[i]` is the city visited right after i (empty if no tour)
    pub successors: Vec<City>,
    /// The cost of the tour (0 if no tour)
    pub total_cost: Cost,
    /// Whether the tour is proven optimal (and why not, if it is not)
    pub status: SolveStatus,
    /// The counters of the search that produced this report
    pub statistics: SearchStatistics,
}

impl SolutionReport {
    /// Creates a report from the successor array of the best tour (if any)
    pub fn new(
        best: Option<(Vec<City>, Cost)>,
        status: SolveStatus,
        statistics: SearchStatistics,
    ) -> Self {
        match best {
            Some((successors, total_cost)) => Self {
                tour: tour_from_successors(&successors),
                successors,
                total_cost,
                status,
                statistics,
            },
            None => Self {
                tour: vec![],
                successors: vec![],
                total_cost: 0,
                status,
                statistics,
            },
        }
    }

    /// Returns true iff the tour is proven optimal
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Returns true iff a tour was found
    pub fn has_tour(&self) -> bool {
        !self.tour.is_empty()
    }

    /// The city visited right after `city` (if there is a tour)
    pub fn successor(&self, city: City) -> Option<City> {
        self.successors.get(city).copied()
    }
}

/// Walks the successor array from city 0
fn tour_from_successors(successors: &[City]) -> Vec<City> {
    let mut tour = Vec::with_capacity(successors.len());
    let mut city = 0;
    for _ in 0..successors.len() {
        tour.push(city);
        city = successors[city];
    }
    tour
}
