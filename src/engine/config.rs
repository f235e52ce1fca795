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

//! The knobs of the branch and bound.

use std::time::Duration;

use crate::BoundKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What the search is after
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchMode {
    /// Explore the whole tree so as to prove the optimality of the best tour
    #[default]
    Optimize,
    /// Stop as soon as a first tour is found
    FirstFeasible,
}

/// The configuration of a solver. The default explores the whole tree
/// without any limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Wall clock budget of the search
    pub time_limit: Option<Duration>,
    /// Maximum number of branching decisions
    pub node_limit: Option<u64>,
    /// The search stops after this many improving tours
    pub solution_limit: Option<usize>,
    /// Whether to prove optimality or stop at the first tour
    pub mode: SearchMode,
    /// The lower bound used to prune the tree
    pub bound: BoundKind,
}

impl SolverConfig {
    /// Sets the wall clock budget
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the maximum number of branching decisions
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Stops the search after `limit` improving tours
    pub fn with_solution_limit(mut self, limit: usize) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    /// Sets the search mode
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the bound estimator
    pub fn with_bound(mut self, bound: BoundKind) -> Self {
        self.bound = bound;
        self
    }
}
