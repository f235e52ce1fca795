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

//! This module provides the lower bounds used by the branch and bound to
//! prune the search tree.
//!
//! All the estimators in here are admissible: in any tour that is still
//! consistent with the current domains, every city leaves towards one of its
//! candidate successors and is entered from one of its candidate
//! predecessors. Summing the cheapest such edges can only underestimate the
//! cost of the tour. Since the domains only ever shrink while diving, these
//! bounds never decrease along a branch.
//!
//! The sums cannot overflow: a valid cost matrix guarantees that n times its
//! largest cost fits in a `Cost`.

use crate::{City, Cost, CostMatrix, DomainStore};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A bound estimator computes a lower bound on the cost of any tour that
/// completes the current partial assignment. It returns `Cost::MAX` when no
/// such tour can exist (some city has run out of candidates).
pub trait BoundEstimator {
    /// Computes the bound for the given domains
    fn lower_bound(&self, domains: &dyn DomainStore, costs: &CostMatrix) -> Cost;
}

/// The cost of the cheapest edge leaving `city` (`None` when its domain is
/// empty). For a fixed city, this is the committed cost.
fn cheapest_exit(domains: &dyn DomainStore, costs: &CostMatrix, city: City) -> Option<Cost> {
    let mut best = None;
    domains.for_each_candidate(city, &mut |succ| {
        let c = costs.cost(city, succ);
        best = Some(best.map_or(c, |b: Cost| b.min(c)));
    });
    best
}

/// The baseline bound: the cost already committed by the fixed cities plus
/// the cheapest way out of every other city.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowMinimumBound;

impl BoundEstimator for RowMinimumBound {
    fn lower_bound(&self, domains: &dyn DomainStore, costs: &CostMatrix) -> Cost {
        let mut total: Cost = 0;
        for city in 0..domains.n_cities() {
            match cheapest_exit(domains, costs, city) {
                Some(c) => total += c,
                None => return Cost::MAX,
            }
        }
        total
    }
}

/// Same as the row bound, but looking at the cheapest way into each city.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMinimumBound;

impl BoundEstimator for ColumnMinimumBound {
    fn lower_bound(&self, domains: &dyn DomainStore, costs: &CostMatrix) -> Cost {
        let n = domains.n_cities();
        let mut entry = vec![Cost::MAX; n];
        for from in 0..n {
            domains.for_each_candidate(from, &mut |to| {
                entry[to] = entry[to].min(costs.cost(from, to));
            });
        }

        let mut total: Cost = 0;
        for c in entry {
            if c == Cost::MAX {
                return Cost::MAX;
            }
            total += c;
        }
        total
    }
}

/// The best of the row and column bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowColumnBound;

impl BoundEstimator for RowColumnBound {
    fn lower_bound(&self, domains: &dyn DomainStore, costs: &CostMatrix) -> Cost {
        let row = RowMinimumBound.lower_bound(domains, costs);
        if row == Cost::MAX {
            return row;
        }
        row.max(ColumnMinimumBound.lower_bound(domains, costs))
    }
}

/// Selects the estimator used by the search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundKind {
    /// `RowMinimumBound`
    RowMinimum,
    /// `RowColumnBound`
    #[default]
    RowColumn,
}

impl BoundEstimator for BoundKind {
    fn lower_bound(&self, domains: &dyn DomainStore, costs: &CostMatrix) -> Cost {
        match self {
            BoundKind::RowMinimum => RowMinimumBound.lower_bound(domains, costs),
            BoundKind::RowColumn => RowColumnBound.lower_bound(domains, costs),
        }
    }
}
