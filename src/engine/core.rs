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

//! This module provides the definition of the solver's core abstractions
//! (cities, costs, propagation failures, propagators and the errors that
//! cross the public boundary).

use crate::{DomainStoreImpl, StateManager};

/// A city is nothing but its index in the cost matrix (0..n)
pub type City = usize;

/// The cost of travelling from one city to the next (and of a whole tour)
pub type Cost = i64;

/// This is the kind of error that gets raised whenever a propagator fails
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq, Hash)]
#[error("inconsistency")]
pub struct Inconsistency;

/// The result of a propagation operation. (Note: all propagation opertations
/// can fail, in which case they raise an Inconsistency error)
pub type CPResult<T> = Result<T, Inconsistency>;

/// The reasons why a cost matrix is refused before the search even starts
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq, Hash)]
pub enum InvalidInput {
    /// A tour needs at least two cities
    #[error("a tour needs at least 2 cities, got {n}")]
    TooFewCities {
        /// the number of cities that was given
        n: usize,
    },
    /// One row does not have as many entries as there are rows
    #[error("row {row} has {len} entries where {expected} were expected")]
    NotSquare {
        /// the offending row
        row: usize,
        /// the number of entries of that row
        len: usize,
        /// the number of entries every row should have
        expected: usize,
    },
    /// A row major buffer does not hold n * n entries
    #[error("expected {expected} entries, got {len}")]
    WrongLength {
        /// the number of entries that was given
        len: usize,
        /// n * n
        expected: usize,
    },
    /// The cost of a tour might not fit in a `Cost`
    #[error("{n} edges of cost up to {max_cost} overflow the cost type")]
    CostOverflow {
        /// the number of cities
        n: usize,
        /// the largest off-diagonal cost
        max_cost: Cost,
    },
    /// Travel costs cannot be negative
    #[error("negative cost {cost} from city {from} to city {to}")]
    NegativeCost {
        /// departure city
        from: City,
        /// arrival city
        to: City,
        /// the faulty cost
        cost: Cost,
    },
}

/// The errors that can be returned by `solve`. Everything else (failed
/// branches, exhausted budgets) is reported through the solution report.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq, Hash)]
pub enum SolveError {
    /// The cost matrix was rejected
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
}

/// The propagator is the portion of the code where the magic actually happens.
/// It is called by the model during the fixpoint computation and enforces a
/// certain level of consistency on the successor domains it works on.
pub trait Propagator<T: StateManager> {
    /// Reacts to the successor of `city` having been fixed
    fn on_fixed(&mut self, domains: &mut DomainStoreImpl<T>, city: City) -> CPResult<()>;
    /// Runs once all the pending events have been dealt with. This is where
    /// the checks that are too costly to run on every event take place.
    fn propagate(&mut self, domains: &mut DomainStoreImpl<T>) -> CPResult<()>;
}
