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

//! The cost matrix is the only input of the solver. It is produced by some
//! distance provider, borrowed read-only during the search, and never
//! modified by the engine.

use crate::{City, Cost, InvalidInput};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A dense n x n matrix where `cost(i, j)` is the cost of travelling from
/// city i to city j. The diagonal is never read. There is no symmetry
/// requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostMatrix {
    /// number of cities
    n: usize,
    /// row major content
    data: Vec<Cost>,
}

impl CostMatrix {
    /// Creates a matrix from its rows.
    pub fn new(rows: Vec<Vec<Cost>>) -> Result<Self, InvalidInput> {
        let n = rows.len();
        if n < 2 {
            return Err(InvalidInput::TooFewCities { n });
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(InvalidInput::NotSquare {
                row,
                len: r.len(),
                expected: n,
            });
        }
        let data = rows.into_iter().flatten().collect();
        let matrix = Self { n, data };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Creates a matrix from a row major slice of n * n entries.
    pub fn from_flat(n: usize, data: &[Cost]) -> Result<Self, InvalidInput> {
        if n < 2 {
            return Err(InvalidInput::TooFewCities { n });
        }
        if data.len() != n * n {
            return Err(InvalidInput::WrongLength {
                len: data.len(),
                expected: n * n,
            });
        }
        let matrix = Self {
            n,
            data: data.to_vec(),
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Checks all the invariants of a cost matrix. Matrices built with `new`
    /// or `from_flat` always pass; deserialized ones might not.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        if self.n < 2 {
            return Err(InvalidInput::TooFewCities { n: self.n });
        }
        if self.data.len() != self.n * self.n {
            return Err(InvalidInput::WrongLength {
                len: self.data.len(),
                expected: self.n * self.n,
            });
        }
        for from in 0..self.n {
            for to in (0..self.n).filter(|to| *to != from) {
                let cost = self.cost(from, to);
                if cost < 0 {
                    return Err(InvalidInput::NegativeCost { from, to, cost });
                }
            }
        }
        // a tour has n edges: its cost must never wrap around
        let max_cost = self.max_cost();
        if max_cost.checked_mul(self.n as Cost).is_none() {
            return Err(InvalidInput::CostOverflow { n: self.n, max_cost });
        }
        Ok(())
    }

    /// The number of cities
    pub fn n(&self) -> usize {
        self.n
    }

    /// The cost of travelling from `from` to `to`
    #[inline]
    pub fn cost(&self, from: City, to: City) -> Cost {
        self.data[from * self.n + to]
    }

    /// The largest off-diagonal cost
    pub fn max_cost(&self) -> Cost {
        (0..self.n)
            .flat_map(|i| (0..self.n).filter(move |j| *j != i).map(move |j| (i, j)))
            .map(|(i, j)| self.cost(i, j))
            .max()
            .unwrap_or(0)
    }

    /// The sum of `cost(i, successors[i])` over all cities. It cannot
    /// overflow on a valid matrix.
    pub fn tour_cost(&self, successors: &[City]) -> Cost {
        successors
            .iter()
            .enumerate()
            .map(|(i, j)| self.cost(i, *j))
            .sum()
    }
}

#[cfg(test)]
mod test_cost_matrix {
    use super::*;

    #[test]
    fn new_accepts_a_square_matrix() {
        let m = CostMatrix::new(vec![vec![0, 1, 2], vec![3, 0, 4], vec![5, 6, 0]]).unwrap();
        assert_eq!(3, m.n());
        assert_eq!(1, m.cost(0, 1));
        assert_eq!(6, m.cost(2, 1));
        assert_eq!(6, m.max_cost());
    }

    #[test]
    fn new_rejects_less_than_two_cities() {
        assert_eq!(
            Err(InvalidInput::TooFewCities { n: 1 }),
            CostMatrix::new(vec![vec![0]])
        );
        assert_eq!(
            Err(InvalidInput::TooFewCities { n: 0 }),
            CostMatrix::new(vec![])
        );
    }

    #[test]
    fn new_rejects_ragged_rows() {
        assert_eq!(
            Err(InvalidInput::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            }),
            CostMatrix::new(vec![vec![0, 1], vec![1]])
        );
    }

    #[test]
    fn new_rejects_negative_costs() {
        assert_eq!(
            Err(InvalidInput::NegativeCost {
                from: 1,
                to: 0,
                cost: -3
            }),
            CostMatrix::new(vec![vec![0, 1], vec![-3, 0]])
        );
    }

    #[test]
    fn the_diagonal_is_ignored() {
        assert!(CostMatrix::new(vec![vec![-1, 1], vec![1, -7]]).is_ok());
    }

    #[test]
    fn from_flat_checks_the_length() {
        assert_eq!(
            Err(InvalidInput::WrongLength {
                len: 4,
                expected: 9
            }),
            CostMatrix::from_flat(3, &[0, 1, 2, 3])
        );
        assert!(CostMatrix::from_flat(2, &[0, 1, 1, 0]).is_ok());
    }

    #[test]
    fn tours_that_could_overflow_are_rejected() {
        let big = Cost::MAX / 2;
        assert_eq!(
            Err(InvalidInput::CostOverflow {
                n: 3,
                max_cost: big
            }),
            CostMatrix::new(vec![vec![0, 1, big], vec![1, 0, 1], vec![1, 1, 0]])
        );
        // the diagonal is never part of a tour
        assert!(CostMatrix::new(vec![vec![Cost::MAX, 1], vec![1, 0]]).is_ok());
        // two edges of half the range still fit
        let m = CostMatrix::new(vec![vec![0, big], vec![big, 0]]).unwrap();
        assert_eq!(big * 2, m.tour_cost(&[1, 0]));
    }

    #[test]
    fn tour_cost_sums_the_outgoing_edges() {
        let m = CostMatrix::new(vec![vec![0, 1, 9], vec![9, 0, 2], vec![3, 9, 0]]).unwrap();
        assert_eq!(6, m.tour_cost(&[1, 2, 0]));
        assert_eq!(27, m.tour_cost(&[2, 0, 1]));
    }
}
