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

//! This module provides the entry points of the library: the `solve`
//! functions and the `Solver` they are built upon.

use std::time::Duration;

use log::info;

use crate::{
    BranchAndBound, City, Cost, CostMatrix, SolutionReport, SolveError, SolveStatus,
    SolverConfig, TrailedStateManager,
};

/// A solution listener is told about every tour that improves on the best
/// one found so far, in the order they are found.
pub trait SolutionListener {
    /// `successors[i]` is the city that follows i in the tour
    fn on_solution(&mut self, successors: &[City], cost: Cost);
}

/// Any closure/function that accepts a successor array and a cost can be
/// a solution listener.
impl<F: FnMut(&[City], Cost)> SolutionListener for F {
    fn on_solution(&mut self, successors: &[City], cost: Cost) {
        self(successors, cost)
    }
}

/// Finds the cheapest tour of the given matrix. When a time budget is given
/// and runs out, the best tour found so far is returned and marked as not
/// being proven optimal.
pub fn solve(
    costs: &CostMatrix,
    time_budget: Option<Duration>,
) -> Result<SolutionReport, SolveError> {
    let config = SolverConfig {
        time_limit: time_budget,
        ..SolverConfig::default()
    };
    solve_with(costs, &config)
}

/// Same as `solve` but with full control over the search
pub fn solve_with(
    costs: &CostMatrix,
    config: &SolverConfig,
) -> Result<SolutionReport, SolveError> {
    Solver::new(config.clone()).solve(costs)
}

/// A configured solver, optionally reporting its progress to a listener
pub struct Solver<'a> {
    config: SolverConfig,
    listener: Option<Box<dyn SolutionListener + 'a>>,
}

impl<'a> Solver<'a> {
    /// Creates a solver without any listener
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            listener: None,
        }
    }

    /// Registers the listener that will be told about every improving tour
    pub fn with_listener<L: SolutionListener + 'a>(mut self, listener: L) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// The configuration this solver runs with
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Validates the matrix and runs the branch and bound on it
    pub fn solve(&mut self, costs: &CostMatrix) -> Result<SolutionReport, SolveError> {
        costs.validate()?;
        info!(
            "solving a tour over {} cities ({:?} mode, {:?} bound)",
            costs.n(),
            self.config.mode,
            self.config.bound
        );

        let search = BranchAndBound::new(costs, &self.config, TrailedStateManager::new());
        let outcome = search.run(self.listener.as_deref_mut());

        let status = match (outcome.interrupted, &outcome.best) {
            (Some(reason), _) => SolveStatus::Suboptimal(reason),
            (None, Some(_)) => SolveStatus::Optimal,
            (None, None) => SolveStatus::Infeasible,
        };
        let report = SolutionReport::new(outcome.best, status, outcome.statistics);

        info!(
            "done: {:?}, cost {} ({} nodes, {} failures, {} pruned) in {:?}",
            report.status,
            report.total_cost,
            report.statistics.nodes,
            report.statistics.failures,
            report.statistics.pruned,
            report.statistics.runtime
        );
        Ok(report)
    }
}

// #############################################################################
// ### UNIT TESTS ##############################################################
// #############################################################################
#[cfg(test)]
mod test_solve {
    use std::time::Duration;

    use crate::prelude::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn brute_force(costs: &CostMatrix) -> Cost {
        fn go(costs: &CostMatrix, last: City, left: &mut Vec<City>, acc: Cost, best: &mut Cost) {
            if left.is_empty() {
                *best = (*best).min(acc + costs.cost(last, 0));
                return;
            }
            for k in 0..left.len() {
                let next = left.remove(k);
                go(costs, next, left, acc + costs.cost(last, next), best);
                left.insert(k, next);
            }
        }
        let mut best = Cost::MAX;
        go(costs, 0, &mut (1..costs.n()).collect(), 0, &mut best);
        best
    }

    fn unit_square() -> CostMatrix {
        // side 1, diagonal sqrt(2) truncated to 1
        CostMatrix::new(vec![
            vec![0, 1, 1, 1],
            vec![1, 0, 1, 1],
            vec![1, 1, 0, 1],
            vec![1, 1, 1, 0],
        ])
        .unwrap()
    }

    fn grid(n: usize) -> CostMatrix {
        // points on a 3 wide grid, manhattan distances
        let pos = |i: usize| ((i % 3) as Cost, (i / 3) as Cost);
        let rows = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let (xi, yi) = pos(i);
                        let (xj, yj) = pos(j);
                        (xi - xj).abs() + (yi - yj).abs()
                    })
                    .collect()
            })
            .collect();
        CostMatrix::new(rows).unwrap()
    }

    #[test]
    fn two_cities_yield_the_trivial_cycle() {
        let costs = CostMatrix::new(vec![vec![0, 3], vec![5, 0]]).unwrap();
        let report = solve(&costs, None).unwrap();
        assert_eq!(vec![0, 1], report.tour);
        assert_eq!(vec![1, 0], report.successors);
        assert_eq!(8, report.total_cost);
        assert_eq!(SolveStatus::Optimal, report.status);
    }

    #[test]
    fn unit_square_is_solved_to_optimality() {
        init_logger();
        let report = solve(&unit_square(), None).unwrap();
        assert_eq!(4, report.total_cost);
        assert_eq!(SolveStatus::Optimal, report.status);
        assert!(is_single_circuit(&report.successors));
    }

    #[test]
    fn asymmetric_costs_are_supported() {
        let costs = CostMatrix::new(vec![
            vec![0, 1, 10, 10],
            vec![10, 0, 1, 10],
            vec![10, 10, 0, 1],
            vec![1, 10, 10, 0],
        ])
        .unwrap();
        let report = solve(&costs, None).unwrap();
        assert_eq!(4, report.total_cost);
        assert_eq!(vec![0, 1, 2, 3], report.tour);
    }

    #[test]
    fn a_zero_budget_yields_no_invalid_tour() {
        init_logger();
        let report = solve(&grid(8), Some(Duration::ZERO)).unwrap();
        assert_eq!(
            SolveStatus::Suboptimal(SuboptimalReason::BudgetExceeded),
            report.status
        );
        assert!(!report.has_tour() || is_single_circuit(&report.successors));
    }

    #[test]
    fn a_node_budget_keeps_the_incumbent() {
        init_logger();
        // the greedy dive ends with the expensive 8 -> 0 edge; proving the
        // optimum takes many more than 10 decisions
        let n = 9;
        let rows = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| match (i, j) {
                        _ if i == j => 0,
                        (8, 0) => 100,
                        _ if j == i + 1 => 1,
                        _ => 2,
                    })
                    .collect()
            })
            .collect();
        let costs = CostMatrix::new(rows).unwrap();
        let config = SolverConfig::default().with_node_limit(10);
        let report = solve_with(&costs, &config).unwrap();

        assert_eq!(
            SolveStatus::Suboptimal(SuboptimalReason::BudgetExceeded),
            report.status
        );
        assert!(report.has_tour());
        assert!(is_single_circuit(&report.successors));
        assert_eq!(costs.tour_cost(&report.successors), report.total_cost);
        assert!(report.total_cost >= brute_force(&costs));
        assert!(report.statistics.solutions >= 1);
    }

    #[test]
    fn a_generous_time_budget_still_proves_the_optimum() {
        let costs = grid(6);
        let report = solve(&costs, Some(Duration::from_secs(60))).unwrap();
        assert_eq!(SolveStatus::Optimal, report.status);
        assert_eq!(brute_force(&costs), report.total_cost);
        assert!(is_single_circuit(&report.successors));
    }

    #[test]
    fn invalid_matrices_are_rejected() {
        let err = CostMatrix::new(vec![vec![0]]).unwrap_err();
        assert_eq!(InvalidInput::TooFewCities { n: 1 }, err);
        let err = SolveError::from(err);
        assert_eq!("invalid input: a tour needs at least 2 cities, got 1", err.to_string());
    }

    #[test]
    fn the_optimum_matches_brute_force() {
        for n in 3..=7 {
            let costs = grid(n);
            let report = solve(&costs, None).unwrap();
            assert_eq!(brute_force(&costs), report.total_cost, "n = {n}");
            assert_eq!(SolveStatus::Optimal, report.status);
        }
    }

    #[test]
    fn first_feasible_mode_is_marked_as_such() {
        let config = SolverConfig::default().with_mode(SearchMode::FirstFeasible);
        let report = solve_with(&grid(6), &config).unwrap();
        assert_eq!(
            SolveStatus::Suboptimal(SuboptimalReason::FirstFeasible),
            report.status
        );
        assert!(is_single_circuit(&report.successors));
        assert_eq!(1, report.statistics.solutions);
    }

    #[test]
    fn both_bounds_agree_on_the_optimum() {
        let costs = grid(7);
        let row = SolverConfig::default().with_bound(BoundKind::RowMinimum);
        let col = SolverConfig::default().with_bound(BoundKind::RowColumn);
        assert_eq!(
            solve_with(&costs, &row).unwrap().total_cost,
            solve_with(&costs, &col).unwrap().total_cost
        );
    }

    #[test]
    fn the_listener_is_told_about_improvements() {
        let mut costs_seen = vec![];
        let report = Solver::new(SolverConfig::default())
            .with_listener(|_: &[City], cost: Cost| costs_seen.push(cost))
            .solve(&grid(7))
            .unwrap();
        assert_eq!(Some(&report.total_cost), costs_seen.last());
        assert_eq!(report.statistics.solutions as usize, costs_seen.len());
    }
}
