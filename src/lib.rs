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

//! A lean constraint propagation engine for the circuit constraint, driven
//! by a depth first branch and bound. Given a matrix of travel costs, it finds
//! the cheapest tour that visits every city exactly once.
//!
//! ```
//! use circuit_cp::prelude::*;
//!
//! let costs = CostMatrix::new(vec![
//!     vec![0, 1, 1, 1],
//!     vec![1, 0, 1, 1],
//!     vec![1, 1, 0, 1],
//!     vec![1, 1, 1, 0],
//! ]).unwrap();
//!
//! let report = solve(&costs, None).unwrap();
//! assert_eq!(4, report.total_cost);
//! assert_eq!(SolveStatus::Optimal, report.status);
//! assert_eq!(0, report.tour[0]);
//! ```

mod engine;
mod state;

pub use engine::*;
pub use state::*;

/// Everything you need to build and solve a model
pub mod prelude {
    pub use crate::engine::*;
    pub use crate::state::*;
}
