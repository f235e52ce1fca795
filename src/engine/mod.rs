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

//! The engine comprises everything that is needed to find a tour: the
//! successor domains, the circuit propagator, the bounds and the search.

mod bound;
mod circuit;
mod config;
mod core;
mod domain;
mod matrix;
mod model;
mod report;
mod search;
mod solver;

pub use self::core::*;
pub use bound::*;
pub use circuit::*;
pub use config::*;
pub use domain::*;
pub use matrix::*;
pub use model::*;
pub use report::*;
pub use search::*;
pub use solver::*;
