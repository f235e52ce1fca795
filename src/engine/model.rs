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

//! This module provides the successor model: the successor variables of all
//! cities together with the circuit constraint that binds them. This is the
//! object the search drives.

use crate::{
    CPResult, CircuitPropagator, City, Cost, CostMatrix, DomainBroker, DomainStore,
    DomainStoreImpl, Propagator, SaveAndRestore, StateManager, TrailedStateManager,
};

/// This is the type of the successor model you will likely want to work
/// with.
pub type DefaultSuccessorModel = SuccessorModel<TrailedStateManager>;

/// The successor model owns the domains and the circuit propagator, and
/// runs the propagation until a fixpoint is reached.
///
/// # Note
/// Because it would be very inconvenient to always force a client to go
/// through the domain store of the model, this struct is a domain store with
/// save and restore capabilities itself. The implementation of these traits is
/// simply delegated to the underlying domain store.
pub struct SuccessorModel<T: StateManager> {
    /// The successor domains
    domains: DomainStoreImpl<T>,
    /// The circuit constraint
    circuit: CircuitPropagator,
    /// The cities whose successor got fixed and must be propagated
    pending: Vec<City>,
}

impl<T: StateManager> SuccessorModel<T> {
    /// Creates the model of a tour over `n` cities
    pub fn new(state: T, n: usize) -> Self {
        let mut domains = DomainStoreImpl::new(state, n);
        let circuit = CircuitPropagator::new(&mut domains);
        Self {
            domains,
            circuit,
            pending: Vec::with_capacity(n),
        }
    }

    /// Performs the root propagation. The domains of tiny instances are fixed
    /// from the start without any event being raised; this is why all fixed
    /// cities are propagated explicitly here.
    pub fn post(&mut self) -> CPResult<()> {
        for city in 0..self.domains.n_cities() {
            if self.domains.is_fixed(city) {
                self.circuit.on_fixed(&mut self.domains, city)?;
            }
        }
        self.fixpoint()
    }

    /// Propagates the circuit constraint until no domain changes anymore
    pub fn fixpoint(&mut self) -> CPResult<()> {
        loop {
            self.collect_fixed();
            if self.pending.is_empty() {
                self.circuit.propagate(&mut self.domains)?;
                self.collect_fixed();
                if self.pending.is_empty() {
                    return Ok(());
                }
            }

            for city in self.pending.drain(..) {
                self.circuit.on_fixed(&mut self.domains, city)?;
            }
        }
    }

    /// Gathers the cities that became fixed and clears the events
    fn collect_fixed(&mut self) {
        let pending = &mut self.pending;
        pending.clear();
        self.domains.for_each_event(|e| {
            if e.is_fixed {
                pending.push(e.city)
            }
        });
        self.domains.clear_events();
    }

    /// The circuit propagator (and its path bookkeeping)
    pub fn circuit(&self) -> &CircuitPropagator {
        &self.circuit
    }

    /// The underlying domain store
    pub fn domains(&self) -> &DomainStoreImpl<T> {
        &self.domains
    }

    /// Returns true iff every successor variable is fixed
    pub fn is_complete(&self) -> bool {
        (0..self.domains.n_cities()).all(|city| self.domains.is_fixed(city))
    }

    /// The successor of each city, when they are all fixed
    pub fn successors(&self) -> Option<Vec<City>> {
        (0..self.domains.n_cities())
            .map(|city| self.domains.value(city))
            .collect()
    }

    /// The cost of the edges that have already been committed to
    pub fn committed_cost(&self, costs: &CostMatrix) -> Cost {
        (0..self.domains.n_cities())
            .filter_map(|city| self.domains.value(city).map(|succ| costs.cost(city, succ)))
            .sum()
    }
}
impl<T: StateManager + Default> SuccessorModel<T> {
    /// Creates the model of a tour over `n` cities on a fresh state manager
    pub fn with_cities(n: usize) -> Self {
        Self::new(T::default(), n)
    }
}
//------------------------------------------------------------------------------
// Domain store facet
//------------------------------------------------------------------------------
impl<T: StateManager> DomainStore for SuccessorModel<T> {
    fn n_cities(&self) -> usize {
        self.domains.n_cities()
    }

    fn size(&self, city: City) -> usize {
        self.domains.size(city)
    }

    fn contains(&self, city: City, succ: City) -> bool {
        self.domains.contains(city, succ)
    }

    fn value(&self, city: City) -> Option<City> {
        self.domains.value(city)
    }

    fn for_each_candidate(&self, city: City, f: &mut dyn FnMut(City)) {
        self.domains.for_each_candidate(city, f)
    }

    fn assign(&mut self, city: City, succ: City) -> CPResult<()> {
        self.domains.assign(city, succ)
    }

    fn remove(&mut self, city: City, succ: City) -> CPResult<()> {
        self.domains.remove(city, succ)
    }
}
//------------------------------------------------------------------------------
// Save and Restore management
//------------------------------------------------------------------------------
impl<T: StateManager> SaveAndRestore for SuccessorModel<T> {
    fn save_state(&mut self) {
        self.domains.save_state()
    }

    fn restore_state(&mut self) {
        self.domains.restore_state();
        self.pending.clear();
    }

    fn depth(&self) -> usize {
        self.domains.depth()
    }
}

// #############################################################################
// ### UNIT TESTS ##############################################################
// #############################################################################
