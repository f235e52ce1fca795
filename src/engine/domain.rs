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

//! This module provides the definition and implementation of the successor
//! variables, DomainStore and DomainBroker

use crate::{
    CPResult, City, Inconsistency, ReversibleBitSet, SaveAndRestore, StateManager,
    TrailedStateManager,
};

/// A domain store is the entity that gives a hook to propagators for modifying
/// the successor domains. There is exactly one successor variable per city;
/// the domain of city i is the set of cities that may directly follow i in
/// the tour. (Note however that no propagator can directly access the events
/// associated with a given variable, nor decide to save or restore the state of
/// these domains to a previous value. These are the responsibilities devoted to
/// a DomainBroker -- which is typically implemented by the same structure as
/// DomainStore; but it helps to split responsibilities).
pub trait DomainStore {
    /// Returns the number of cities (hence of successor variables)
    fn n_cities(&self) -> usize;
    /// Returns the number of candidate successors of `city`
    fn size(&self, city: City) -> usize;
    /// Returns true iff `succ` is still a candidate successor of `city`
    fn contains(&self, city: City, succ: City) -> bool;
    /// Returns true iff the successor of the city is fixed/imposed
    fn is_fixed(&self, city: City) -> bool {
        self.size(city) == 1
    }
    /// Returns the successor of `city` when it is fixed
    fn value(&self, city: City) -> Option<City>;
    /// Calls `f` on each candidate successor of `city` in increasing order
    fn for_each_candidate(&self, city: City, f: &mut dyn FnMut(City));
    /// Returns the candidate successors of `city` in increasing order
    fn candidates(&self, city: City) -> Vec<City> {
        let mut out = Vec::with_capacity(self.size(city));
        self.for_each_candidate(city, &mut |c| out.push(c));
        out
    }
    /// Forces the successor of `city`. It returns an Inconsistency error
    /// when `succ` is not a candidate successor of that city.
    fn assign(&mut self, city: City, succ: City) -> CPResult<()>;
    /// Removes `succ` from the candidate successors of `city`. An
    /// Inconsistency error is returned when the domain becomes empty
    /// because of this removal.
    fn remove(&mut self, city: City, succ: City) -> CPResult<()>;
}

/// An event that tells what happened to the domain of a successor variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainEvent {
    /// This is the city whose successor domain has possibly changed
    pub city: City,
    /// This flag is set when the domain has become fixed
    /// (That is, it only has one single value left in its domain)
    pub is_fixed: bool,
    /// This flag is set when a domain has become empty
    /// (this should somehow have triggered an Inconsistency error)
    pub is_empty: bool,
    /// This flag is set when a change has occured in the domain
    /// (this is the weakest of the requirements to set a flag)
    pub domain_changed: bool,
}
impl DomainEvent {
    fn clear(&mut self) {
        self.is_fixed = false;
        self.is_empty = false;
        self.domain_changed = false;
    }
    fn is_set(&self) -> bool {
        self.is_fixed | self.is_empty | self.domain_changed
    }
}

/// The domain broker is the facet of the domain store which is in charge of
/// tracking all changes occurring in the domain of the variables. It is the
/// object which is used by the model to wake the propagators up.
pub trait DomainBroker: SaveAndRestore {
    /// forgets all events that have happened on the variables
    fn clear_events(&mut self);
    /// goes over all the events that have occurred on the variables
    fn for_each_event<F: FnMut(DomainEvent)>(&self, f: F);
}

/// This is the type of domain store implementation you will likely want to use
/// in your solver.
pub type DefaultDomainStore = DomainStoreImpl<TrailedStateManager>;

/// This is a simple implementation of a domain store. It implements both the
/// DomainStore and the DomainBroker traits. Each domain is a reversible bitset
/// managed by the state manager; this is what makes every assignment and every
/// removal undoable upon restoration of a checkpoint.
pub struct DomainStoreImpl<T: StateManager> {
    /// The state manager in charge of saving/restoring the domains states
    state: T,
    /// The candidate successors of each city
    domains: Vec<ReversibleBitSet>,
    /// The events attached to each city
    events: Vec<DomainEvent>,
}
impl<T: StateManager> DomainStoreImpl<T> {
    /// Creates the successor variables of `n` cities. Initially, any city can
    /// follow any other city (but no city can follow itself).
    pub fn new(mut state: T, n: usize) -> Self {
        let domains = (0..n)
            .map(|city| {
                let dom = state.manage_bitset(n, true);
                state.bitset_remove(dom, city);
                dom
            })
            .collect();
        let events = (0..n)
            .map(|city| DomainEvent {
                city,
                is_fixed: false,
                is_empty: false,
                domain_changed: false,
            })
            .collect();
        Self {
            state,
            domains,
            events,
        }
    }
    /// Returns a reference to the underlying state manager
    pub fn state_manager(&self) -> &T {
        &self.state
    }
    /// Returns a mutable reference to the underlying state manager
    pub fn state_manager_mut(&mut self) -> &mut T {
        &mut self.state
    }
    /// Returns the smallest candidate successor of `city` (if any)
    pub fn first_candidate(&self, city: City) -> Option<City> {
        self.state.bitset_min(self.domains[city])
    }
}
impl<T: StateManager + Default> DomainStoreImpl<T> {
    /// Creates the successor variables of `n` cities on a fresh state manager
    pub fn with_cities(n: usize) -> Self {
        Self::new(T::default(), n)
    }
}

impl<T: StateManager> DomainStore for DomainStoreImpl<T> {
    fn n_cities(&self) -> usize {
        self.domains.len()
    }

    fn size(&self, city: City) -> usize {
        self.state.bitset_size(self.domains[city])
    }

    fn contains(&self, city: City, succ: City) -> bool {
        self.state.bitset_contains(self.domains[city], succ)
    }

    fn value(&self, city: City) -> Option<City> {
        if self.is_fixed(city) {
            self.first_candidate(city)
        } else {
            None
        }
    }

    fn for_each_candidate(&self, city: City, f: &mut dyn FnMut(City)) {
        self.state.bitset_for_each(self.domains[city], f)
    }

    fn assign(&mut self, city: City, succ: City) -> CPResult<()> {
        let dom = self.domains[city];
        if !self.state.bitset_contains(dom, succ) {
            self.state.bitset_remove_all(dom);
            self.events[city].domain_changed = true;
            self.events[city].is_empty = true;
            Err(Inconsistency)
        } else if self.state.bitset_size(dom) == 1 {
            // if there is nothing to do, then we're done
            Ok(())
        } else {
            self.state.bitset_remove_all_but(dom, succ);
            self.events[city].domain_changed = true;
            self.events[city].is_fixed = true;
            Ok(())
        }
    }

    fn remove(&mut self, city: City, succ: City) -> CPResult<()> {
        let dom = self.domains[city];
        if !self.state.bitset_remove(dom, succ) {
            // there is nothing to do
            return Ok(());
        }
        let size = self.state.bitset_size(dom);
        let evt = &mut self.events[city];
        evt.domain_changed = true;
        evt.is_fixed |= size == 1;
        evt.is_empty |= size == 0;

        if size == 0 {
            Err(Inconsistency)
        } else {
            Ok(())
        }
    }
}
impl<T: StateManager> SaveAndRestore for DomainStoreImpl<T> {
    fn save_state(&mut self) {
        self.state.save_state()
    }

    fn restore_state(&mut self) {
        self.state.restore_state();
        // whatever happened below the restored level is meaningless now
        self.clear_events();
    }

    fn depth(&self) -> usize {
        self.state.depth()
    }
}
impl<T: StateManager> DomainBroker for DomainStoreImpl<T> {
    fn clear_events(&mut self) {
        self.events.iter_mut().for_each(DomainEvent::clear);
    }

    fn for_each_event<F: FnMut(DomainEvent)>(&self, f: F) {
        self.events
            .iter()
            .copied()
            .filter(DomainEvent::is_set)
            .for_each(f);
    }
}
