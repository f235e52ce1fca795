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

//! This module provides the implementation of the propagator of the circuit
//! constraint: the successor variables must form one single cycle that goes
//! through all the cities (a hamiltonian circuit).
//!
//! The filtering is the classic incremental "no sub-tour" one. The fixed
//! successors always form a set of disjoint paths. For every such path, the
//! propagator knows its head (first city) and its tail (last city) together
//! with its length. Whenever the successor of a city i is fixed to j, the path
//! ending in i and the one starting in j are merged; then, unless the merged
//! path already covers all the cities, its tail is forbidden to go back to its
//! head since that would close a premature sub-cycle.
//!
//! On top of that, the propagator maintains the permutation side of the
//! constraint: a city has exactly one predecessor. Hence, fixing i -> j
//! removes j from all other domains, and a city that remains the candidate of
//! one single variable forces that variable.
//!
//! # Note
//! This filtering is sound but not complete (full consistency is NP-hard for
//! the circuit constraint). The search is what makes up for it.

use crate::{
    CPResult, City, DomainStore, DomainStoreImpl, Inconsistency, Propagator, ReversibleInt,
    StateManager,
};

/// Marks a city whose predecessor is not fixed yet
const NO_PREDECESSOR: isize = -1;

/// The propagator of the circuit constraint. All its bookkeeping lives in
/// reversible integers so that it is restored along with the domains.
#[derive(Debug, Clone)]
pub struct CircuitPropagator {
    /// the number of cities
    n: usize,
    /// `dest[h]` is the tail of the path whose head is h (only meaningful
    /// when h is the head of some path)
    dest: Vec<ReversibleInt>,
    /// `orig[t]` is the head of the path whose tail is t (only meaningful
    /// when t is the tail of some path)
    orig: Vec<ReversibleInt>,
    /// `length[h]` is the number of edges of the path whose head is h
    length: Vec<ReversibleInt>,
    /// `pred[j]` is the city whose successor has been fixed to j (or -1)
    pred: Vec<ReversibleInt>,
}

impl CircuitPropagator {
    /// Creates the propagator for all the successor variables of the domain
    /// store. Every city starts as a path of its own.
    pub fn new<T: StateManager>(domains: &mut DomainStoreImpl<T>) -> Self {
        let n = domains.n_cities();
        let sm = domains.state_manager_mut();

        let dest = (0..n).map(|i| sm.manage_int(i as isize)).collect();
        let orig = (0..n).map(|i| sm.manage_int(i as isize)).collect();
        let length = (0..n).map(|_| sm.manage_int(0)).collect();
        let pred = (0..n).map(|_| sm.manage_int(NO_PREDECESSOR)).collect();

        Self {
            n,
            dest,
            orig,
            length,
            pred,
        }
    }

    /// The head of the path that ends in `tail`
    pub fn head_of<T: StateManager>(&self, domains: &DomainStoreImpl<T>, tail: City) -> City {
        domains.state_manager().get_int(self.orig[tail]) as City
    }
    /// The tail of the path that starts in `head`
    pub fn tail_of<T: StateManager>(&self, domains: &DomainStoreImpl<T>, head: City) -> City {
        domains.state_manager().get_int(self.dest[head]) as City
    }
    /// The number of edges of the path that starts in `head`
    pub fn path_length<T: StateManager>(&self, domains: &DomainStoreImpl<T>, head: City) -> usize {
        domains.state_manager().get_int(self.length[head]) as usize
    }
    /// The city whose successor is fixed to `city` (if any)
    pub fn predecessor<T: StateManager>(
        &self,
        domains: &DomainStoreImpl<T>,
        city: City,
    ) -> Option<City> {
        let p = domains.state_manager().get_int(self.pred[city]);
        if p == NO_PREDECESSOR {
            None
        } else {
            Some(p as City)
        }
    }
}

impl<T: StateManager> Propagator<T> for CircuitPropagator {
    fn on_fixed(&mut self, domains: &mut DomainStoreImpl<T>, i: City) -> CPResult<()> {
        let j = domains.value(i).ok_or(Inconsistency)?;

        match self.predecessor(domains, j) {
            // already dealt with
            Some(p) if p == i => return Ok(()),
            // j would get two predecessors
            Some(_) => return Err(Inconsistency),
            None => {}
        }
        domains.state_manager_mut().set_int(self.pred[j], i as isize);

        // permutation: nobody else may go to j
        for k in (0..self.n).filter(|k| *k != i) {
            domains.remove(k, j)?;
        }

        // i is the tail of the path starting in s, j the head of the path
        // ending in d.
        let s = self.head_of(domains, i);
        let d = self.tail_of(domains, j);

        if j == s {
            // this closes the cycle, which is only fine when it covers all
            // the cities
            if self.path_length(domains, s) + 1 < self.n {
                return Err(Inconsistency);
            }
            return Ok(());
        }

        let len = self.path_length(domains, s) + self.path_length(domains, j) + 1;

        let sm = domains.state_manager_mut();
        sm.set_int(self.dest[s], d as isize);
        sm.set_int(self.orig[d], s as isize);
        sm.set_int(self.length[s], len as isize);

        if len < self.n - 1 {
            domains.remove(d, s)?;
        }
        Ok(())
    }

    fn propagate(&mut self, domains: &mut DomainStoreImpl<T>) -> CPResult<()> {
        // every city must keep at least one possible predecessor. The ones
        // that only have a single possible predecessor force it.
        for j in 0..self.n {
            if self.predecessor(domains, j).is_some() {
                continue;
            }
            let mut support = None;
            let mut count = 0;
            for k in (0..self.n).filter(|k| *k != j) {
                if domains.contains(k, j) {
                    count += 1;
                    support = Some(k);
                    if count > 1 {
                        break;
                    }
                }
            }
            match (count, support) {
                (0, _) => return Err(Inconsistency),
                (1, Some(k)) => domains.assign(k, j)?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Returns true iff the given successor array forms one single cycle going
/// through all the cities.
pub fn is_single_circuit(successors: &[City]) -> bool {
    let n = successors.len();
    if n < 2 {
        return false;
    }
    let mut seen = vec![false; n];
    let mut city = 0;
    for _ in 0..n {
        if city >= n || seen[city] {
            return false;
        }
        seen[city] = true;
        city = successors[city];
    }
    city == 0
}

#[cfg(test)]
mod test_circuit {
    use crate::prelude::*;

    fn setup(n: usize) -> (DefaultDomainStore, CircuitPropagator) {
        let mut ds = DefaultDomainStore::with_cities(n);
        let circuit = CircuitPropagator::new(&mut ds);
        (ds, circuit)
    }

    fn fix(
        ds: &mut DefaultDomainStore,
        circuit: &mut CircuitPropagator,
        i: City,
        j: City,
    ) -> CPResult<()> {
        ds.assign(i, j)?;
        circuit.on_fixed(ds, i)
    }

    #[test]
    fn fixing_a_successor_removes_it_from_other_domains() {
        let (mut ds, mut circuit) = setup(5);
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 0, 3));
        for k in 1..5 {
            assert!(!ds.contains(k, 3));
        }
        assert_eq!(Some(0), circuit.predecessor(&ds, 3));
    }

    #[test]
    fn tail_cannot_go_back_to_head() {
        let (mut ds, mut circuit) = setup(5);
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 0, 1));
        assert!(!ds.contains(1, 0));

        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 1, 2));
        assert!(!ds.contains(2, 0));
        assert_eq!(2, circuit.tail_of(&ds, 0));
        assert_eq!(0, circuit.head_of(&ds, 2));
        assert_eq!(2, circuit.path_length(&ds, 0));
    }

    #[test]
    fn merging_two_paths_updates_endpoints() {
        let (mut ds, mut circuit) = setup(6);
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 0, 1));
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 3, 4));
        // 0 -> 1 and 3 -> 4 become 0 -> 1 -> 3 -> 4
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 1, 3));

        assert_eq!(4, circuit.tail_of(&ds, 0));
        assert_eq!(0, circuit.head_of(&ds, 4));
        assert_eq!(3, circuit.path_length(&ds, 0));
        assert!(!ds.contains(4, 0));
    }

    #[test]
    fn last_edge_may_close_the_full_circuit() {
        let (mut ds, mut circuit) = setup(3);
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 0, 1));
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 1, 2));
        // the path covers all cities, going back to the head is allowed
        assert!(ds.contains(2, 0));
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 2, 0));
    }

    #[test]
    fn premature_subcycle_is_detected() {
        let (mut ds, mut circuit) = setup(4);
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 0, 1));
        // 1 -> 0 has been pruned: forcing it must fail
        assert_eq!(Err(Inconsistency), fix(&mut ds, &mut circuit, 1, 0));
    }

    #[test]
    fn two_predecessors_are_refused() {
        let (mut ds, mut circuit) = setup(4);
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 0, 2));
        assert_eq!(Err(Inconsistency), fix(&mut ds, &mut circuit, 1, 2));
    }

    #[test]
    fn a_city_with_no_possible_predecessor_is_a_dead_end() {
        let (mut ds, mut circuit) = setup(4);
        assert_eq!(Ok(()), ds.remove(0, 3));
        assert_eq!(Ok(()), ds.remove(1, 3));
        assert_eq!(Ok(()), ds.remove(2, 3));
        assert_eq!(Err(Inconsistency), circuit.propagate(&mut ds));
    }

    #[test]
    fn a_single_possible_predecessor_is_forced() {
        let (mut ds, mut circuit) = setup(4);
        assert_eq!(Ok(()), ds.remove(0, 3));
        assert_eq!(Ok(()), ds.remove(1, 3));
        assert_eq!(Ok(()), circuit.propagate(&mut ds));
        assert_eq!(Some(3), ds.value(2));
    }

    #[test]
    fn restore_brings_the_paths_back() {
        let (mut ds, mut circuit) = setup(5);
        let cp = ds.checkpoint();
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 0, 1));
        assert_eq!(Ok(()), fix(&mut ds, &mut circuit, 1, 2));
        ds.restore(cp);

        for city in 0..5 {
            assert_eq!(city, circuit.head_of(&ds, city));
            assert_eq!(city, circuit.tail_of(&ds, city));
            assert_eq!(0, circuit.path_length(&ds, city));
            assert_eq!(None, circuit.predecessor(&ds, city));
        }
        assert!(ds.contains(1, 0));
        assert!(ds.contains(3, 1));
    }

    #[test]
    fn single_circuit_detection() {
        assert!(is_single_circuit(&[1, 0]));
        assert!(is_single_circuit(&[1, 2, 3, 0]));
        assert!(is_single_circuit(&[2, 0, 3, 1]));
        assert!(!is_single_circuit(&[1, 0, 3, 2]));
        assert!(!is_single_circuit(&[1, 1, 0]));
        assert!(!is_single_circuit(&[0]));
        assert!(!is_single_circuit(&[5, 0]));
    }
}
