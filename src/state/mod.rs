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

//! The state module comprises all traits and datastructures related to
//! the state (save and restore) management.
//!
//! # Note
//! The state manager is designed in terms of a visitor pattern: a reversible
//! resource is nothing but an identifier, and all reads and writes go through
//! the manager. This keeps the reversible objects themselves dead simple
//! (`Copy` handles) and lets the manager undo every change recorded since a
//! given checkpoint by simply replaying its trail backwards.

//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~ MANAGED RESOURCES ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The identifier of a managed integer resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReversibleInt(usize);

/// The identifier of a managed bitset resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReversibleBitSet(usize);

/// A token handed out by `SaveAndRestore::checkpoint`. Restoring it undoes
/// every change that was made to the managed resources after it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checkpoint(usize);

//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~ MANAGER TRAITS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A state manager is an object capable of saving and restoring the state of
/// all types of managed resources.
pub trait StateManager: SaveAndRestore + IntManager + BitSetManager {}

/// An implementation of this type is capable of saving and restoring the
/// state of the resources it manages.
pub trait SaveAndRestore {
    /// Saves the current state of all managed resources
    fn save_state(&mut self);
    /// Restores the previous state of all managed resources
    fn restore_state(&mut self);
    /// Returns the number of levels that have been saved and not yet restored
    fn depth(&self) -> usize;

    /// Saves the current state and returns a token that can later be used
    /// to come back to it.
    fn checkpoint(&mut self) -> Checkpoint {
        let token = Checkpoint(self.depth());
        self.save_state();
        token
    }
    /// Undoes all changes performed since the given checkpoint was taken
    /// (including the ones performed under nested checkpoints).
    fn restore(&mut self, checkpoint: Checkpoint) {
        while self.depth() > checkpoint.0 {
            self.restore_state();
        }
    }
}

/// All the operations that can be made on an integer resource
pub trait IntManager {
    /// creates a new managed integer
    fn manage_int(&mut self, value: isize) -> ReversibleInt;
    /// returns the value of a managed integer
    fn get_int(&self, id: ReversibleInt) -> isize;
    /// sets a managed integer's value and returns the new value
    fn set_int(&mut self, id: ReversibleInt, value: isize) -> isize;
    /// increments a managed integer's value
    fn increment(&mut self, id: ReversibleInt) -> isize;
    /// decrements a managed integer's value
    fn decrement(&mut self, id: ReversibleInt) -> isize;
}

/// All the operations that can be applied to a bitset over the values
/// `0..capacity`
pub trait BitSetManager {
    /// creates a new managed bitset able to hold the values `0..capacity`.
    /// When `full` is true, all the values are initially in the set.
    fn manage_bitset(&mut self, capacity: usize, full: bool) -> ReversibleBitSet;
    /// returns the number of values currently in the set
    fn bitset_size(&self, id: ReversibleBitSet) -> usize;
    /// returns true iff the set is empty
    fn bitset_is_empty(&self, id: ReversibleBitSet) -> bool {
        self.bitset_size(id) == 0
    }
    /// returns true iff the set contains the given value
    fn bitset_contains(&self, id: ReversibleBitSet, value: usize) -> bool;
    /// returns the smallest value of the set (if there is one)
    fn bitset_min(&self, id: ReversibleBitSet) -> Option<usize>;
    /// removes the given value from the set and tells whether or not it was
    /// actually deleted
    fn bitset_remove(&mut self, id: ReversibleBitSet, value: usize) -> bool;
    /// removes all values in the set
    fn bitset_remove_all(&mut self, id: ReversibleBitSet);
    /// removes all values in the set except the given value (if it belongs
    /// to the set)
    fn bitset_remove_all_but(&mut self, id: ReversibleBitSet, value: usize);
    /// Calls the function f once for each value in the set, in increasing
    /// order
    fn bitset_for_each<F: FnMut(usize)>(&self, id: ReversibleBitSet, f: F);
}

/// The state manager is in charge of storing and restoring the data from
/// and to the trail
mod trailed;

pub use trailed::*;
