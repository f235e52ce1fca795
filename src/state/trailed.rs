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

//! This module defines the data structures and utilities that are used to
//! save and restore data from the solver trail.
use super::*;

/// Number of bits packed in one word of a bitset
const WORD_BITS: usize = u64::BITS as usize;

//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~ TRAIL DATA ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// This structure keeps track of the information about one given level: the
/// length of its trail and the count of each kind of resources that are managed
/// by the state manager
#[derive(Debug, Clone, Copy, Default)]
struct Level {
    /// the length of the trail at the moment this layer was started
    trail_size: usize,
    /// how many integers have already been recorded ?
    integers: usize,
    /// how many bitsets have already been recorded ?
    bitsets: usize,
    /// how many bitset words have already been recorded ?
    words: usize,
}

/// An entry that is used to save/restore data from the trail
#[derive(Debug, Clone, Copy)]
enum TrailEntry {
    /// An entry related to the restoration of an integer value
    IntEntry(IntState),
    /// An entry related to the restoration of one word of a bitset
    WordEntry(WordState),
}

//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~ STATE MANAGER ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A simple state manager that can manage integers and bitsets. Only the
/// values that actually change are pushed onto the trail, so restoring a
/// level costs time proportional to the changes made since it was saved.
#[derive(Debug, Clone)]
pub struct TrailedStateManager {
    /// At what 'time' was this data modified to the point where it needed being saved ?
    ///
    /// # Note:
    /// This data was referred to as 'magic' in minicp and maxicp. Still I like to
    /// convey the idea that 'magic' is actually a monotonic clock  indicating the validity
    /// timestamp of the data.
    clock: usize,
    /// The previous values that are saved on the trail
    trail: Vec<TrailEntry>,
    /// Some book keeping to track what needs and what doesn't need
    /// to be restored upon manager `pop`
    levels: Vec<Level>,

    /// The current value of the various managed integers
    integers: Vec<IntState>,

    /// Holds the metadata about bitsets
    bitsets: Vec<BitSet>,
    /// Holds the actual words of all bitsets
    words: Vec<WordState>,
}
impl Default for TrailedStateManager {
    fn default() -> Self {
        Self::new()
    }
}
impl TrailedStateManager {
    /// Creates a new empty manager
    pub fn new() -> Self {
        Self {
            clock: 0,
            trail: vec![],
            levels: vec![Level::default()],
            integers: vec![],
            bitsets: vec![],
            words: vec![],
        }
    }
    /// Returns the number of entries that currently sit on the trail
    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }
}
impl StateManager for TrailedStateManager {}
//------------------------------------------------------------------------------
// Save and Restore management
//------------------------------------------------------------------------------
impl SaveAndRestore for TrailedStateManager {
    /// Saves the current state
    fn save_state(&mut self) {
        self.clock += 1;
        self.levels.push(Level {
            trail_size: self.trail.len(),
            integers: self.integers.len(),
            bitsets: self.bitsets.len(),
            words: self.words.len(),
        })
    }
    /// Restores the previous state
    fn restore_state(&mut self) {
        // the root level is never popped
        if self.levels.len() <= 1 {
            return;
        }
        let level = self.levels.pop().unwrap_or_default();

        // restore whatever needs to be restored
        for e in self.trail.iter().skip(level.trail_size).rev().copied() {
            match e {
                TrailEntry::IntEntry(state) => self.integers[state.id.0] = state,
                TrailEntry::WordEntry(state) => self.words[state.index] = state,
            }
        }
        // drop stale trail entry
        self.trail.truncate(level.trail_size);

        // resources created after the level was saved vanish with it
        self.integers.truncate(level.integers);
        self.bitsets.truncate(level.bitsets);
        self.words.truncate(level.words);

        // a fresh clock value forces the next write of every resource onto
        // the trail again
        self.clock += 1;
    }

    fn depth(&self) -> usize {
        self.levels.len() - 1
    }
}
//------------------------------------------------------------------------------
// Int management
//------------------------------------------------------------------------------
/// The state of an integer that can be saved and restored
#[derive(Debug, Clone, Copy)]
struct IntState {
    /// The identifier of the managed resource
    id: ReversibleInt,
    /// At what 'time' was this data modified to the point where it needed being saved ?
    clock: usize,
    /// The value that will be restored in the managed data
    value: isize,
}

impl IntManager for TrailedStateManager {
    fn manage_int(&mut self, value: isize) -> ReversibleInt {
        let id = ReversibleInt(self.integers.len());
        self.integers.push(IntState {
            id,
            clock: self.clock,
            value,
        });
        id
    }
    fn get_int(&self, id: ReversibleInt) -> isize {
        self.integers[id.0].value
    }
    fn set_int(&mut self, id: ReversibleInt, value: isize) -> isize {
        let curr = self.integers[id.0];
        // if the value is unchanged there is no need to do anything
        if value != curr.value {
            // do i need to trail this data ?
            if curr.clock < self.clock {
                self.trail.push(TrailEntry::IntEntry(curr));
                self.integers[id.0] = IntState {
                    id,
                    clock: self.clock,
                    value,
                }
            // apparently i don't need to save it on the trail. i can modify it right away
            } else {
                self.integers[id.0].value = value;
            }
        }
        value
    }
    fn increment(&mut self, id: ReversibleInt) -> isize {
        self.set_int(id, self.get_int(id) + 1)
    }
    fn decrement(&mut self, id: ReversibleInt) -> isize {
        self.set_int(id, self.get_int(id) - 1)
    }
}
//------------------------------------------------------------------------------
// Bitset management
//------------------------------------------------------------------------------
/// The state of one 64 bits word of a bitset
#[derive(Debug, Clone, Copy)]
struct WordState {
    /// Position of this word in the `words` vector
    index: usize,
    /// At what 'time' was this word modified to the point where it needed being saved ?
    clock: usize,
    /// The bits themselves
    bits: u64,
}

/// The information that needs to be maintained in order to deal with a
/// bitset
#[derive(Debug, Clone, Copy)]
struct BitSet {
    /// index of the first word of this set
    start: usize,
    /// number of words used by this set
    n_words: usize,
    /// number of values the set can hold
    capa: usize,
    /// the current cardinality of the set
    size: ReversibleInt,
}

impl BitSetManager for TrailedStateManager {
    fn manage_bitset(&mut self, capacity: usize, full: bool) -> ReversibleBitSet {
        let id = ReversibleBitSet(self.bitsets.len());
        let start = self.words.len();
        let n_words = (capacity + WORD_BITS - 1) / WORD_BITS;

        for w in 0..n_words {
            let bits = if !full {
                0
            } else if (w + 1) * WORD_BITS <= capacity {
                u64::MAX
            } else {
                (1u64 << (capacity - w * WORD_BITS)) - 1
            };
            self.words.push(WordState {
                index: start + w,
                clock: self.clock,
                bits,
            });
        }

        let size = self.manage_int(if full { capacity as isize } else { 0 });
        self.bitsets.push(BitSet {
            start,
            n_words,
            capa: capacity,
            size,
        });
        id
    }

    fn bitset_size(&self, id: ReversibleBitSet) -> usize {
        self.get_int(self.bitsets[id.0].size) as usize
    }

    fn bitset_contains(&self, id: ReversibleBitSet, value: usize) -> bool {
        let bs = self.bitsets[id.0];
        if value >= bs.capa {
            false
        } else {
            let word = self.words[bs.start + value / WORD_BITS].bits;
            word & (1u64 << (value % WORD_BITS)) != 0
        }
    }

    fn bitset_min(&self, id: ReversibleBitSet) -> Option<usize> {
        let bs = self.bitsets[id.0];
        self.words[bs.start..bs.start + bs.n_words]
            .iter()
            .enumerate()
            .find(|(_, w)| w.bits != 0)
            .map(|(i, w)| i * WORD_BITS + w.bits.trailing_zeros() as usize)
    }

    fn bitset_remove(&mut self, id: ReversibleBitSet, value: usize) -> bool {
        if !self.bitset_contains(id, value) {
            false
        } else {
            let bs = self.bitsets[id.0];
            let index = bs.start + value / WORD_BITS;
            let bits = self.words[index].bits & !(1u64 << (value % WORD_BITS));
            self.set_word(index, bits);
            self.decrement(bs.size);
            true
        }
    }

    fn bitset_remove_all(&mut self, id: ReversibleBitSet) {
        let bs = self.bitsets[id.0];
        for index in bs.start..bs.start + bs.n_words {
            self.set_word(index, 0);
        }
        self.set_int(bs.size, 0);
    }

    fn bitset_remove_all_but(&mut self, id: ReversibleBitSet, value: usize) {
        if self.bitset_contains(id, value) {
            let bs = self.bitsets[id.0];
            let keep = bs.start + value / WORD_BITS;
            for index in bs.start..bs.start + bs.n_words {
                let bits = if index == keep {
                    1u64 << (value % WORD_BITS)
                } else {
                    0
                };
                self.set_word(index, bits);
            }
            self.set_int(bs.size, 1);
        } else {
            self.bitset_remove_all(id);
        }
    }

    fn bitset_for_each<F: FnMut(usize)>(&self, id: ReversibleBitSet, mut f: F) {
        let bs = self.bitsets[id.0];
        for (i, word) in self.words[bs.start..bs.start + bs.n_words].iter().enumerate() {
            let mut bits = word.bits;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                f(i * WORD_BITS + bit);
                bits &= bits - 1;
            }
        }
    }
}
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
// private methods
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
impl TrailedStateManager {
    /// Overwrites the bits of one word, trailing its previous value when
    /// needed (same policy as the integers)
    fn set_word(&mut self, index: usize, bits: u64) {
        let curr = self.words[index];
        if bits != curr.bits {
            if curr.clock < self.clock {
                self.trail.push(TrailEntry::WordEntry(curr));
                self.words[index] = WordState {
                    index,
                    clock: self.clock,
                    bits,
                };
            } else {
                self.words[index].bits = bits;
            }
        }
    }
}

// #############################################################################
// ### UNIT TESTS ##############################################################
// #############################################################################


//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~ UT CHECKPOINT ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
#[cfg(test)]
mod tests_manager_checkpoint {
    use super::*;

    #[test]
    fn checkpoint_increases_depth() {
        let mut mgr = TrailedStateManager::new();
        assert_eq!(0, mgr.depth());
        let cp = mgr.checkpoint();
        assert_eq!(1, mgr.depth());
        mgr.restore(cp);
        assert_eq!(0, mgr.depth());
    }

    #[test]
    fn restore_undoes_nested_levels_at_once() {
        let mut mgr = TrailedStateManager::new();
        let a = mgr.manage_int(1);
        let s = mgr.manage_bitset(10, true);

        let cp = mgr.checkpoint();
        mgr.set_int(a, 2);
        mgr.bitset_remove(s, 3);
        mgr.save_state();
        mgr.set_int(a, 3);
        mgr.bitset_remove(s, 4);
        mgr.save_state();
        mgr.bitset_remove_all_but(s, 9);

        mgr.restore(cp);
        assert_eq!(0, mgr.depth());
        assert_eq!(1, mgr.get_int(a));
        assert_eq!(10, mgr.bitset_size(s));
        assert!(mgr.bitset_contains(s, 3));
        assert!(mgr.bitset_contains(s, 4));
    }

    #[test]
    fn restore_an_outer_checkpoint_after_an_inner_one() {
        let mut mgr = TrailedStateManager::new();
        let a = mgr.manage_int(0);

        let outer = mgr.checkpoint();
        mgr.set_int(a, 1);
        let inner = mgr.checkpoint();
        mgr.set_int(a, 2);

        mgr.restore(inner);
        assert_eq!(1, mgr.get_int(a));
        mgr.restore(outer);
        assert_eq!(0, mgr.get_int(a));
    }
}

//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~ UT BITSET ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
//~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
#[cfg(test)]
mod tests_manager_bitset {
    use super::*;

    fn content(mgr: &TrailedStateManager, id: ReversibleBitSet) -> Vec<usize> {
        let mut out = vec![];
        mgr.bitset_for_each(id, |v| out.push(v));
        out
    }

    #[test]
    fn a_full_set_contains_all_values() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(5, true);
        assert_eq!(5, mgr.bitset_size(s));
        assert_eq!(vec![0, 1, 2, 3, 4], content(&mgr, s));
        assert!(!mgr.bitset_contains(s, 5));
    }

    #[test]
    fn an_empty_set_contains_nothing() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(5, false);
        assert!(mgr.bitset_is_empty(s));
        assert_eq!(None, mgr.bitset_min(s));
        assert!(content(&mgr, s).is_empty());
    }

    #[test]
    fn sets_can_span_several_words() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(130, true);
        assert_eq!(130, mgr.bitset_size(s));
        assert!(mgr.bitset_contains(s, 63));
        assert!(mgr.bitset_contains(s, 64));
        assert!(mgr.bitset_contains(s, 129));
        assert!(!mgr.bitset_contains(s, 130));
        assert_eq!(130, content(&mgr, s).len());
    }

    #[test]
    fn exactly_sixty_four_values_fill_one_word() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(64, true);
        assert_eq!(64, mgr.bitset_size(s));
        assert!(mgr.bitset_contains(s, 63));
        assert_eq!(64, content(&mgr, s).len());
    }

    #[test]
    fn remove_updates_size_and_min() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(100, true);

        assert!(mgr.bitset_remove(s, 0));
        assert!(!mgr.bitset_remove(s, 0));
        assert_eq!(99, mgr.bitset_size(s));
        assert_eq!(Some(1), mgr.bitset_min(s));

        for v in 1..70 {
            mgr.bitset_remove(s, v);
        }
        assert_eq!(Some(70), mgr.bitset_min(s));
        assert_eq!(30, mgr.bitset_size(s));
    }

    #[test]
    fn remove_out_of_range_does_nothing() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(10, true);
        assert!(!mgr.bitset_remove(s, 42));
        assert_eq!(10, mgr.bitset_size(s));
    }

    #[test]
    fn remove_all_but() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(100, true);
        mgr.bitset_remove_all_but(s, 77);
        assert_eq!(1, mgr.bitset_size(s));
        assert_eq!(vec![77], content(&mgr, s));
    }

    #[test]
    fn remove_all_but_a_missing_value_empties_the_set() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(10, true);
        mgr.bitset_remove(s, 4);
        mgr.bitset_remove_all_but(s, 4);
        assert!(mgr.bitset_is_empty(s));
    }

    #[test]
    fn remove_all() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(10, true);
        mgr.bitset_remove_all(s);
        assert!(mgr.bitset_is_empty(s));
        assert!(content(&mgr, s).is_empty());
    }

    #[test]
    fn save_and_restore_bring_the_content_back() {
        let mut mgr = TrailedStateManager::new();
        let s = mgr.manage_bitset(10, true);

        mgr.save_state();
        mgr.bitset_remove(s, 2);
        mgr.bitset_remove(s, 5);
        assert_eq!(vec![0, 1, 3, 4, 6, 7, 8, 9], content(&mgr, s));

        mgr.save_state();
        mgr.bitset_remove_all_but(s, 8);
        assert_eq!(vec![8], content(&mgr, s));

        mgr.restore_state();
        assert_eq!(vec![0, 1, 3, 4, 6, 7, 8, 9], content(&mgr, s));
        assert_eq!(8, mgr.bitset_size(s));

        mgr.restore_state();
        assert_eq!((0..10).collect::<Vec<_>>(), content(&mgr, s));
        assert_eq!(10, mgr.bitset_size(s));
    }
}
