//! Compute tables: memoization of Apply results.
//!
//! One table exists per primitive binary operator. Keys are unordered
//! pairs of signed operand ids (`min` first), so that commutative
//! operations share cached results. Values hold strong function
//! references; together with monotonically increasing vertex ids this
//! rules out a cached result ever referring to a recycled identity.

use std::cell::Cell;
use std::hash::BuildHasherDefault;

use hashbrown::HashMap;

use crate::utils::{HashableKey, MyHasher};

/// Table of processed computations over functions.
///
/// The argument functions are recorded with their signed ids (not vertex
/// pointers), ordered as `{min_id, max_id}` to keep only unique
/// computations.
pub struct ComputeTable<V> {
    map: HashMap<HashableKey<(i64, i64)>, V, BuildHasherDefault<MyHasher>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<V> ComputeTable<V> {
    /// Creates a table with pre-allocated capacity `2^bits`.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");
        Self {
            map: HashMap::with_capacity_and_hasher(1 << bits, BuildHasherDefault::default()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    fn key(one: i64, two: i64) -> (i64, i64) {
        debug_assert_ne!(one.abs(), two.abs(), "Same-graph arguments must not be cached");
        (one.min(two), one.max(two))
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    /// Reset the table.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<V: Clone> ComputeTable<V> {
    /// Get the cached result of an operation over the signed operand ids.
    pub fn get(&self, one: i64, two: i64) -> Option<V> {
        match self.map.get(&HashableKey(Self::key(one, two))) {
            Some(value) => {
                self.hits.set(self.hits.get() + 1);
                Some(value.clone())
            }
            None => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Insert a computed result for the signed operand ids.
    pub fn insert(&mut self, one: i64, two: i64, value: V) {
        self.map.insert(HashableKey(Self::key(one, two)), value);
    }
}
