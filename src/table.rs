//! The unique table enforcing "one vertex per structural identity".
//!
//! Keys are `(index, high_id, signed_low_id)` triplets, where the sign of
//! the low id encodes the complement attribute of the low edge. Values
//! are weak references: the table observes vertices but never extends
//! their lifetime, which is what allows reference-count-driven garbage
//! collection of dead subgraphs.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap;
use log::debug;

use crate::utils::{HashableKey, MyHasher};
use crate::vertex::{VertexPtr, VertexWeak};

/// `(index, high_id, signed_low_id)` key of a unique if-then-else vertex.
pub type Triplet = (i32, i64, i64);

/// Table of unique if-then-else vertices denoting function graphs.
///
/// At most one live vertex exists per key. An entry whose target has
/// been destroyed counts as absent and is replaced on the next insert.
pub struct UniqueTable {
    map: HashMap<HashableKey<Triplet>, VertexWeak, BuildHasherDefault<MyHasher>>,
}

impl UniqueTable {
    pub fn new() -> Self {
        Self {
            map: HashMap::default(),
        }
    }

    /// Returns the number of entries in the table.
    ///
    /// With eager garbage collection this equals the number of live
    /// if-then-else vertices.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Looks up the live vertex stored under `key`.
    ///
    /// A stale entry (destroyed target) is reported as a miss.
    pub fn get(&self, key: &Triplet) -> Option<VertexPtr> {
        self.map
            .get(&HashableKey(*key))
            .and_then(VertexWeak::upgrade)
    }

    /// Stores a weak reference under `key`, replacing any stale entry.
    pub fn insert(&mut self, key: Triplet, vertex: &VertexPtr) {
        let old = self.map.insert(HashableKey(key), VertexPtr::downgrade(vertex));
        if let Some(old) = old {
            // Only a dead entry may be displaced; live ones are unique.
            debug_assert!(old.upgrade().is_none(), "Duplicate vertex for {:?}", key);
        }
    }

    /// Erases the entry of a destroyed vertex.
    pub fn remove(&mut self, key: &Triplet) {
        debug!("unique table: erasing {:?}", key);
        self.map.remove(&HashableKey(*key));
    }
}

impl Default for UniqueTable {
    fn default() -> Self {
        Self::new()
    }
}
