//! Garbage collection of the unique table.
//!
//! The collector owns the unique table on behalf of the BDD manager and
//! is shared (via `Rc`) with every if-then-else vertex. When the last
//! strong reference to a vertex disappears, its `Drop` impl calls back
//! into [`GarbageCollector::collect`], which erases the matching
//! unique-table entry. During teardown of the whole BDD the collection
//! is switched off to avoid redundant table mutations.

use std::cell::{Cell, RefCell};

use log::debug;

use crate::table::{Triplet, UniqueTable};
use crate::vertex::VertexPtr;

/// This garbage collector manages the unique table of a BDD.
///
/// The collection is triggered when the reference count of a BDD vertex
/// reaches 0. Construction is single-threaded, so a destructor never
/// races a table mutation; the interior `RefCell` borrow is only ever
/// taken for the duration of a single table operation.
pub struct GarbageCollector {
    unique_table: RefCell<UniqueTable>,
    enabled: Cell<bool>,
}

impl GarbageCollector {
    pub(crate) fn new() -> Self {
        Self {
            unique_table: RefCell::new(UniqueTable::new()),
            enabled: Cell::new(true),
        }
    }

    /// Frees the unique-table entry of a destroyed vertex,
    /// ONLY if collection is enabled.
    pub(crate) fn collect(&self, key: &Triplet) {
        if self.enabled.get() {
            self.unique_table.borrow_mut().remove(key);
        }
    }

    /// Switches collection off for the teardown of the whole BDD.
    pub(crate) fn disable(&self) {
        debug!("garbage collection disabled");
        self.enabled.set(false);
    }

    /// Looks up the live vertex stored under `key`.
    pub(crate) fn fetch(&self, key: &Triplet) -> Option<VertexPtr> {
        self.unique_table.borrow().get(key)
    }

    /// Registers a freshly created vertex under `key`.
    pub(crate) fn store(&self, key: Triplet, vertex: &VertexPtr) {
        self.unique_table.borrow_mut().insert(key, vertex);
    }

    /// The number of live entries in the unique table.
    pub(crate) fn unique_table_size(&self) -> usize {
        self.unique_table.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::vertex::{Ite, Vertex};

    #[test]
    fn test_collect_on_drop() {
        let gc = Rc::new(GarbageCollector::new());
        let one: VertexPtr = Rc::new(Vertex::Terminal);
        let key = (1, 1, -1);

        let vertex: VertexPtr = Rc::new(Vertex::Ite(Ite::new(
            1,
            1,
            2,
            one.clone(),
            one.clone(),
            true,
            false,
            Rc::downgrade(&gc),
        )));
        gc.store(key, &vertex);
        assert_eq!(gc.unique_table_size(), 1);

        drop(vertex);
        // The destructor has erased the entry.
        assert_eq!(gc.unique_table_size(), 0);
        assert!(gc.fetch(&key).is_none());
    }

    #[test]
    fn test_disabled_collection_keeps_entries() {
        let gc = Rc::new(GarbageCollector::new());
        let one: VertexPtr = Rc::new(Vertex::Terminal);
        let key = (1, 1, -1);

        let vertex: VertexPtr = Rc::new(Vertex::Ite(Ite::new(
            1,
            1,
            2,
            one.clone(),
            one.clone(),
            true,
            false,
            Rc::downgrade(&gc),
        )));
        gc.store(key, &vertex);

        gc.disable();
        drop(vertex);
        // Teardown mode: the (now stale) entry stays behind.
        assert_eq!(gc.unique_table_size(), 1);
        assert!(gc.fetch(&key).is_none());
    }
}
