//! Vertices of the BDD graph: the terminal and if-then-else nodes.
//!
//! With attributed edges there is only a single terminal vertex of value
//! 1/True; the constant-0 function is a complemented edge to it. Shared
//! ownership flows from parents to children through [`VertexPtr`], while
//! the unique table observes vertices weakly and never keeps them alive.

use std::cell::Cell;
use std::fmt::{self, Debug, Formatter};
use std::rc::{Rc, Weak};

use crate::gc::GarbageCollector;
use crate::table::Triplet;

/// Shared BDD vertices.
pub type VertexPtr = Rc<Vertex>;
/// Pointer for storage outside of the BDD (unique table values).
pub type VertexWeak = Weak<Vertex>;

/// Identifier of the terminal vertex. Non-terminal vertices are assigned
/// identifiers strictly greater than this.
pub const TERMINAL_ID: i64 = 1;

/// A vertex in the BDD graph: the single terminal or an if-then-else node.
pub enum Vertex {
    /// The terminal vertex of value 1/True.
    Terminal,
    /// A non-terminal if-then-else vertex.
    Ite(Ite),
}

impl Vertex {
    /// Checks whether this vertex is the terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Vertex::Terminal)
    }

    /// Identifier of the function graph rooted by this vertex.
    ///
    /// The terminal has id 1; two identical non-terminal structures share
    /// the same id, and two distinct structures never do.
    pub fn id(&self) -> i64 {
        match self {
            Vertex::Terminal => TERMINAL_ID,
            Vertex::Ite(ite) => ite.id(),
        }
    }

    /// Downcasts to the if-then-else payload.
    pub fn as_ite(&self) -> Option<&Ite> {
        match self {
            Vertex::Terminal => None,
            Vertex::Ite(ite) => Some(ite),
        }
    }

    /// Downcasts to a vertex known to be non-terminal.
    pub(crate) fn ite(&self) -> &Ite {
        match self {
            Vertex::Terminal => unreachable!("the vertex is the terminal"),
            Vertex::Ite(ite) => ite,
        }
    }
}

impl Debug for Vertex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Vertex::Terminal => write!(f, "Terminal(1)"),
            Vertex::Ite(ite) => ite.fmt(f),
        }
    }
}

/// A non-terminal if-then-else vertex: `index ? high : low`.
///
/// The low/else edge carries the complement attribute; the high/then edge
/// is never complemented (the canonical form pushes complements down to
/// low edges and out to the root). The `p` and `factor` slots are
/// zero-initialised here and populated by downstream analyses.
pub struct Ite {
    index: i32,
    order: i32,
    id: i64,
    module: Cell<bool>,
    mark: Cell<bool>,
    high: VertexPtr,
    low: VertexPtr,
    complement_edge: bool,
    p: Cell<f64>,
    factor: Cell<f64>,
    gc: Weak<GarbageCollector>,
}

impl Ite {
    pub(crate) fn new(
        index: i32,
        order: i32,
        id: i64,
        high: VertexPtr,
        low: VertexPtr,
        complement_edge: bool,
        module: bool,
        gc: Weak<GarbageCollector>,
    ) -> Self {
        assert!(index > 0, "Variable index must be positive");
        assert!(order > 0, "Variable order must be positive");
        assert!(id > TERMINAL_ID, "Ids of terminal vertices are reserved");
        Self {
            index,
            order,
            id,
            module: Cell::new(module),
            mark: Cell::new(false),
            high,
            low,
            complement_edge,
            p: Cell::new(0.0),
            factor: Cell::new(0.0),
            gc,
        }
    }

    /// The index of the variable of this vertex.
    pub fn index(&self) -> i32 {
        self.index
    }

    /// The ordering number of the variable of this vertex.
    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// (1/True/then) branch of the Shannon decomposition.
    pub fn high(&self) -> &VertexPtr {
        &self.high
    }

    /// (0/False/else) branch of the Shannon decomposition.
    ///
    /// This edge has complement interpretation whenever
    /// [`complement_edge`][Ite::complement_edge] is set.
    pub fn low(&self) -> &VertexPtr {
        &self.low
    }

    /// Whether the low edge must be interpreted as a complement.
    pub fn complement_edge(&self) -> bool {
        self.complement_edge
    }

    /// Whether this vertex is a proxy for a modular sub-function.
    pub fn module(&self) -> bool {
        self.module.get()
    }

    /// The traversal mark of this vertex.
    pub fn mark(&self) -> bool {
        self.mark.get()
    }

    pub fn set_mark(&self, flag: bool) {
        self.mark.set(flag);
    }

    /// The probability slot of the function graph.
    pub fn p(&self) -> f64 {
        self.p.get()
    }

    pub fn set_p(&self, value: f64) {
        self.p.set(value);
    }

    /// Memorized results of importance factor calculations.
    pub fn factor(&self) -> f64 {
        self.factor.get()
    }

    pub fn set_factor(&self, value: f64) {
        self.factor.set(value);
    }

    /// The unique-table key of this vertex.
    pub(crate) fn key(&self) -> Triplet {
        let low_id = self.low.id();
        (
            self.index,
            self.high.id(),
            if self.complement_edge { -low_id } else { low_id },
        )
    }
}

impl Drop for Ite {
    fn drop(&mut self) {
        // The last strong reference is gone; hand the unique-table entry
        // back to the garbage collector (a no-op during BDD teardown).
        if let Some(gc) = self.gc.upgrade() {
            gc.collect(&self.key());
        }
    }
}

impl Debug for Ite {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ite")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("order", &self.order)
            .field("complement_edge", &self.complement_edge)
            .field("module", &self.module.get())
            .finish()
    }
}

/// Holder of computation resultant functions and gate representations.
///
/// If `vertex` is the terminal and `complement` is unset, the function is
/// the constant 1; with `complement` set, the constant 0. For a
/// non-terminal vertex the function is its Shannon decomposition,
/// complemented as a whole when `complement` is set.
#[derive(Clone)]
pub struct Function {
    /// The interpretation of the function.
    pub complement: bool,
    /// The root vertex of the BDD function graph.
    pub vertex: VertexPtr,
}

impl Function {
    pub fn new(complement: bool, vertex: VertexPtr) -> Self {
        Self { complement, vertex }
    }

    /// The same function with the opposite interpretation.
    pub fn complemented(&self) -> Self {
        Self {
            complement: !self.complement,
            vertex: self.vertex.clone(),
        }
    }

    /// The constant value of this function, if it is one.
    pub fn as_constant(&self) -> Option<bool> {
        if self.vertex.is_terminal() {
            Some(!self.complement)
        } else {
            None
        }
    }

    /// The signed vertex id: negative iff the function is complemented.
    ///
    /// Compute-table keys are built from these, so that cached results
    /// distinguish an argument from its complement.
    pub fn signed_id(&self) -> i64 {
        let id = self.vertex.id();
        if self.complement {
            -id
        } else {
            id
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        // Canonicity makes id equality structural equality.
        self.complement == other.complement && self.vertex.id() == other.vertex.id()
    }
}

impl Eq for Function {}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            if self.complement { "~" } else { "" },
            self.vertex.id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal() {
        let one: VertexPtr = Rc::new(Vertex::Terminal);
        assert!(one.is_terminal());
        assert_eq!(one.id(), TERMINAL_ID);
        assert!(one.as_ite().is_none());
    }

    #[test]
    fn test_constant_functions() {
        let one: VertexPtr = Rc::new(Vertex::Terminal);
        let top = Function::new(false, one.clone());
        let bottom = Function::new(true, one);
        assert_eq!(top.as_constant(), Some(true));
        assert_eq!(bottom.as_constant(), Some(false));
        assert_eq!(top.signed_id(), 1);
        assert_eq!(bottom.signed_id(), -1);
        assert_eq!(bottom, top.complemented());
        assert_ne!(top, bottom);
    }

    #[test]
    fn test_ite_key() {
        let one: VertexPtr = Rc::new(Vertex::Terminal);
        let ite = Ite::new(3, 1, 2, one.clone(), one, true, false, Weak::new());
        assert_eq!(ite.key(), (3, 1, -1));
        assert_eq!(ite.p(), 0.0);
        assert_eq!(ite.factor(), 0.0);
        assert!(!ite.mark());
        assert!(!ite.module());
    }
}
