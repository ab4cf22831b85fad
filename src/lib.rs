//! # fta-bdd: Fault-tree analysis with Binary Decision Diagrams
//!
//! **`fta-bdd`** is the BDD core of a fault-tree analysis engine. Given a
//! preprocessed Boolean graph (a DAG of logic gates rooted at a top event
//! whose leaves are basic events), it constructs a **Reduced Ordered BDD
//! with attributed edges** representing the function of the top gate.
//! This canonical structure is the input of downstream qualitative
//! (minimal-cut-set) and quantitative (probability, importance) analyses.
//!
//! ## What is a ROBDD with attributed edges?
//!
//! A Binary Decision Diagram represents a Boolean function as a DAG of
//! if-then-else vertices over an ordered set of variables. Reduction and
//! ordering make the representation **canonical**: for a fixed variable
//! ordering, equivalent formulas construct the very same graph. The
//! attributed-edge form adds complement marks on else-edges, so only a
//! single terminal vertex (constant 1) is needed and negation is free.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: all operations go through the
//!   [`Bdd`][crate::bdd::Bdd] manager, which owns the unique table, the
//!   compute tables, and the module map.
//! - **Canonical functions**: structural sharing via the unique table
//!   keeps one vertex per identity; equal functions share ids.
//! - **Modules**: logically independent sub-functions detected during
//!   preprocessing are built as separate BDDs behind proxy variables.
//! - **Deterministic reclamation**: reference counting plus a weak-keyed
//!   unique table garbage-collect dead subgraphs as soon as the last
//!   strong reference disappears.
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::rc::Rc;
//! use fta_bdd::bdd::{Bdd, Settings};
//! use fta_bdd::graph::{BooleanGraph, Gate, Operator, Variable};
//!
//! // The preprocessed graph of AND(x1, x2).
//! let x1 = Rc::new(Variable::new(1, 1));
//! let x2 = Rc::new(Variable::new(2, 2));
//! let mut top = Gate::new(3, Operator::And);
//! top.add_variable(1, &x1);
//! top.add_variable(2, &x2);
//! let graph = BooleanGraph::new(Rc::new(top));
//!
//! let bdd = Bdd::new(&graph, &Settings::default());
//! assert_eq!(bdd.count_ite_nodes(), 2);
//!
//! let mut assignment = std::collections::HashMap::new();
//! assignment.insert(1, true);
//! assignment.insert(2, true);
//! assert!(bdd.evaluate(bdd.root(), &assignment));
//! ```
//!
//! ## Core Components
//!
//! - **[`graph`]**: the preprocessed Boolean-graph input model.
//! - **[`bdd`]**: the heart of the crate; the [`Bdd`][crate::bdd::Bdd]
//!   manager and the construction algorithms.
//! - **[`vertex`]**: terminal and if-then-else vertices, and the
//!   [`Function`][crate::vertex::Function] representation.
//! - **[`dot`]**: Graphviz visualization of constructed BDDs.

pub mod bdd;
pub mod cache;
pub mod dot;
pub mod gc;
pub mod graph;
pub mod table;
pub mod utils;
pub mod vertex;
