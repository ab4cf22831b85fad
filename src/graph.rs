//! The preprocessed Boolean graph consumed by BDD construction.
//!
//! The graph is produced by an external preprocessing pass: gates are
//! simplified, every variable carries a total ordering number, and
//! logically independent gates are tagged as modules. The BDD core only
//! reads this structure; it never mutates it.
//!
//! Gates and variables share one positive index space. A negative
//! argument index denotes formula-level negation of that argument.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Operators of gates in the preprocessed Boolean graph.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operator {
    And,
    Or,
    /// Combination (K/N) gate with a vote number.
    Atleast,
    /// Exclusive OR with exactly two arguments.
    Xor,
    /// Boolean negation with a single argument.
    Not,
    Nand,
    Nor,
    /// A single argument gate that passes its argument through.
    Null,
}

/// A basic event of the fault tree, indexed during preprocessing.
#[derive(Debug)]
pub struct Variable {
    index: i32,
    order: i32,
}

pub type VariablePtr = Rc<Variable>;

impl Variable {
    /// # Panics
    ///
    /// Panics unless both the index and the ordering number are positive.
    pub fn new(index: i32, order: i32) -> Self {
        assert!(index > 0, "Variable index must be positive");
        assert!(order > 0, "Variable order must be positive");
        Self { index, order }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn order(&self) -> i32 {
        self.order
    }
}

/// A logic gate of the preprocessed Boolean graph.
///
/// Arguments are kept in insertion order as signed indices; the lookup
/// maps resolve positive indices to child gates and variables.
#[derive(Debug)]
pub struct Gate {
    index: i32,
    order: i32,
    operator: Operator,
    vote_number: i32,
    module: bool,
    args: Vec<i32>,
    gate_args: HashMap<i32, GatePtr>,
    variable_args: HashMap<i32, VariablePtr>,
}

pub type GatePtr = Rc<Gate>;

impl Gate {
    pub fn new(index: i32, operator: Operator) -> Self {
        assert!(index > 0, "Gate index must be positive");
        Self {
            index,
            order: 0,
            operator,
            vote_number: 0,
            module: false,
            args: Vec::new(),
            gate_args: HashMap::new(),
            variable_args: HashMap::new(),
        }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    /// The ordering number of this gate.
    ///
    /// Only meaningful for module gates, which serve as proxy variables
    /// in their parent BDD.
    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn set_order(&mut self, order: i32) {
        assert!(order > 0, "Gate order must be positive");
        self.order = order;
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The vote number of an ATLEAST gate.
    pub fn vote_number(&self) -> i32 {
        assert!(self.vote_number > 0, "The vote number is not set");
        self.vote_number
    }

    pub fn set_vote_number(&mut self, vote_number: i32) {
        assert_eq!(self.operator, Operator::Atleast, "Only ATLEAST gates carry a vote number");
        assert!(vote_number > 1, "Vote numbers below 2 denote simpler gates");
        self.vote_number = vote_number;
    }

    /// Whether this gate represents an independent sub-graph.
    pub fn module(&self) -> bool {
        self.module
    }

    pub fn set_module(&mut self, flag: bool) {
        self.module = flag;
    }

    /// Signed argument indices in insertion order.
    pub fn args(&self) -> &[i32] {
        &self.args
    }

    pub fn gate_args(&self) -> &HashMap<i32, GatePtr> {
        &self.gate_args
    }

    pub fn variable_args(&self) -> &HashMap<i32, VariablePtr> {
        &self.variable_args
    }

    /// Adds a variable argument, negated if `literal` is negative.
    ///
    /// # Panics
    ///
    /// Panics if the literal does not refer to the variable, or if the
    /// argument is already present.
    pub fn add_variable(&mut self, literal: i32, variable: &VariablePtr) {
        assert_eq!(literal.abs(), variable.index(), "Literal does not match the variable");
        self.add_arg(literal);
        self.variable_args.insert(variable.index(), variable.clone());
    }

    /// Adds a gate argument, negated if `literal` is negative.
    pub fn add_gate(&mut self, literal: i32, gate: &GatePtr) {
        assert_eq!(literal.abs(), gate.index(), "Literal does not match the gate");
        self.add_arg(literal);
        self.gate_args.insert(gate.index(), gate.clone());
    }

    fn add_arg(&mut self, literal: i32) {
        assert_ne!(literal, 0, "Argument index must not be zero");
        assert!(
            !self.args.contains(&literal) && !self.args.contains(&-literal),
            "Duplicate arguments must be resolved by preprocessing"
        );
        self.args.push(literal);
    }
}

/// A preprocessed Boolean graph rooted at the top event.
#[derive(Debug)]
pub struct BooleanGraph {
    root: GatePtr,
    complement_root: bool,
}

impl BooleanGraph {
    pub fn new(root: GatePtr) -> Self {
        Self {
            root,
            complement_root: false,
        }
    }

    /// Marks the root function as complemented (from normalization).
    pub fn with_complement_root(mut self, flag: bool) -> Self {
        self.complement_root = flag;
        self
    }

    /// The top gate of the graph.
    pub fn root(&self) -> &GatePtr {
        &self.root
    }

    pub fn complement_root(&self) -> bool {
        self.complement_root
    }

    /// All variables reachable from the root, without duplicates.
    pub fn variables(&self) -> Vec<VariablePtr> {
        let mut visited = HashSet::new();
        let mut variables = Vec::new();
        Self::gather_variables(&self.root, &mut visited, &mut variables);
        variables
    }

    fn gather_variables(
        gate: &GatePtr,
        visited: &mut HashSet<i32>,
        variables: &mut Vec<VariablePtr>,
    ) {
        if !visited.insert(gate.index()) {
            return;
        }
        for &arg in gate.args() {
            let index = arg.abs();
            if let Some(variable) = gate.variable_args().get(&index) {
                if visited.insert(index) {
                    variables.push(variable.clone());
                }
            } else if let Some(child) = gate.gate_args().get(&index) {
                Self::gather_variables(child, visited, variables);
            }
        }
    }
}
