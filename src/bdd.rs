//! Construction of Reduced Ordered BDDs with attributed edges from
//! preprocessed Boolean graphs.
//!
//! The [`Bdd`] manager owns the unique table (through its garbage
//! collector), the per-operator compute tables, the module map, and the
//! id counter. All algorithms are manager methods; construction happens
//! once, eagerly, in [`Bdd::new`].
//!
//! The low/else edge is chosen to carry the complement attribute, and
//! there is only one terminal vertex of value 1/True. The root function
//! keeps its own complement bit outside the graph.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::cache::ComputeTable;
use crate::gc::GarbageCollector;
use crate::graph::{BooleanGraph, GatePtr, Operator, VariablePtr};
use crate::vertex::{Function, Ite, Vertex, VertexPtr, TERMINAL_ID};

/// Analysis settings of BDD construction.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Build separate sub-BDDs for module gates. When off, module gates
    /// are inlined into the parent graph like ordinary gates.
    pub modular: bool,
    /// Pre-allocated compute-table capacity (`2^cache_bits` entries).
    pub cache_bits: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            modular: true,
            cache_bits: 14,
        }
    }
}

/// Analysis of preprocessed Boolean graphs with Binary Decision Diagrams.
///
/// The graph is Reduced and Ordered with attributed edges, so functions
/// are canonical: equivalent formulas over the same variable ordering
/// construct the same root [`Function`], vertex id and complement bit
/// included. Given identical input, the same sequence of vertex ids is
/// produced.
pub struct Bdd {
    root: Function,
    gc: Rc<GarbageCollector>,
    /// Table of processed AND computations.
    and_table: ComputeTable<Function>,
    /// Table of processed OR computations.
    or_table: ComputeTable<Function>,
    modules: HashMap<i32, Function>,
    index_to_order: HashMap<i32, i32>,
    one: VertexPtr,
    /// Identification assignment for new function graphs.
    function_id: i64,
    settings: Settings,
}

impl Bdd {
    /// Produces a Reduced Ordered BDD from a preprocessed Boolean graph.
    ///
    /// The graph must already carry the variable ordering and module
    /// tagging. Construction is eager and happens exactly once per
    /// instance; it may take considerable time for large graphs.
    ///
    /// # Panics
    ///
    /// Panics on precondition violations in the input graph (missing
    /// ordering, unresolved arguments, non-binary XOR, vote numbers out
    /// of range). These indicate bugs in the preprocessing collaborator.
    pub fn new(fault_tree: &BooleanGraph, settings: &Settings) -> Self {
        let one: VertexPtr = Rc::new(Vertex::Terminal);
        let mut bdd = Self {
            root: Function::new(false, one.clone()),
            gc: Rc::new(GarbageCollector::new()),
            and_table: ComputeTable::new(settings.cache_bits),
            or_table: ComputeTable::new(settings.cache_bits),
            modules: HashMap::new(),
            index_to_order: HashMap::new(),
            one,
            function_id: TERMINAL_ID + 1,
            settings: settings.clone(),
        };

        for variable in fault_tree.variables() {
            bdd.index_to_order.insert(variable.index(), variable.order());
        }

        let mut gates_visited = HashMap::new();
        let root = bdd.if_then_else(fault_tree.root(), &mut gates_visited);
        bdd.root = if fault_tree.complement_root() {
            root.complemented()
        } else {
            root
        };
        drop(gates_visited);

        debug!(
            "constructed BDD: {} ITE nodes, {} unique-table entries",
            bdd.count_ite_nodes(),
            bdd.unique_table_size()
        );
        debug!(
            "AND table: {} hits / {} misses; OR table: {} hits / {} misses",
            bdd.and_table.hits(),
            bdd.and_table.misses(),
            bdd.or_table.hits(),
            bdd.or_table.misses()
        );
        bdd.clear_tables();
        bdd.test_structure();
        bdd
    }

    /// The root function of the ROBDD.
    pub fn root(&self) -> &Function {
        &self.root
    }

    /// Mapping of module indices to the roots of their sub-BDDs.
    pub fn modules(&self) -> &HashMap<i32, Function> {
        &self.modules
    }

    /// Mapping of variable indices to their orders.
    ///
    /// Module proxy variables are included.
    pub fn index_to_order(&self) -> &HashMap<i32, i32> {
        &self.index_to_order
    }

    /// The number of live entries in the unique table.
    pub fn unique_table_size(&self) -> usize {
        self.gc.unique_table_size()
    }

    /// Counts if-then-else vertices reachable from the root, descending
    /// into module sub-BDDs. Marks are left clear.
    pub fn count_ite_nodes(&self) -> usize {
        let count = self.count_vertex_nodes(&self.root.vertex);
        self.clear_marks(false);
        count
    }

    /// Helper function to clear and set vertex marks.
    ///
    /// Marks propagate to modules as well.
    ///
    /// If the graph is discontinuously and partially marked,
    /// this function will not help with the mess.
    pub fn clear_marks(&self, mark: bool) {
        self.clear_vertex_marks(&self.root.vertex, mark);
    }

    /// Checks the BDD graphs for errors in the structure.
    ///
    /// Errors are assertions that fail at runtime; in release builds the
    /// check is a no-op.
    pub fn test_structure(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        self.test_vertex_structure(&self.root.vertex);
        self.clear_marks(false);
    }

    /// Evaluates a function under an assignment of the basic events.
    ///
    /// Module proxy variables are resolved through the module map.
    ///
    /// # Panics
    ///
    /// Panics if the assignment misses a variable of the graph.
    pub fn evaluate(&self, function: &Function, assignment: &HashMap<i32, bool>) -> bool {
        let value = match function.vertex.as_ite() {
            None => true,
            Some(ite) => {
                let decision = if ite.module() {
                    let module = self
                        .modules
                        .get(&ite.index())
                        .expect("Module function is not registered");
                    self.evaluate(module, assignment)
                } else {
                    *assignment
                        .get(&ite.index())
                        .unwrap_or_else(|| panic!("Missing assignment for variable {}", ite.index()))
                };
                if decision {
                    self.evaluate(&Function::new(false, ite.high().clone()), assignment)
                } else {
                    self.evaluate(
                        &Function::new(ite.complement_edge(), ite.low().clone()),
                        assignment,
                    )
                }
            }
        };
        value != function.complement
    }

    /// Renders a function as a nested `id:(x, high, low)` string.
    ///
    /// Complemented functions carry a `~` prefix; module proxy variables
    /// are printed with an `m` prefix instead of `x`.
    pub fn to_bracket_string(&self, function: &Function) -> String {
        match function.vertex.as_ite() {
            None => {
                if function.complement {
                    "(0)".to_string()
                } else {
                    "(1)".to_string()
                }
            }
            Some(ite) => {
                let variable = if ite.module() {
                    format!("m{}", ite.index())
                } else {
                    format!("x{}", ite.index())
                };
                format!(
                    "{}{}:({}, {}, {})",
                    if function.complement { "~" } else { "" },
                    ite.id(),
                    variable,
                    self.to_bracket_string(&Function::new(false, ite.high().clone())),
                    self.to_bracket_string(&Function::new(
                        ite.complement_edge(),
                        ite.low().clone()
                    )),
                )
            }
        }
    }
}

// Construction internals.
impl Bdd {
    /// The constant function of the given value.
    fn constant(&self, value: bool) -> Function {
        Function::new(!value, self.one.clone())
    }

    /// Fetches a unique if-then-else vertex from the hash table;
    /// if the vertex does not exist, a new vertex is created.
    ///
    /// Expired entries in the unique table are garbage collected, so a
    /// fetched vertex is always live.
    fn fetch_unique_table(
        &mut self,
        index: i32,
        high: &VertexPtr,
        low: &VertexPtr,
        complement_edge: bool,
        order: i32,
        module: bool,
    ) -> VertexPtr {
        let low_id = if complement_edge { -low.id() } else { low.id() };
        let key = (index, high.id(), low_id);
        if let Some(existing) = self.gc.fetch(&key) {
            debug_assert_eq!(
                existing.ite().module(),
                module,
                "Module flag mismatch for a shared vertex"
            );
            return existing;
        }
        let id = self.function_id;
        self.function_id += 1;
        debug!(
            "fetch_unique_table: new ite {} = (x{}, {}, {}{})",
            id,
            index,
            high.id(),
            if complement_edge { "~" } else { "" },
            low.id()
        );
        let vertex: VertexPtr = Rc::new(Vertex::Ite(Ite::new(
            index,
            order,
            id,
            high.clone(),
            low.clone(),
            complement_edge,
            module,
            Rc::downgrade(&self.gc),
        )));
        self.gc.store(key, &vertex);
        vertex
    }

    /// Assembles the canonical function `index ? high : low`.
    ///
    /// A vacuous decision returns the child; a complemented high child
    /// pushes the complement out to the function and onto the low edge.
    fn canonical_vertex(
        &mut self,
        index: i32,
        order: i32,
        module: bool,
        high: Function,
        low: Function,
    ) -> Function {
        if high == low {
            return high;
        }
        let mut complement = false;
        let mut high = high;
        let mut low = low;
        if high.complement {
            complement = true;
            high.complement = false;
            low.complement = !low.complement;
        }
        let vertex =
            self.fetch_unique_table(index, &high.vertex, &low.vertex, low.complement, order, module);
        Function::new(complement, vertex)
    }

    fn compute_table(&self, operator: Operator) -> &ComputeTable<Function> {
        match operator {
            Operator::And => &self.and_table,
            Operator::Or => &self.or_table,
            _ => unreachable!("{:?} results are not cached", operator),
        }
    }

    fn compute_table_mut(&mut self, operator: Operator) -> &mut ComputeTable<Function> {
        match operator {
            Operator::And => &mut self.and_table,
            Operator::Or => &mut self.or_table,
            _ => unreachable!("{:?} results are not cached", operator),
        }
    }

    /// Applies a Boolean operation to BDD function graphs.
    ///
    /// The order of arguments does not matter for two variable
    /// operators. The result is canonical.
    pub(crate) fn apply(
        &mut self,
        operator: Operator,
        arg_one: &Function,
        arg_two: &Function,
    ) -> Function {
        match operator {
            Operator::And | Operator::Or => {}
            Operator::Nand => return self.apply(Operator::And, arg_one, arg_two).complemented(),
            Operator::Nor => return self.apply(Operator::Or, arg_one, arg_two).complemented(),
            Operator::Xor => {
                // a ^ b == (a & ~b) | (~a & b), routed through the primitives.
                let left = self.apply(Operator::And, arg_one, &arg_two.complemented());
                let right = self.apply(Operator::And, &arg_one.complemented(), arg_two);
                return self.apply(Operator::Or, &left, &right);
            }
            Operator::Not | Operator::Null | Operator::Atleast => {
                unreachable!("{:?} is not a binary Boolean operator", operator)
            }
        }

        if let Some(value) = arg_one.as_constant() {
            return self.apply_constant(operator, value, arg_two);
        }
        if let Some(value) = arg_two.as_constant() {
            return self.apply_constant(operator, value, arg_one);
        }

        if arg_one.vertex.id() == arg_two.vertex.id() {
            // x op x  and  x op ~x
            return if arg_one.complement == arg_two.complement {
                arg_one.clone()
            } else {
                self.constant(matches!(operator, Operator::Or))
            };
        }

        if let Some(result) = self
            .compute_table(operator)
            .get(arg_one.signed_id(), arg_two.signed_id())
        {
            debug!(
                "apply: cache {:?}({:?}, {:?}) -> {:?}",
                operator, arg_one, arg_two, result
            );
            return result;
        }

        let (top, bottom) = Self::order_args(arg_one, arg_two);
        let (high, low) = self.apply_ites(operator, top, bottom);
        let (index, order, module) = {
            let ite = top.vertex.ite();
            (ite.index(), ite.order(), ite.module())
        };
        let result = self.canonical_vertex(index, order, module, high, low);
        debug!(
            "apply: computed {:?}({:?}, {:?}) -> {:?}",
            operator, arg_one, arg_two, result
        );
        self.compute_table_mut(operator)
            .insert(arg_one.signed_id(), arg_two.signed_id(), result.clone());
        result
    }

    /// Applies the logic of a Boolean operator to a constant argument.
    fn apply_constant(&self, operator: Operator, value: bool, other: &Function) -> Function {
        match operator {
            // x & 1 = x, x & 0 = 0
            Operator::And => {
                if value {
                    other.clone()
                } else {
                    self.constant(false)
                }
            }
            // x | 0 = x, x | 1 = 1
            Operator::Or => {
                if value {
                    self.constant(true)
                } else {
                    other.clone()
                }
            }
            _ => unreachable!("{:?} is not a primitive operator", operator),
        }
    }

    /// Orders Apply arguments by `(order, id)` for deterministic
    /// expansion and compute-table reuse.
    fn order_args<'a>(one: &'a Function, two: &'a Function) -> (&'a Function, &'a Function) {
        let ite_one = one.vertex.ite();
        let ite_two = two.vertex.ite();
        if (ite_one.order(), ite_one.id()) <= (ite_two.order(), ite_two.id()) {
            (one, two)
        } else {
            (two, one)
        }
    }

    /// Applies a Boolean operation to non-terminal vertices and returns
    /// the high and low branch functions of the result.
    ///
    /// The first argument must hold the top (smallest-order) vertex.
    /// When the orders tie, both operands are expanded; otherwise only
    /// the top one. The low branch inherits the operand's complement
    /// XORed with its attributed edge.
    fn apply_ites(
        &mut self,
        operator: Operator,
        arg_one: &Function,
        arg_two: &Function,
    ) -> (Function, Function) {
        let ite_one = arg_one.vertex.ite();
        let ite_two = arg_two.vertex.ite();
        debug_assert!(
            ite_one.order() <= ite_two.order(),
            "Argument vertices must be ordered"
        );
        let one_high = Function::new(arg_one.complement, ite_one.high().clone());
        let one_low = Function::new(
            arg_one.complement ^ ite_one.complement_edge(),
            ite_one.low().clone(),
        );
        if ite_one.order() == ite_two.order() {
            let two_high = Function::new(arg_two.complement, ite_two.high().clone());
            let two_low = Function::new(
                arg_two.complement ^ ite_two.complement_edge(),
                ite_two.low().clone(),
            );
            let high = self.apply(operator, &one_high, &two_high);
            let low = self.apply(operator, &one_low, &two_low);
            (high, low)
        } else {
            let high = self.apply(operator, &one_high, arg_two);
            let low = self.apply(operator, &one_low, arg_two);
            (high, low)
        }
    }

    /// Converts a gate of the Boolean graph into a BDD function graph.
    /// Processed gates are registered in `gates_visited`.
    fn if_then_else(
        &mut self,
        gate: &GatePtr,
        gates_visited: &mut HashMap<i32, Function>,
    ) -> Function {
        if let Some(result) = gates_visited.get(&gate.index()) {
            return result.clone();
        }
        debug!(
            "if_then_else: converting gate {} ({:?})",
            gate.index(),
            gate.operator()
        );
        let args = self.gate_arguments(gate, gates_visited);
        let result = match gate.operator() {
            Operator::And | Operator::Nand => {
                let mut result = self.constant(true);
                for arg in &args {
                    result = self.apply(Operator::And, &result, arg);
                }
                if matches!(gate.operator(), Operator::Nand) {
                    result.complemented()
                } else {
                    result
                }
            }
            Operator::Or | Operator::Nor => {
                let mut result = self.constant(false);
                for arg in &args {
                    result = self.apply(Operator::Or, &result, arg);
                }
                if matches!(gate.operator(), Operator::Nor) {
                    result.complemented()
                } else {
                    result
                }
            }
            Operator::Xor => {
                assert_eq!(args.len(), 2, "XOR gates must be binary in the preprocessed graph");
                self.apply(Operator::Xor, &args[0], &args[1])
            }
            Operator::Not => {
                assert_eq!(args.len(), 1, "NOT gates take a single argument");
                args[0].complemented()
            }
            Operator::Null => {
                assert_eq!(args.len(), 1, "NULL gates take a single argument");
                args[0].clone()
            }
            Operator::Atleast => {
                let vote_number = gate.vote_number();
                assert!(
                    (vote_number as usize) <= args.len(),
                    "The vote number exceeds the number of arguments"
                );
                let mut memo = HashMap::new();
                self.atleast(vote_number, 0, &args, &mut memo)
            }
        };
        gates_visited.insert(gate.index(), result.clone());
        result
    }

    /// Resolves gate arguments into functions, in argument order.
    ///
    /// Negative argument indices flip the function complement.
    fn gate_arguments(
        &mut self,
        gate: &GatePtr,
        gates_visited: &mut HashMap<i32, Function>,
    ) -> Vec<Function> {
        let mut args = Vec::with_capacity(gate.args().len());
        for &literal in gate.args() {
            let index = literal.abs();
            let function = if let Some(variable) = gate.variable_args().get(&index) {
                let variable = variable.clone();
                self.basic_event(&variable)
            } else {
                let child = gate
                    .gate_args()
                    .get(&index)
                    .unwrap_or_else(|| {
                        panic!("Gate {} has an unresolved argument {}", gate.index(), index)
                    })
                    .clone();
                if self.settings.modular && child.module() {
                    self.module_event(&child, gates_visited)
                } else {
                    self.if_then_else(&child, gates_visited)
                }
            };
            args.push(if literal < 0 {
                function.complemented()
            } else {
                function
            });
        }
        args
    }

    /// The canonical literal of a basic event: `index ? 1 : 0`.
    fn basic_event(&mut self, variable: &VariablePtr) -> Function {
        let order = *self
            .index_to_order
            .get(&variable.index())
            .expect("Variable ordering is missing");
        let one = self.constant(true);
        let zero = self.constant(false);
        self.canonical_vertex(variable.index(), order, false, one, zero)
    }

    /// The proxy literal of a module gate.
    ///
    /// The module's sub-BDD is built on first encounter and registered
    /// in the module map under the gate's own index.
    fn module_event(
        &mut self,
        gate: &GatePtr,
        gates_visited: &mut HashMap<i32, Function>,
    ) -> Function {
        let index = gate.index();
        assert!(gate.order() > 0, "Module gate {} has no ordering", index);
        if !self.modules.contains_key(&index) {
            debug!("module_event: building the sub-BDD of module {}", index);
            let module = self.if_then_else(gate, gates_visited);
            self.index_to_order.insert(index, gate.order());
            self.modules.insert(index, module);
        }
        let one = self.constant(true);
        let zero = self.constant(false);
        self.canonical_vertex(index, gate.order(), true, one, zero)
    }

    /// Shannon-style expansion of an ATLEAST (K/N) gate over the
    /// argument suffix starting at `start`:
    ///
    /// ```text
    /// atleast(k, [x, rest..]) = (x & atleast(k-1, rest)) | (~x & atleast(k, rest))
    /// ```
    ///
    /// Memoised per `(k, start)` to keep the shared tails linear.
    fn atleast(
        &mut self,
        vote_number: i32,
        start: usize,
        args: &[Function],
        memo: &mut HashMap<(i32, usize), Function>,
    ) -> Function {
        if vote_number <= 0 {
            return self.constant(true);
        }
        if vote_number as usize > args.len() - start {
            return self.constant(false);
        }
        if let Some(result) = memo.get(&(vote_number, start)) {
            return result.clone();
        }
        let event = args[start].clone();
        let taken = self.atleast(vote_number - 1, start + 1, args, memo);
        let skipped = self.atleast(vote_number, start + 1, args, memo);
        let high = self.apply(Operator::And, &event, &taken);
        let low = self.apply(Operator::And, &event.complemented(), &skipped);
        let result = self.apply(Operator::Or, &high, &low);
        memo.insert((vote_number, start), result.clone());
        result
    }

    /// Frees the compute tables.
    ///
    /// Intermediate results kept alive only by the tables are garbage
    /// collected in the process.
    pub(crate) fn clear_tables(&mut self) {
        debug!(
            "clearing compute tables ({} AND, {} OR entries)",
            self.and_table.len(),
            self.or_table.len()
        );
        self.and_table.clear();
        self.or_table.clear();
    }

    fn clear_vertex_marks(&self, vertex: &VertexPtr, mark: bool) {
        if let Some(ite) = vertex.as_ite() {
            if ite.mark() == mark {
                return;
            }
            ite.set_mark(mark);
            if ite.module() {
                let module = self
                    .modules
                    .get(&ite.index())
                    .expect("Module function is not registered");
                self.clear_vertex_marks(&module.vertex, mark);
            }
            self.clear_vertex_marks(ite.high(), mark);
            self.clear_vertex_marks(ite.low(), mark);
        }
    }

    fn count_vertex_nodes(&self, vertex: &VertexPtr) -> usize {
        match vertex.as_ite() {
            None => 0,
            Some(ite) => {
                if ite.mark() {
                    return 0;
                }
                ite.set_mark(true);
                let mut count = 1;
                if ite.module() {
                    let module = self
                        .modules
                        .get(&ite.index())
                        .expect("Module function is not registered");
                    count += self.count_vertex_nodes(&module.vertex);
                }
                count
                    + self.count_vertex_nodes(ite.high())
                    + self.count_vertex_nodes(ite.low())
            }
        }
    }

    fn test_vertex_structure(&self, vertex: &VertexPtr) {
        if let Some(ite) = vertex.as_ite() {
            if ite.mark() {
                return;
            }
            ite.set_mark(true);
            assert!(ite.id() > TERMINAL_ID, "Terminal ids are reserved");
            // The high edge carries no attribute by construction, so the
            // reduction check only excludes equal children over a
            // non-complemented low edge.
            if !ite.complement_edge() {
                assert_ne!(ite.high().id(), ite.low().id(), "Reduction failed");
            }
            for child in [ite.high(), ite.low()] {
                if let Some(child_ite) = child.as_ite() {
                    assert!(
                        child_ite.order() > ite.order(),
                        "Ordering of vertices failed"
                    );
                }
            }
            let resolved = self.gc.fetch(&ite.key());
            assert!(
                resolved.map_or(false, |existing| Rc::ptr_eq(&existing, vertex)),
                "The vertex does not resolve through the unique table"
            );
            if ite.module() {
                let module = self
                    .modules
                    .get(&ite.index())
                    .expect("Module function is not registered");
                self.test_vertex_structure(&module.vertex);
            }
            self.test_vertex_structure(ite.high());
            self.test_vertex_structure(ite.low());
        }
    }
}

impl Drop for Bdd {
    fn drop(&mut self) {
        // The whole graph is being dismantled; per-vertex upkeep of the
        // unique table would be redundant work.
        self.gc.disable();
    }
}
