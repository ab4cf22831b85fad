//! Graphviz (DOT) export of BDD graphs.
//!
//! High edges are solid, low edges dashed, and complemented low edges
//! dotted. Module proxy vertices are labelled `m<index>` and drawn with
//! a double circle, and every module sub-BDD is rendered into the same
//! digraph (vertex ids are unique across all of them).

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use crate::bdd::Bdd;
use crate::vertex::{Function, VertexPtr};

impl Bdd {
    /// Renders the whole BDD, modules included, as a DOT graph.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph bdd {{")?;
        writeln!(dot, "node [shape=circle, fixedsize=true];")?;

        // Terminals
        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "t1 [shape=square, label=\"1\"];")?;
        writeln!(dot, "t0 [shape=square, label=\"0\"];")?;
        writeln!(dot, "}}")?;

        let mut visited = HashSet::new();
        let mut levels = BTreeMap::<i32, Vec<(i64, String, bool)>>::new();
        let mut edges = String::new();

        self.collect_vertices(&self.root().vertex, &mut visited, &mut levels, &mut edges)?;
        for module in self.modules().values() {
            self.collect_vertices(&module.vertex, &mut visited, &mut levels, &mut edges)?;
        }

        // Vertices per order level; module proxies get a double circle.
        for level in levels.values() {
            writeln!(dot, "{{ rank=same")?;
            for (id, label, module) in level {
                if *module {
                    writeln!(dot, "{} [label=<{}>, peripheries=2];", id, label)?;
                } else {
                    writeln!(dot, "{} [label=<{}>];", id, label)?;
                }
            }
            writeln!(dot, "}}")?;
        }
        dot.push_str(&edges);

        // Function roots
        writeln!(dot, "root [shape=rect, label=\"root\"];")?;
        write_function_edge(&mut dot, "root", self.root())?;
        for (index, module) in self.modules() {
            let name = format!("module{}", index);
            writeln!(dot, "{} [shape=rect, label=\"m{}\"];", name, index)?;
            write_function_edge(&mut dot, &name, module)?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }

    fn collect_vertices(
        &self,
        vertex: &VertexPtr,
        visited: &mut HashSet<i64>,
        levels: &mut BTreeMap<i32, Vec<(i64, String, bool)>>,
        edges: &mut String,
    ) -> std::fmt::Result {
        let ite = match vertex.as_ite() {
            None => return Ok(()),
            Some(ite) => ite,
        };
        if !visited.insert(ite.id()) {
            return Ok(());
        }
        let label = if ite.module() {
            format!("m<SUB>{}</SUB>", ite.index())
        } else {
            format!("x<SUB>{}</SUB>", ite.index())
        };
        levels
            .entry(ite.order())
            .or_default()
            .push((ite.id(), label, ite.module()));

        let high = ite.high();
        if high.is_terminal() {
            writeln!(edges, "{} -> t1;", ite.id())?;
        } else {
            writeln!(edges, "{} -> {};", ite.id(), high.id())?;
        }

        let low = ite.low();
        match (low.is_terminal(), ite.complement_edge()) {
            (true, false) => writeln!(edges, "{} -> t1 [style=dashed];", ite.id())?,
            (true, true) => writeln!(edges, "{} -> t0 [style=dashed];", ite.id())?,
            (false, false) => writeln!(edges, "{} -> {} [style=dashed];", ite.id(), low.id())?,
            (false, true) => writeln!(edges, "{} -> {} [style=dotted];", ite.id(), low.id())?,
        }

        self.collect_vertices(high, visited, levels, edges)?;
        self.collect_vertices(low, visited, levels, edges)
    }
}

fn write_function_edge(dot: &mut String, from: &str, function: &Function) -> std::fmt::Result {
    if function.vertex.is_terminal() {
        let target = if function.complement { "t0" } else { "t1" };
        writeln!(dot, "{} -> {};", from, target)
    } else if function.complement {
        writeln!(dot, "{} -> {} [style=dotted];", from, function.vertex.id())
    } else {
        writeln!(dot, "{} -> {};", from, function.vertex.id())
    }
}
