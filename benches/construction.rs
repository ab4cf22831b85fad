//! BDD construction benchmarks over representative fault-tree shapes.
//!
//! Run with:
//! ```bash
//! cargo bench --bench construction
//! ```

use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use fta_bdd::bdd::{Bdd, Settings};
use fta_bdd::graph::{BooleanGraph, Gate, Operator, Variable, VariablePtr};

fn variables(n: i32) -> Vec<VariablePtr> {
    (1..=n).map(|i| Rc::new(Variable::new(i, i))).collect()
}

/// ATLEAST(n/2, [x1..xn]), the classic K/N lattice.
fn atleast_tree(n: i32) -> BooleanGraph {
    let vars = variables(n);
    let mut top = Gate::new(n + 1, Operator::Atleast);
    top.set_vote_number(n / 2);
    for variable in &vars {
        top.add_variable(variable.index(), variable);
    }
    BooleanGraph::new(Rc::new(top))
}

/// AND over `m` module gates, each an OR of two private variables.
fn module_tree(m: i32) -> BooleanGraph {
    let vars = variables(2 * m);
    let mut top = Gate::new(3 * m + 1, Operator::And);
    for i in 0..m {
        let index = 2 * m + 1 + i;
        let mut module = Gate::new(index, Operator::Or);
        module.add_variable(2 * i + 1, &vars[(2 * i) as usize]);
        module.add_variable(2 * i + 2, &vars[(2 * i + 1) as usize]);
        module.set_module(true);
        module.set_order(index);
        top.add_gate(index, &Rc::new(module));
    }
    BooleanGraph::new(Rc::new(top))
}

fn bench_atleast(c: &mut Criterion) {
    let mut group = c.benchmark_group("atleast");
    for n in [8, 12, 16, 20] {
        let graph = atleast_tree(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &graph, |b, graph| {
            b.iter(|| Bdd::new(graph, &Settings::default()));
        });
    }
    group.finish();
}

fn bench_modules(c: &mut Criterion) {
    let mut group = c.benchmark_group("modules");
    for m in [4, 16, 64] {
        let graph = module_tree(m);
        group.bench_with_input(BenchmarkId::from_parameter(m), &graph, |b, graph| {
            b.iter(|| Bdd::new(graph, &Settings::default()));
        });
        let inlined = Settings {
            modular: false,
            ..Settings::default()
        };
        group.bench_with_input(BenchmarkId::new("inlined", m), &graph, |b, graph| {
            b.iter(|| Bdd::new(graph, &inlined));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_atleast, bench_modules);
criterion_main!(benches);
