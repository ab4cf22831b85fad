//! Randomised fault trees checked against direct formula evaluation.
//!
//! Every generated graph is small enough to enumerate all assignments,
//! so the constructed BDD is compared with the gate semantics on the
//! full truth table. Seeds are fixed; failures reproduce.

use std::collections::HashMap;
use std::rc::Rc;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use fta_bdd::bdd::{Bdd, Settings};
use fta_bdd::graph::{BooleanGraph, Gate, GatePtr, Operator, Variable, VariablePtr};

struct RandomTree {
    variables: Vec<VariablePtr>,
    root: GatePtr,
}

fn random_tree(rng: &mut ChaCha8Rng) -> RandomTree {
    let num_vars = rng.gen_range(3..=7);
    let variables: Vec<VariablePtr> = (1..=num_vars)
        .map(|i| Rc::new(Variable::new(i, i)))
        .collect();

    let num_gates = rng.gen_range(2..=8);
    let mut gates: Vec<GatePtr> = Vec::new();

    for gate_number in 0..num_gates {
        let index = num_vars + 1 + gate_number;
        let last = gate_number + 1 == num_gates;

        // Candidate arguments: every variable and every earlier gate.
        let mut candidates: Vec<i32> = (1..=num_vars).collect();
        candidates.extend(gates.iter().map(|g| g.index()));

        let operator = *[
            Operator::And,
            Operator::Or,
            Operator::Nand,
            Operator::Nor,
            Operator::Xor,
            Operator::Not,
            Operator::Null,
            Operator::Atleast,
        ]
        .choose(rng)
        .unwrap();
        let num_args = match operator {
            Operator::Not | Operator::Null => 1,
            Operator::Xor => 2,
            Operator::Atleast => rng.gen_range(3..=4.min(candidates.len())),
            _ => rng.gen_range(2..=3.min(candidates.len())),
        };

        let mut gate = Gate::new(index, operator);
        if matches!(operator, Operator::Atleast) {
            gate.set_vote_number(rng.gen_range(2..=num_args as i32));
        }
        for &arg in candidates.choose_multiple(rng, num_args) {
            let literal = if rng.gen_bool(0.3) { -arg } else { arg };
            if arg <= num_vars {
                gate.add_variable(literal, &variables[(arg - 1) as usize]);
            } else {
                let child = gates.iter().find(|g| g.index() == arg).unwrap();
                let child = child.clone();
                gate.add_gate(literal, &child);
            }
        }
        if !last && rng.gen_bool(0.25) {
            gate.set_module(true);
            gate.set_order(index);
        }
        gates.push(Rc::new(gate));
    }

    RandomTree {
        variables,
        root: gates.last().unwrap().clone(),
    }
}

/// Direct evaluation of the gate formula, the reference semantics.
fn eval_gate(gate: &GatePtr, assignment: &HashMap<i32, bool>) -> bool {
    let values: Vec<bool> = gate
        .args()
        .iter()
        .map(|&literal| {
            let index = literal.abs();
            let value = if let Some(variable) = gate.variable_args().get(&index) {
                assignment[&variable.index()]
            } else {
                eval_gate(&gate.gate_args()[&index], assignment)
            };
            value != (literal < 0)
        })
        .collect();
    match gate.operator() {
        Operator::And => values.iter().all(|&v| v),
        Operator::Or => values.iter().any(|&v| v),
        Operator::Nand => !values.iter().all(|&v| v),
        Operator::Nor => !values.iter().any(|&v| v),
        Operator::Xor => values[0] != values[1],
        Operator::Not => !values[0],
        Operator::Null => values[0],
        Operator::Atleast => {
            values.iter().filter(|&&v| v).count() >= gate.vote_number() as usize
        }
    }
}

fn full_truth_table_check(tree: &RandomTree, bdd: &Bdd, seed: u64) {
    let num_vars = tree.variables.len() as i32;
    for bits in 0..(1u32 << num_vars) {
        let assignment: HashMap<i32, bool> = (1..=num_vars)
            .map(|i| (i, bits & (1u32 << (i - 1)) != 0))
            .collect();
        assert_eq!(
            bdd.evaluate(bdd.root(), &assignment),
            eval_gate(&tree.root, &assignment),
            "truth table mismatch for seed {} under bits {:b}",
            seed,
            bits
        );
    }
}

#[test]
fn random_trees_match_formula_semantics() {
    for seed in 0..32 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree = random_tree(&mut rng);
        let bdd = Bdd::new(&BooleanGraph::new(tree.root.clone()), &Settings::default());
        bdd.test_structure();
        full_truth_table_check(&tree, &bdd, seed);
        // Every reachable vertex is live in the unique table.
        assert!(bdd.count_ite_nodes() <= bdd.unique_table_size());
    }
}

#[test]
fn random_trees_are_deterministic() {
    for seed in 0..16 {
        let build = || {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tree = random_tree(&mut rng);
            Bdd::new(&BooleanGraph::new(tree.root), &Settings::default())
        };
        let one = build();
        let other = build();
        assert_eq!(one.root().vertex.id(), other.root().vertex.id());
        assert_eq!(one.root().complement, other.root().complement);
        assert_eq!(
            one.to_bracket_string(one.root()),
            other.to_bracket_string(other.root())
        );
        assert_eq!(one.count_ite_nodes(), other.count_ite_nodes());
    }
}

#[test]
fn modular_and_inlined_constructions_agree() {
    for seed in 32..48 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree = random_tree(&mut rng);
        let graph = BooleanGraph::new(tree.root.clone());
        let modular = Bdd::new(&graph, &Settings::default());
        let inlined = Bdd::new(
            &graph,
            &Settings {
                modular: false,
                ..Settings::default()
            },
        );
        assert!(inlined.modules().is_empty());

        let num_vars = tree.variables.len() as i32;
        for bits in 0..(1u32 << num_vars) {
            let assignment: HashMap<i32, bool> = (1..=num_vars)
                .map(|i| (i, bits & (1u32 << (i - 1)) != 0))
                .collect();
            assert_eq!(
                modular.evaluate(modular.root(), &assignment),
                inlined.evaluate(inlined.root(), &assignment),
                "modular/inlined mismatch for seed {} under bits {:b}",
                seed,
                bits
            );
        }
    }
}
