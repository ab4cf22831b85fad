//! Builds the BDD of a small pump-system fault tree and prints it.
//!
//! The tree: the system fails if the power supply fails, or if both
//! redundant pump trains fail. Each pump train is an independent module
//! of a pump failure and its local valve failure.

use std::rc::Rc;

use fta_bdd::bdd::{Bdd, Settings};
use fta_bdd::graph::{BooleanGraph, Gate, Operator, Variable};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    // Basic events: power, pump A, valve A, pump B, valve B.
    let power = Rc::new(Variable::new(1, 1));
    let pump_a = Rc::new(Variable::new(2, 2));
    let valve_a = Rc::new(Variable::new(3, 3));
    let pump_b = Rc::new(Variable::new(4, 4));
    let valve_b = Rc::new(Variable::new(5, 5));

    // Train A fails: OR(pump A, valve A), an independent module.
    let mut train_a = Gate::new(6, Operator::Or);
    train_a.add_variable(2, &pump_a);
    train_a.add_variable(3, &valve_a);
    train_a.set_module(true);
    train_a.set_order(6);
    let train_a = Rc::new(train_a);

    // Train B fails: OR(pump B, valve B), an independent module.
    let mut train_b = Gate::new(7, Operator::Or);
    train_b.add_variable(4, &pump_b);
    train_b.add_variable(5, &valve_b);
    train_b.set_module(true);
    train_b.set_order(7);
    let train_b = Rc::new(train_b);

    // Both trains fail.
    let mut trains = Gate::new(8, Operator::And);
    trains.add_gate(6, &train_a);
    trains.add_gate(7, &train_b);
    let trains = Rc::new(trains);

    // Top event: power failure or loss of both trains.
    let mut top = Gate::new(9, Operator::Or);
    top.add_variable(1, &power);
    top.add_gate(8, &trains);

    let graph = BooleanGraph::new(Rc::new(top));
    let bdd = Bdd::new(&graph, &Settings::default());

    println!("root = {}", bdd.to_bracket_string(bdd.root()));
    for (index, module) in bdd.modules() {
        println!("module {} = {}", index, bdd.to_bracket_string(module));
    }
    println!("ITE nodes: {}", bdd.count_ite_nodes());
    println!("unique table entries: {}", bdd.unique_table_size());

    // A point check: power on its own fails the system.
    let assignment = [(1, true), (2, false), (3, false), (4, false), (5, false)]
        .into_iter()
        .collect();
    println!("power failure alone fails the system: {}", bdd.evaluate(bdd.root(), &assignment));

    println!("\n{}", bdd.to_dot()?);
    Ok(())
}
