//! Shared trees and automata for unit tests.

use fita_core::{Alphabet, Side, Tree, TreeBuilder, Variable, VariableId, VertexId};

use crate::acceptance::{AcceptingCondition, Requirement};
use crate::automaton::Automaton;
use crate::transition::Determinism;

/// The only variable of the fixture automata: domain {A, B, C}, init A.
pub const COLOR: VariableId = VariableId(1);

pub fn color() -> Variable {
    Variable::new(COLOR, "A", ["A", "B", "C"]).expect("valid variable")
}

pub fn binary_alphabet() -> Alphabet {
    Alphabet::new(["0", "1"])
}

/// `r(a(c, d), b)` labelled `0(1(1, 0), 0)`; ids in the order `[r, a, b, c, d]`.
pub fn sample_tree() -> (Tree, [VertexId; 5]) {
    let mut b = TreeBuilder::new();
    let r = b.root_node("0").unwrap();
    let a = b.add_node(r, Side::Left, "1").unwrap();
    let bb = b.add_node(r, Side::Right, "0").unwrap();
    let c = b.add_node(a, Side::Left, "1").unwrap();
    let d = b.add_node(a, Side::Right, "0").unwrap();
    (b.build().unwrap(), [r, a, bb, c, d])
}

/// `r(a(b(c, #), #), d)`, every label `0`; ids in the order `[r, a, b, c, d]`.
pub fn unbalanced_tree() -> (Tree, [VertexId; 5]) {
    let mut b = TreeBuilder::new();
    let r = b.root_node("0").unwrap();
    let a = b.add_node(r, Side::Left, "0").unwrap();
    let bb = b.add_node(a, Side::Left, "0").unwrap();
    let c = b.add_node(bb, Side::Left, "0").unwrap();
    let d = b.add_node(r, Side::Right, "0").unwrap();
    (b.build().unwrap(), [r, a, bb, c, d])
}

/// Vertices of [`loop_tree`].
#[derive(Debug, Clone, Copy)]
pub struct LoopIds {
    pub root: VertexId,
    pub anchor: VertexId,
    pub six: VertexId,
    pub seven: VertexId,
    pub rec: VertexId,
    pub nine: VertexId,
}

/// `0(1(0, 1), R:0(1, 0(@R, 1)))`: the right subtree repeats forever
/// through the left child of `seven`.
pub fn loop_tree() -> (Tree, LoopIds) {
    let mut b = TreeBuilder::new();
    let root = b.root_node("0").unwrap();
    let two = b.add_node(root, Side::Left, "1").unwrap();
    b.add_node(two, Side::Left, "0").unwrap();
    b.add_node(two, Side::Right, "1").unwrap();
    let anchor = b.add_repeat(root, Side::Right, "0").unwrap();
    let six = b.add_node(anchor, Side::Left, "1").unwrap();
    let seven = b.add_node(anchor, Side::Right, "0").unwrap();
    let rec = b.add_back_reference(seven, Side::Left, anchor).unwrap();
    let nine = b.add_node(seven, Side::Right, "1").unwrap();

    let ids = LoopIds {
        root,
        anchor,
        six,
        seven,
        rec,
        nine,
    };
    (b.build().unwrap(), ids)
}

fn add_cycle_table(automaton: &mut Automaton) {
    for (value, label, left, right) in [
        ("A", "0", "B", "C"),
        ("A", "1", "A", "A"),
        ("B", "0", "C", "A"),
        ("B", "1", "B", "B"),
        ("C", "0", "A", "B"),
        ("C", "1", "C", "C"),
    ] {
        automaton
            .add_top_down_transition(COLOR, value, label, left, right)
            .unwrap();
    }
}

/// Top-down DFTA cycling A -> B -> C on label 0 and copying on label 1.
/// Accepts when no leaf is C.
pub fn alternating_top_down() -> Automaton {
    let mut automaton =
        Automaton::top_down(Determinism::Deterministic, [color()], binary_alphabet()).unwrap();
    add_cycle_table(&mut automaton);
    for value in ["A", "B"] {
        automaton
            .add_accepting_condition(AcceptingCondition::new().with(COLOR, Requirement::include(value)))
            .unwrap();
    }
    automaton
}

/// The same table as an infinite automaton, Büchi-accepting when A recurs.
pub fn alternating_infinite() -> Automaton {
    let mut automaton =
        Automaton::top_down_infinite(Determinism::Deterministic, [color()], binary_alphabet())
            .unwrap();
    add_cycle_table(&mut automaton);
    automaton
        .add_buchi_condition(AcceptingCondition::new().with(COLOR, Requirement::include("A")))
        .unwrap();
    automaton
}

/// Bottom-up DFTA: leaves become B, equal children are copied and anything
/// else becomes C. Accepts when the root is B.
pub fn bottom_up_uniform() -> Automaton {
    let mut automaton =
        Automaton::bottom_up(Determinism::Deterministic, [color()], binary_alphabet()).unwrap();
    // Exact keys, so the same-value entry below does not shadow them.
    for label in ["0", "1"] {
        automaton
            .add_bottom_up_transition(COLOR, "A", "A", label, "B")
            .unwrap();
    }
    automaton
        .add_bottom_up_transition(COLOR, "=", "*", "*", "<")
        .unwrap();
    automaton
        .add_bottom_up_transition(COLOR, "*", "*", "*", "C")
        .unwrap();
    automaton
        .add_accepting_condition(AcceptingCondition::new().with(COLOR, Requirement::include("B")))
        .unwrap();
    automaton
}
