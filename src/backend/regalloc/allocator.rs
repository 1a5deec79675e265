//! Graph-coloring register allocation.
//!
//! # Algorithm
//!
//! Chaitin-style k-coloring, k being the size of the general-purpose pool:
//!
//! 1. Build the interference graph: at every instruction, each pair of
//!    locations within `kill ∪ out` interferes.
//! 2. Simplify: repeatedly remove a node of degree < k and push it on a
//!    stack; when none exists, spill the highest-degree node (it stays
//!    memory-resident) and continue.
//! 3. Select: pop the stack, giving each node the smallest color not used
//!    by an already-colored neighbor.
//!
//! Color 0 is reserved for "no register"; color c > 0 maps to
//! `Reg::ALLOCATABLE[c - 1]`. Node iteration is ordered by location id so
//! allocation is deterministic.

use crate::backend::dataflow::Liveness;
use crate::backend::regalloc::graph::InterferenceGraph;
use crate::backend::regalloc::regs::Reg;
use crate::backend::tac::{Instruction, Loc, LocationTable};
use std::collections::{HashMap, HashSet};

/// Build the interference graph and the variable universe for one function
/// range `[begin, end)`.
pub fn build_interference(
    instrs: &[Instruction],
    liveness: &Liveness,
    begin: usize,
    end: usize,
) -> (InterferenceGraph, Vec<Loc>) {
    let mut graph = InterferenceGraph::new();
    let mut universe: HashSet<Loc> = HashSet::new();

    for index in begin..end {
        let instr = &instrs[index];
        let kill = instr.kill();
        let gen = instr.gen();

        let mut interf: HashSet<Loc> = kill.iter().copied().collect();
        interf.extend(liveness.live_out(index).iter().copied());

        let interf: Vec<Loc> = interf.into_iter().collect();
        for &a in &interf {
            for &b in &interf {
                graph.add_edge(a, b);
            }
        }

        universe.extend(kill);
        universe.extend(gen);
    }

    let mut universe: Vec<Loc> = universe.into_iter().collect();
    universe.sort();
    (graph, universe)
}

/// Color the graph with k colors; uncolorable nodes are left at color 0.
fn k_color(graph: &InterferenceGraph, k: usize) -> HashMap<Loc, usize> {
    let nodes = graph.nodes_sorted();
    let mut degree: HashMap<Loc, usize> =
        nodes.iter().map(|&node| (node, graph.degree(node))).collect();
    let mut removed: HashSet<Loc> = HashSet::new();
    let mut stack: Vec<Loc> = Vec::new();
    let mut spilled: HashSet<Loc> = HashSet::new();

    while removed.len() < nodes.len() {
        // Prefer a node the pool can always absorb
        let candidate = nodes
            .iter()
            .copied()
            .filter(|node| !removed.contains(node))
            .find(|node| degree[node] < k);

        let (node, is_spill) = match candidate {
            Some(node) => (node, false),
            None => {
                // Pool exhausted everywhere: give up on the most
                // constrained node and keep it in memory
                let node = nodes
                    .iter()
                    .copied()
                    .filter(|node| !removed.contains(node))
                    .max_by_key(|node| degree[node])
                    .expect("no node left to spill");
                (node, true)
            }
        };

        removed.insert(node);
        if is_spill {
            spilled.insert(node);
        } else {
            stack.push(node);
        }
        for neighbor in graph.neighbors(node) {
            if !removed.contains(&neighbor) {
                if let Some(deg) = degree.get_mut(&neighbor) {
                    *deg = deg.saturating_sub(1);
                }
            }
        }
    }

    let mut colors: HashMap<Loc, usize> = HashMap::new();
    while let Some(node) = stack.pop() {
        let used: HashSet<usize> = graph
            .neighbors(node)
            .filter_map(|neighbor| colors.get(&neighbor).copied())
            .collect();
        let color = (1..=k)
            .find(|color| !used.contains(color))
            .expect("simplify pushed a node with no free color");
        colors.insert(node, color);
    }
    for node in spilled {
        colors.insert(node, 0);
    }
    colors
}

/// Allocate registers for one function range and record the assignments in
/// the location table. Locations left uncolored stay memory-resident.
pub fn allocate_function(
    instrs: &[Instruction],
    locs: &mut LocationTable,
    liveness: &Liveness,
    begin: usize,
    end: usize,
) {
    let (graph, universe) = build_interference(instrs, liveness, begin, end);
    let colors = k_color(&graph, Reg::NUM_GENERAL_PURPOSE);

    for loc in universe {
        if let Some(&color) = colors.get(&loc) {
            if color > 0 {
                locs.get_mut(loc).reg = Some(Reg::ALLOCATABLE[color - 1]);
            }
        }
    }
}
