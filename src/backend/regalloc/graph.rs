//! Interference graph.
//!
//! Two locations interfere when one is defined at a point where the other
//! is live out. Nodes are [`Loc`] ids; the edge relation is symmetric and
//! irreflexive (self-pairs register the node but add no edge).

use crate::backend::tac::Loc;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct InterferenceGraph {
    /// Adjacency sets, symmetric
    edges: HashMap<Loc, HashSet<Loc>>,
    /// Every location that appeared in some interference set
    nodes: HashSet<Loc>,
}

impl InterferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an undirected edge. A self-pair only registers the node.
    pub fn add_edge(&mut self, a: Loc, b: Loc) {
        self.nodes.insert(a);
        self.nodes.insert(b);
        if a == b {
            return;
        }
        self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
    }

    pub fn contains(&self, node: Loc) -> bool {
        self.nodes.contains(&node)
    }

    /// Nodes in ascending id order, for deterministic iteration.
    pub fn nodes_sorted(&self) -> Vec<Loc> {
        let mut nodes: Vec<Loc> = self.nodes.iter().copied().collect();
        nodes.sort();
        nodes
    }

    pub fn neighbors(&self, node: Loc) -> impl Iterator<Item = Loc> + '_ {
        self.edges
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn degree(&self, node: Loc) -> usize {
        self.edges.get(&node).map_or(0, |set| set.len())
    }

    pub fn has_edge(&self, a: Loc, b: Loc) -> bool {
        self.edges.get(&a).is_some_and(|set| set.contains(&b))
    }
}
