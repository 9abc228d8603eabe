//! Simple undirected graph keyed by agent id

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Undirected simple graph (no self-loops, no parallel edges).
///
/// Node ids are agent ids; an induced subgraph keeps the original ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommunicationGraph {
    adjacency: BTreeMap<usize, BTreeSet<usize>>,
}

impl CommunicationGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph with nodes `0..n` and no edges
    pub fn with_nodes(n: usize) -> Self {
        Self {
            adjacency: (0..n).map(|node| (node, BTreeSet::new())).collect(),
        }
    }

    /// Add an isolated node (no-op if present)
    pub fn add_node(&mut self, node: usize) {
        self.adjacency.entry(node).or_default();
    }

    /// Add an undirected edge; self-loops are ignored
    pub fn add_edge(&mut self, a: usize, b: usize) {
        if a == b {
            self.add_node(a);
            return;
        }
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Remove an undirected edge if present
    pub fn remove_edge(&mut self, a: usize, b: usize) {
        if let Some(adj) = self.adjacency.get_mut(&a) {
            adj.remove(&b);
        }
        if let Some(adj) = self.adjacency.get_mut(&b) {
            adj.remove(&a);
        }
    }

    /// Whether `a` and `b` are adjacent
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency.get(&a).map_or(false, |adj| adj.contains(&b))
    }

    /// Whether the node exists
    pub fn contains(&self, node: usize) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Neighbors of `node` in ascending id order; empty for unknown nodes
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(&node).into_iter().flatten().copied()
    }

    /// Number of neighbors
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency.get(&node).map_or(0, BTreeSet::len)
    }

    /// Node ids in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Induced subgraph on `nodes`; ids not in the graph are skipped
    pub fn subgraph(&self, nodes: &[usize]) -> Self {
        let keep: BTreeSet<usize> = nodes.iter().copied().filter(|n| self.contains(*n)).collect();
        let adjacency = keep
            .iter()
            .map(|&node| {
                let adj = self
                    .neighbors(node)
                    .filter(|other| keep.contains(other))
                    .collect();
                (node, adj)
            })
            .collect();
        Self { adjacency }
    }
}
