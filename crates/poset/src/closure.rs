//! Transitive closure and reduction, and longest-path levels.

use std::collections::{BTreeMap, BTreeSet};

use crate::dag::{Dag, Node};

/// Which end of a path a longest-path length is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    /// Longest path starting at the node.
    #[default]
    Outgoing,
    /// Longest path ending at the node (its level in the Hasse diagram).
    Incoming,
}

impl Dag {
    /// Map from every node to its full descendant set.
    ///
    /// Computed bottom-up over the finish order, so each node's set is the
    /// union of its successors and their sets. Assumes the graph is acyclic.
    pub fn transitive_closure(&self) -> BTreeMap<Node, BTreeSet<Node>> {
        let mut closure: BTreeMap<Node, BTreeSet<Node>> = BTreeMap::new();
        for v in self.topological_sort(true) {
            let mut reach = BTreeSet::new();
            for &u in self.successors(v) {
                reach.insert(u);
                if let Some(below) = closure.get(&u) {
                    reach.extend(below.iter().copied());
                }
            }
            closure.insert(v, reach);
        }
        closure
    }

    /// The minimal graph with the same reachability relation (the Hasse
    /// diagram of the poset). Assumes the graph is acyclic.
    ///
    /// For each node, start from its direct successors and discard every
    /// successor that is reachable through another successor still kept.
    pub fn transitive_reduction(&self) -> Dag {
        let closure = self.transitive_closure();
        let mut reduced = BTreeMap::new();

        for v in self.nodes() {
            let mut kept: BTreeSet<Node> = self.successors(v).iter().copied().collect();
            for u in self.successors(v) {
                // A successor already discarded had its descendants discarded with it.
                if kept.contains(u) {
                    if let Some(below) = closure.get(u) {
                        kept.retain(|w| !below.contains(w));
                    }
                }
            }
            reduced.insert(v, kept.into_iter().collect());
        }

        Dag::from_adjacency_unchecked(reduced)
    }

    /// Length of the longest path starting (`Outgoing`) or ending
    /// (`Incoming`) at each node, by dynamic programming over the reverse
    /// topological order. Assumes the graph is acyclic.
    pub fn longest_path_lengths(&self, direction: Direction) -> BTreeMap<Node, usize> {
        let reversed;
        let graph = match direction {
            Direction::Outgoing => self,
            Direction::Incoming => {
                reversed = self.reverse();
                &reversed
            }
        };

        let mut lengths: BTreeMap<Node, usize> = BTreeMap::new();
        for v in graph.topological_sort(true) {
            let longest = graph
                .successors(v)
                .iter()
                .filter_map(|u| lengths.get(u))
                .map(|len| len + 1)
                .max()
                .unwrap_or(0);
            lengths.insert(v, longest);
        }
        lengths
    }

    /// Number of edges in the transitive closure.
    pub fn number_of_relations(&self) -> usize {
        self.transitive_closure().values().map(BTreeSet::len).sum()
    }
}
