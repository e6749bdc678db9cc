//! Compactly described game families.
//!
//! A family is a parameter descriptor plus a generator from descriptor to a
//! DAG on the dense labels `0..n`. A structured game stores the generated
//! DAG relabelled onto its actual (sorted) node ids: dense label `i` is the
//! `i`-th smallest node. A move is answered by updating the descriptor,
//! regenerating, and relabelling onto the surviving ids, which gives the same
//! position as the generic upset/downset play.

use std::collections::BTreeMap;

use updown_poset::{Dag, Node};

use crate::Player;

/// Descriptor of a structured family.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Structure {
    /// Heaps of the given sizes, each a chain `j -> j + 1`.
    Nim(Vec<usize>),
    /// Complete bipartite graphs `(top, bottom)`: `bottom` nodes followed by
    /// `top` nodes, every bottom node below every top node.
    CompleteBipartite(Vec<(usize, usize)>),
}

impl Structure {
    /// Nim heaps, empty heaps dropped.
    pub fn nim(heaps: &[usize]) -> Self {
        Structure::Nim(heaps.iter().copied().filter(|&k| k > 0).collect())
    }

    /// Complete bipartite graphs, empty graphs dropped.
    pub fn complete_bipartite(graphs: &[(usize, usize)]) -> Self {
        Structure::CompleteBipartite(
            graphs
                .iter()
                .copied()
                .filter(|&(m, n)| m + n > 0)
                .collect(),
        )
    }

    /// Total number of nodes described.
    pub fn node_count(&self) -> usize {
        match self {
            Structure::Nim(heaps) => heaps.iter().sum(),
            Structure::CompleteBipartite(graphs) => graphs.iter().map(|(m, n)| m + n).sum(),
        }
    }

    /// The family's DAG on the dense labels `0..node_count()`. Always
    /// transitively reduced.
    pub fn dag(&self) -> Dag {
        let mut adjacency: BTreeMap<Node, Vec<Node>> = BTreeMap::new();
        let mut base = 0;
        match self {
            Structure::Nim(heaps) => {
                for &k in heaps {
                    for j in base..base + k {
                        let next = if j + 1 < base + k { vec![j + 1] } else { Vec::new() };
                        adjacency.insert(j, next);
                    }
                    base += k;
                }
            }
            Structure::CompleteBipartite(graphs) => {
                for &(m, n) in graphs {
                    let tops: Vec<Node> = (base + n..base + n + m).collect();
                    for b in base..base + n {
                        adjacency.insert(b, tops.clone());
                    }
                    for &t in &tops {
                        adjacency.insert(t, Vec::new());
                    }
                    base += m + n;
                }
            }
        }
        Dag::from_adjacency(adjacency).expect("BUG: generated edges stay inside the node range")
    }

    /// The descriptor after `player` plays the node with dense label
    /// `position`. Positions past the end leave the descriptor unchanged.
    pub fn after_play(&self, position: usize, player: Player) -> Self {
        match self {
            Structure::Nim(heaps) => {
                let mut heaps = heaps.clone();
                if let Some((h, offset)) = locate(heaps.iter().copied(), position) {
                    let k = heaps[h];
                    heaps[h] = match player {
                        Player::Up => offset,
                        Player::Down => k - offset - 1,
                    };
                }
                Structure::nim(&heaps)
            }
            Structure::CompleteBipartite(graphs) => {
                let mut graphs = graphs.clone();
                if let Some((g, offset)) = locate(graphs.iter().map(|(m, n)| m + n), position) {
                    let (m, n) = graphs[g];
                    let is_bottom = offset < n;
                    graphs[g] = match (player, is_bottom) {
                        (Player::Up, true) => (0, n - 1),
                        (Player::Up, false) => (m - 1, n),
                        (Player::Down, true) => (m, n - 1),
                        (Player::Down, false) => (m - 1, 0),
                    };
                }
                Structure::complete_bipartite(&graphs)
            }
        }
    }

    /// The descriptor of the negated game. Reversing a chain gives a chain;
    /// reversing a complete bipartite graph swaps its sides.
    pub fn negate(&self) -> Self {
        match self {
            Structure::Nim(heaps) => Structure::Nim(heaps.clone()),
            Structure::CompleteBipartite(graphs) => {
                Structure::CompleteBipartite(graphs.iter().map(|&(m, n)| (n, m)).collect())
            }
        }
    }

    /// Descriptor of the disjoint sum, if both sides are the same family.
    pub fn concat(&self, other: &Structure) -> Option<Self> {
        match (self, other) {
            (Structure::Nim(a), Structure::Nim(b)) => {
                Some(Structure::Nim(a.iter().chain(b).copied().collect()))
            }
            (Structure::CompleteBipartite(a), Structure::CompleteBipartite(b)) => Some(
                Structure::CompleteBipartite(a.iter().chain(b).copied().collect()),
            ),
            _ => None,
        }
    }

    /// XOR of the heap sizes; `None` for other families.
    pub fn nim_sum(&self) -> Option<usize> {
        match self {
            Structure::Nim(heaps) => Some(heaps.iter().fold(0, |acc, &k| acc ^ k)),
            Structure::CompleteBipartite(_) => None,
        }
    }
}

/// `(part index, offset within part)` of a dense position.
fn locate(sizes: impl Iterator<Item = usize>, position: usize) -> Option<(usize, usize)> {
    let mut start = 0;
    for (i, size) in sizes.enumerate() {
        if position < start + size {
            return Some((i, position - start));
        }
        start += size;
    }
    None
}
