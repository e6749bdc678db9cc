//! Adjacency-map representation of a directed graph.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use updown_core::{Result, UpDownError};

/// A node label. Labels are unique within one graph; dense numbering is
/// conventional but not required.
pub type Node = usize;

/// A directed graph stored as an ordered map from node to its direct successors.
///
/// Invariant: every node, sinks included, is a key, and every successor is
/// itself a key. Successor lists are sorted and free of duplicates.
///
/// Acyclicity is *not* an invariant of the type: it is checked by callers
/// that need it (see [`Dag::is_acyclic`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dag {
    adjacency: BTreeMap<Node, Vec<Node>>,
}

impl Dag {
    /// The graph with no nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an adjacency map.
    ///
    /// # Errors
    /// Returns `UpDownError::InvalidGame` if an edge points at a node that is
    /// not a key of the map.
    pub fn from_adjacency(adjacency: BTreeMap<Node, Vec<Node>>) -> Result<Self> {
        for (v, successors) in &adjacency {
            if let Some(u) = successors.iter().find(|u| !adjacency.contains_key(u)) {
                return Err(UpDownError::InvalidGame(format!(
                    "edge {} -> {} targets a node that is not in the graph",
                    v, u
                )));
            }
        }
        Ok(Self::from_adjacency_unchecked(adjacency))
    }

    /// Build a graph from a node list and an edge list.
    ///
    /// # Errors
    /// Returns `UpDownError::InvalidGame` if an edge endpoint is not listed.
    pub fn from_edges(
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = (Node, Node)>,
    ) -> Result<Self> {
        let mut adjacency: BTreeMap<Node, Vec<Node>> =
            nodes.into_iter().map(|v| (v, Vec::new())).collect();
        for (v, u) in edges {
            if !adjacency.contains_key(&u) {
                return Err(UpDownError::InvalidGame(format!(
                    "edge {} -> {} targets a node that is not in the graph",
                    v, u
                )));
            }
            adjacency
                .get_mut(&v)
                .ok_or_else(|| {
                    UpDownError::InvalidGame(format!(
                        "edge {} -> {} starts at a node that is not in the graph",
                        v, u
                    ))
                })?
                .push(u);
        }
        Ok(Self::from_adjacency_unchecked(adjacency))
    }

    /// `n` nodes labelled `0..n` and no edges.
    pub fn antichain(n: usize) -> Self {
        Self {
            adjacency: (0..n).map(|v| (v, Vec::new())).collect(),
        }
    }

    /// Nodes `start..start + len` linked `v -> v + 1`.
    pub fn chain(start: Node, len: usize) -> Self {
        let end = start + len;
        Self {
            adjacency: (start..end)
                .map(|v| (v, if v + 1 < end { vec![v + 1] } else { Vec::new() }))
                .collect(),
        }
    }

    pub(crate) fn from_adjacency_unchecked(mut adjacency: BTreeMap<Node, Vec<Node>>) -> Self {
        for successors in adjacency.values_mut() {
            successors.sort_unstable();
            successors.dedup();
        }
        Self { adjacency }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains(&self, v: Node) -> bool {
        self.adjacency.contains_key(&v)
    }

    /// Nodes in ascending label order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.adjacency.keys().copied()
    }

    /// The node set, suitable as an order-independent key.
    pub fn node_set(&self) -> BTreeSet<Node> {
        self.adjacency.keys().copied().collect()
    }

    /// Largest label, if any.
    pub fn max_node(&self) -> Option<Node> {
        self.adjacency.keys().next_back().copied()
    }

    /// Direct successors of `v`; empty for sinks and unknown nodes.
    pub fn successors(&self, v: Node) -> &[Node] {
        self.adjacency.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn adjacency(&self) -> &BTreeMap<Node, Vec<Node>> {
        &self.adjacency
    }

    pub fn into_adjacency(self) -> BTreeMap<Node, Vec<Node>> {
        self.adjacency
    }

    pub fn number_of_edges(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// All edges `(u, v)` for `u -> v`, ordered by source then target.
    pub fn edge_list(&self) -> Vec<(Node, Node)> {
        self.adjacency
            .iter()
            .flat_map(|(&v, succ)| succ.iter().map(move |&u| (v, u)))
            .collect()
    }

    pub fn has_edge(&self, v: Node, u: Node) -> bool {
        self.successors(v).binary_search(&u).is_ok()
    }

    /// Nodes with no outgoing edges.
    pub fn sinks(&self) -> Vec<Node> {
        self.adjacency
            .iter()
            .filter(|(_, succ)| succ.is_empty())
            .map(|(&v, _)| v)
            .collect()
    }

    /// Nodes with no incoming edges.
    pub fn sources(&self) -> Vec<Node> {
        let targets: BTreeSet<Node> = self.adjacency.values().flatten().copied().collect();
        self.nodes().filter(|v| !targets.contains(v)).collect()
    }

    /// Rename every node through `map`.
    ///
    /// # Errors
    /// Returns `UpDownError::Relabel` unless `map` is a bijection whose
    /// domain is exactly this graph's node set.
    pub fn relabel(&self, map: &HashMap<Node, Node>) -> Result<Self> {
        if map.len() != self.len() {
            return Err(UpDownError::Relabel(format!(
                "map has {} entries for {} nodes",
                map.len(),
                self.len()
            )));
        }
        let mut images = BTreeSet::new();
        for v in self.nodes() {
            let image = map.get(&v).ok_or_else(|| {
                UpDownError::Relabel(format!("node {} has no image", v))
            })?;
            if !images.insert(*image) {
                return Err(UpDownError::Relabel(format!(
                    "label {} is the image of more than one node",
                    image
                )));
            }
        }

        let adjacency = self
            .adjacency
            .iter()
            .map(|(v, succ)| (map[v], succ.iter().map(|u| map[u]).collect()))
            .collect();
        Ok(Self::from_adjacency_unchecked(adjacency))
    }

    /// Shift every label by `offset`.
    pub fn offset(&self, offset: Node) -> Self {
        let adjacency = self
            .adjacency
            .iter()
            .map(|(v, succ)| (v + offset, succ.iter().map(|u| u + offset).collect()))
            .collect();
        Self { adjacency }
    }

    /// The subgraph induced on `nodes`. Requested nodes absent from this
    /// graph are ignored; edges leaving the kept set are dropped.
    pub fn subgraph(&self, nodes: &BTreeSet<Node>) -> Self {
        let adjacency = self
            .adjacency
            .iter()
            .filter(|(v, _)| nodes.contains(v))
            .map(|(&v, succ)| {
                (
                    v,
                    succ.iter().copied().filter(|u| nodes.contains(u)).collect(),
                )
            })
            .collect();
        Self { adjacency }
    }

    /// The graph with every edge transposed.
    pub fn reverse(&self) -> Self {
        let mut adjacency: BTreeMap<Node, Vec<Node>> =
            self.nodes().map(|v| (v, Vec::new())).collect();
        for (&v, succ) in &self.adjacency {
            for u in succ {
                if let Some(preds) = adjacency.get_mut(u) {
                    preds.push(v);
                }
            }
        }
        Self::from_adjacency_unchecked(adjacency)
    }

    /// Disjoint union with `other`. Labels must not collide; callers offset
    /// one side first.
    pub(crate) fn union_unchecked(&self, other: &Dag) -> Self {
        let mut adjacency = self.adjacency.clone();
        adjacency.extend(other.adjacency.iter().map(|(&v, succ)| (v, succ.clone())));
        Self::from_adjacency_unchecked(adjacency)
    }

    /// Disjoint union with `other`.
    ///
    /// # Errors
    /// Returns `UpDownError::InvalidGame` if the two graphs share a label.
    pub fn disjoint_union(&self, other: &Dag) -> Result<Self> {
        if let Some(v) = other.nodes().find(|v| self.contains(*v)) {
            return Err(UpDownError::InvalidGame(format!(
                "node {} appears in both graphs",
                v
            )));
        }
        Ok(self.union_unchecked(other))
    }

    pub(crate) fn insert_edge(&mut self, v: Node, u: Node) {
        if let Some(succ) = self.adjacency.get_mut(&v) {
            if let Err(pos) = succ.binary_search(&u) {
                succ.insert(pos, u);
            }
        }
    }

    pub(crate) fn remove_edge(&mut self, v: Node, u: Node) {
        if let Some(succ) = self.adjacency.get_mut(&v) {
            succ.retain(|&w| w != u);
        }
    }

    /// Add edges `v -> u` for every pair; both ends must already be nodes.
    pub fn with_edges(&self, edges: impl IntoIterator<Item = (Node, Node)>) -> Result<Self> {
        let mut dag = self.clone();
        for (v, u) in edges {
            if !dag.contains(v) || !dag.contains(u) {
                return Err(UpDownError::InvalidGame(format!(
                    "edge {} -> {} has an endpoint outside the graph",
                    v, u
                )));
            }
            dag.insert_edge(v, u);
        }
        Ok(dag)
    }
}

impl fmt::Display for Dag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (v, succ)) in self.adjacency.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", v, succ)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Dag {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        Dag::from_edges(0..4, [(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap()
    }

    #[test]
    fn test_from_adjacency_rejects_dangling_edge() {
        let adjacency = BTreeMap::from([(0, vec![1]), (2, vec![])]);
        assert!(matches!(
            Dag::from_adjacency(adjacency),
            Err(UpDownError::InvalidGame(_))
        ));
    }

    #[test]
    fn test_from_adjacency_normalizes_successors() {
        let adjacency = BTreeMap::from([(0, vec![2, 1, 2]), (1, vec![]), (2, vec![])]);
        let dag = Dag::from_adjacency(adjacency).unwrap();
        assert_eq!(dag.successors(0), &[1, 2]);
        assert_eq!(dag.number_of_edges(), 2);
    }

    #[test]
    fn test_chain_and_antichain() {
        let chain = Dag::chain(3, 3);
        assert_eq!(chain.edge_list(), vec![(3, 4), (4, 5)]);
        assert_eq!(chain.sinks(), vec![5]);
        assert_eq!(chain.sources(), vec![3]);

        let antichain = Dag::antichain(3);
        assert_eq!(antichain.number_of_edges(), 0);
        assert_eq!(antichain.sinks(), vec![0, 1, 2]);
    }

    #[test]
    fn test_sinks_and_sources() {
        let dag = diamond();
        assert_eq!(dag.sinks(), vec![3]);
        assert_eq!(dag.sources(), vec![0]);
    }

    #[test]
    fn test_relabel_bijection() {
        let dag = diamond();
        let map: HashMap<Node, Node> = (0..4).map(|v| (v, 10 + 3 - v)).collect();
        let relabelled = dag.relabel(&map).unwrap();
        assert!(relabelled.has_edge(13, 12));
        assert!(relabelled.has_edge(11, 10));
        assert_eq!(relabelled.number_of_edges(), 4);
    }

    #[test]
    fn test_relabel_rejects_non_bijection() {
        let dag = diamond();
        let collapsing: HashMap<Node, Node> = (0..4).map(|v| (v, v / 2)).collect();
        assert!(matches!(dag.relabel(&collapsing), Err(UpDownError::Relabel(_))));

        let partial: HashMap<Node, Node> = (0..3).map(|v| (v, v)).collect();
        assert!(matches!(dag.relabel(&partial), Err(UpDownError::Relabel(_))));

        let foreign: HashMap<Node, Node> = [(0, 0), (1, 1), (2, 2), (7, 3)].into();
        assert!(matches!(dag.relabel(&foreign), Err(UpDownError::Relabel(_))));
    }

    #[test]
    fn test_subgraph_drops_external_edges() {
        let dag = diamond();
        let sub = dag.subgraph(&BTreeSet::from([0, 1, 9]));
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.edge_list(), vec![(0, 1)]);
    }

    #[test]
    fn test_reverse() {
        let dag = diamond();
        let rev = dag.reverse();
        assert_eq!(rev.successors(3), &[1, 2]);
        assert_eq!(rev.successors(0), &[] as &[Node]);
        assert_eq!(rev.reverse(), dag);
    }

    #[test]
    fn test_disjoint_union() {
        let left = Dag::chain(0, 2);
        let right = Dag::chain(2, 2);
        let union = left.disjoint_union(&right).unwrap();
        assert_eq!(union.len(), 4);
        assert_eq!(union.number_of_edges(), 2);
        assert!(left.disjoint_union(&left).is_err());
    }

    #[test]
    fn test_with_edges() {
        let dag = Dag::antichain(3).with_edges([(0, 2)]).unwrap();
        assert!(dag.has_edge(0, 2));
        assert!(Dag::antichain(3).with_edges([(0, 5)]).is_err());
    }
}
