//! Depth-first traversals: reachability, cycle detection, topological order
//! and weak components.
//!
//! Every traversal keeps its own stack of `(node, next successor index)`
//! frames instead of recursing.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::dag::{Dag, Node};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl Dag {
    /// All nodes reachable from `source`, excluding `source` itself.
    pub fn descendants(&self, source: Node) -> BTreeSet<Node> {
        reachable(self, source)
    }

    /// All nodes with a path to `source`, excluding `source` itself.
    pub fn ancestors(&self, source: Node) -> BTreeSet<Node> {
        reachable(&self.reverse(), source)
    }

    /// Whether the graph has no directed cycle.
    ///
    /// Three-state depth-first search: meeting a node that is still in
    /// progress means a back edge, hence a cycle.
    pub fn is_acyclic(&self) -> bool {
        let mut marks: HashMap<Node, Mark> = HashMap::with_capacity(self.len());

        for start in self.nodes() {
            if marks.contains_key(&start) {
                continue;
            }
            marks.insert(start, Mark::InProgress);
            let mut stack: Vec<(Node, usize)> = vec![(start, 0)];

            while let Some(frame) = stack.last_mut() {
                let (v, next) = *frame;
                let successors = self.successors(v);
                if next < successors.len() {
                    frame.1 += 1;
                    let u = successors[next];
                    match marks.get(&u) {
                        Some(Mark::InProgress) => return false,
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(u, Mark::InProgress);
                            stack.push((u, 0));
                        }
                    }
                } else {
                    marks.insert(v, Mark::Done);
                    stack.pop();
                }
            }
        }

        true
    }

    /// Depth-first postorder of the nodes.
    ///
    /// With `reverse == false` the result is a topological order: for every
    /// edge `u -> v`, `u` comes before `v`. With `reverse == true` the raw
    /// finish order is returned (sinks first). Assumes the graph is acyclic.
    pub fn topological_sort(&self, reverse: bool) -> Vec<Node> {
        let mut visited: BTreeSet<Node> = BTreeSet::new();
        let mut order = Vec::with_capacity(self.len());

        for start in self.nodes() {
            if !visited.insert(start) {
                continue;
            }
            let mut stack: Vec<(Node, usize)> = vec![(start, 0)];

            while let Some(frame) = stack.last_mut() {
                let (v, next) = *frame;
                let successors = self.successors(v);
                if next < successors.len() {
                    frame.1 += 1;
                    let u = successors[next];
                    if visited.insert(u) {
                        stack.push((u, 0));
                    }
                } else {
                    order.push(v);
                    stack.pop();
                }
            }
        }

        if !reverse {
            order.reverse();
        }
        order
    }

    /// Weakly connected components, each as a node set, ordered by their
    /// smallest node.
    pub fn connected_components(&self) -> Vec<BTreeSet<Node>> {
        let mut undirected: BTreeMap<Node, Vec<Node>> =
            self.nodes().map(|v| (v, self.successors(v).to_vec())).collect();
        for (v, u) in self.edge_list() {
            if let Some(neighbours) = undirected.get_mut(&u) {
                neighbours.push(v);
            }
        }

        let mut seen: BTreeSet<Node> = BTreeSet::new();
        let mut components = Vec::new();

        for start in self.nodes() {
            if !seen.insert(start) {
                continue;
            }
            let mut component = BTreeSet::from([start]);
            let mut stack = vec![start];
            while let Some(v) = stack.pop() {
                for &u in undirected.get(&v).map(Vec::as_slice).unwrap_or(&[]) {
                    if seen.insert(u) {
                        component.insert(u);
                        stack.push(u);
                    }
                }
            }
            components.push(component);
        }

        components
    }
}

fn reachable(dag: &Dag, source: Node) -> BTreeSet<Node> {
    let mut visited = BTreeSet::from([source]);
    let mut stack: Vec<Node> = dag.successors(source).to_vec();

    while let Some(v) = stack.pop() {
        if visited.insert(v) {
            stack.extend(dag.successors(v).iter().filter(|u| !visited.contains(u)));
        }
    }

    visited.remove(&source);
    visited
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond_with_tail() -> Dag {
        // 0 -> 1 -> 3 -> 4, 0 -> 2 -> 3
        Dag::from_edges(0..5, [(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]).unwrap()
    }

    #[test]
    fn test_descendants_and_ancestors() {
        let dag = diamond_with_tail();
        assert_eq!(dag.descendants(0), BTreeSet::from([1, 2, 3, 4]));
        assert_eq!(dag.descendants(2), BTreeSet::from([3, 4]));
        assert!(dag.descendants(4).is_empty());
        assert_eq!(dag.ancestors(3), BTreeSet::from([0, 1, 2]));
        assert!(dag.ancestors(0).is_empty());
    }

    #[test]
    fn test_descendants_excludes_source_on_cycle() {
        let cyclic = Dag::from_edges(0..2, [(0, 1), (1, 0)]).unwrap();
        assert_eq!(cyclic.descendants(0), BTreeSet::from([1]));
    }

    #[test]
    fn test_is_acyclic() {
        assert!(diamond_with_tail().is_acyclic());
        assert!(Dag::new().is_acyclic());

        let cyclic = Dag::from_edges(0..3, [(0, 1), (1, 2), (2, 0)]).unwrap();
        assert!(!cyclic.is_acyclic());

        let self_loop = Dag::from_edges(0..1, [(0, 0)]).unwrap();
        assert!(!self_loop.is_acyclic());
    }

    #[test]
    fn test_topological_sort_respects_edges() {
        let dag = diamond_with_tail();
        let order = dag.topological_sort(false);
        let position: HashMap<Node, usize> =
            order.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        for (u, v) in dag.edge_list() {
            assert!(position[&u] < position[&v], "{} should precede {}", u, v);
        }
    }

    #[test]
    fn test_topological_sort_reverse_is_finish_order() {
        let dag = diamond_with_tail();
        let mut forward = dag.topological_sort(false);
        let backward = dag.topological_sort(true);
        forward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(backward[0], 4);
    }

    #[test]
    fn test_connected_components() {
        let dag = Dag::from_edges(0..6, [(0, 1), (2, 1), (3, 4)]).unwrap();
        let components = dag.connected_components();
        assert_eq!(
            components,
            vec![
                BTreeSet::from([0, 1, 2]),
                BTreeSet::from([3, 4]),
                BTreeSet::from([5])
            ]
        );
        assert!(Dag::new().connected_components().is_empty());
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let chain = Dag::chain(0, 200_000);
        assert!(chain.is_acyclic());
        assert_eq!(chain.descendants(0).len(), 199_999);
        assert_eq!(chain.topological_sort(false)[0], 0);
    }
}
