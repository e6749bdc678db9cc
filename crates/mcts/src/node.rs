//! Search tree node types.
//!
//! Uses arena allocation with indices: a node refers to its parent and
//! children by `NodeId`, so parent links never own anything.

use std::collections::BTreeMap;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// Per-action statistics of one node, indexed by action index.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStats {
    /// N(s, a): number of simulations that took action `a`.
    pub visits: Vec<u32>,

    /// W(s, a): sum of backed-up values of action `a`, from the point of
    /// view of the player to move at this node.
    pub values: Vec<f32>,

    /// P(s, a): prior probability from the evaluator.
    pub priors: Vec<f32>,
}

impl EdgeStats {
    /// All-zero statistics over `num_actions` actions.
    pub fn new(num_actions: usize) -> Self {
        Self {
            visits: vec![0; num_actions],
            values: vec![0.0; num_actions],
            priors: vec![0.0; num_actions],
        }
    }

    /// ΣN over all actions.
    pub fn total_visits(&self) -> u32 {
        self.visits.iter().sum()
    }

    /// ΣW / ΣN, or 0 before any visit.
    pub fn mean_value(&self) -> f32 {
        let total = self.total_visits();
        if total == 0 {
            0.0
        } else {
            self.values.iter().sum::<f32>() / total as f32
        }
    }
}

/// A node in the search tree.
#[derive(Clone, Debug)]
pub struct Node {
    /// Action index taken from the parent (None for root).
    pub action: Option<usize>,

    /// Parent node (None for root). Used only for backup.
    pub parent: Option<NodeId>,

    /// Children created so far, keyed by action index.
    pub children: BTreeMap<usize, NodeId>,

    /// Statistics of the actions leaving this node.
    pub stats: EdgeStats,

    /// Valid action indices, ascending; empty until expanded.
    pub valid_actions: Vec<usize>,

    /// Whether the evaluator has been queried for this node.
    pub expanded: bool,

    /// Whether the player to move here has no legal action.
    pub terminal: bool,
}

impl Node {
    /// Create a new unexpanded node.
    pub fn new(parent: Option<NodeId>, action: Option<usize>, num_actions: usize) -> Self {
        Self {
            action,
            parent,
            children: BTreeMap::new(),
            stats: EdgeStats::new(num_actions),
            valid_actions: Vec::new(),
            expanded: false,
            terminal: false,
        }
    }

    /// Create the root node.
    pub fn root(num_actions: usize) -> Self {
        Self::new(None, None, num_actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_stats_totals() {
        let mut stats = EdgeStats::new(3);
        assert_eq!(stats.mean_value(), 0.0);

        stats.visits[1] = 3;
        stats.values[1] = 2.0;
        assert_eq!(stats.total_visits(), 3);
        assert!((stats.mean_value() - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_node_creation() {
        let node = Node::new(Some(NodeId::ROOT), Some(4), 8);
        assert_eq!(node.action, Some(4));
        assert_eq!(node.parent, Some(NodeId::ROOT));
        assert_eq!(node.stats.priors.len(), 8);
        assert!(!node.expanded);
        assert!(!node.terminal);
    }

    #[test]
    fn test_root_node() {
        let root = Node::root(2);
        assert_eq!(root.action, None);
        assert_eq!(root.parent, None);
        assert!(root.children.is_empty());
    }
}
