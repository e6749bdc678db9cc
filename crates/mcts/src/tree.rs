//! Arena-allocated search tree.
//!
//! Nodes live in one vector and point at each other by index, so a tree is
//! dropped (or cleared) as a whole and parent links are plain indices.

use crate::node::{Node, NodeId};

/// Arena-allocated search tree over an action space of fixed size.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    num_actions: usize,
}

impl Tree {
    /// Create a new tree with an empty root node.
    pub fn new(num_actions: usize) -> Self {
        Self {
            nodes: vec![Node::root(num_actions)],
            num_actions,
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// The child of `parent` along `action`, created on first use.
    pub fn child(&mut self, parent: NodeId, action: usize) -> NodeId {
        if let Some(&id) = self.get(parent).children.get(&action) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Node::new(Some(parent), Some(action), self.num_actions));
        self.get_mut(parent).children.insert(action, id);
        id
    }

    /// Clear the tree for reuse, keeping only a fresh root.
    pub fn reset(&mut self, num_actions: usize) {
        self.nodes.clear();
        self.num_actions = num_actions;
        self.nodes.push(Node::root(num_actions));
    }

    /// Number of nodes in the tree (at least 1).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root always exists.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &Node {
        self.get(NodeId::ROOT)
    }
}
