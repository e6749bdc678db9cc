//! Hasse-diagram plot coordinates.
//!
//! Nothing in the game logic reads these coordinates; they exist so a
//! plotting front end can draw a position with every edge pointing up.

use std::collections::BTreeMap;

use crate::closure::Direction;
use crate::dag::{Dag, Node};

/// `(x, y)` plot coordinates keyed by node.
pub type Layout = BTreeMap<Node, (f64, f64)>;

impl Dag {
    /// Hasse-diagram layout of an acyclic graph.
    ///
    /// - `y` is the node's level: the length of the longest path ending at it.
    /// - `x` spaces the nodes of each level one unit apart, each level
    ///   centred on the one below it, and components are placed left to right.
    pub fn hasse_layout(&self) -> Layout {
        let mut layout = Layout::new();
        let mut prev_component_max_x = 0.0_f64;

        for component in self.connected_components() {
            let sub = self.subgraph(&component);
            let levels = sub.longest_path_lengths(Direction::Incoming);

            let mut level_sets: BTreeMap<usize, Vec<Node>> = BTreeMap::new();
            for (&node, &level) in &levels {
                level_sets.entry(level).or_default().push(node);
            }

            let widest = level_sets.values().map(Vec::len).max().unwrap_or(0);
            let bottom = level_sets.get(&0).map(Vec::len).unwrap_or(0);
            let x_gap = (widest as f64 - bottom as f64) / 2.0;

            let mut prev_level_left_x = prev_component_max_x + x_gap + 1.0;
            let mut prev_level_size = 0usize;

            for (&level, nodes) in &level_sets {
                let size = nodes.len();
                let shift = if prev_level_size == 0 {
                    0.0
                } else {
                    (prev_level_size as f64 - size as f64) / 2.0
                };
                let left_x = prev_level_left_x + shift;
                for (i, &node) in nodes.iter().enumerate() {
                    layout.insert(node, (left_x + i as f64, level as f64));
                }
                prev_component_max_x = prev_component_max_x.max(left_x + size as f64 - 1.0);
                prev_level_left_x = left_x;
                prev_level_size = size;
            }
        }

        layout
    }
}
