//! Upset-Downset Poset - graph primitives for colored-DAG games
//!
//! A game position is a finite poset stored as the adjacency map of its
//! Hasse diagram. This crate provides the graph algorithms every game
//! operation is built on:
//!
//! - relabelling, induced subgraphs, reversal ([`Dag`])
//! - reachability, cycle detection, topological order, weak components
//! - transitive closure and reduction, longest-path levels
//! - a Hasse-diagram layout for visualization collaborators
//! - (almost) uniform random DAG generation
//!
//! All traversals use an explicit work stack, so deep chains never exhaust
//! the native call stack.

mod closure;
mod dag;
mod layout;
pub mod random;
mod traversal;

pub use closure::Direction;
pub use dag::{Dag, Node};
pub use layout::Layout;
pub use random::uniform_random_dag;
