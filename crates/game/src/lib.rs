//! Upset-Downset Game - colored-DAG games, their algebra and exact outcomes
//!
//! A position is a poset (stored as its Hasse diagram) whose nodes are
//! colored Blue, Green or Red. Up may choose Blue or Green nodes and deletes
//! the chosen node's upset; Down may choose Red or Green nodes and deletes
//! its downset. The player unable to move loses.
//!
//! # Example
//! ```
//! use updown_game::{Outcome, UpDown};
//!
//! let nim = UpDown::nim(&[3, 5]);
//! assert_eq!(nim.outcome(), Outcome::Next);
//! assert_eq!((&nim - &nim).outcome(), Outcome::Previous);
//! ```

mod algebra;
mod color;
mod encoding;
mod game;
mod random;
mod record;
mod rules;
mod solver;
mod structured;

pub use algebra::Comparison;
pub use color::{Color, Player};
pub use encoding::{FixedEncoding, NUM_PLANES};
pub use game::{Payload, UpDown};
pub use random::RandomGameConfig;
pub use record::GameRecord;
pub use rules::{GameState, UpDownRules, DEFAULT_MAX_NODES};
pub use solver::{outcome, Outcome};
pub use structured::Structure;

pub use updown_poset::{Dag, Node};
