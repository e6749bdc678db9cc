//! JSON-friendly description of a game.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use updown_core::Result;
use updown_poset::{Dag, Node};

use crate::game::UpDown;
use crate::Color;

/// A game as adjacency lists plus colors.
///
/// ```json
/// {"dag": {"0": [1], "1": []}, "coloring": {"0": 1, "1": -1}, "reduced": false}
/// ```
///
/// Colors are `1` (Blue), `0` (Green) and `-1` (Red); a missing coloring
/// means all Green. With `reduced` set the graph is trusted to be acyclic
/// and transitively reduced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub dag: BTreeMap<Node, Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coloring: Option<BTreeMap<Node, Color>>,
    #[serde(default)]
    pub reduced: bool,
}

impl GameRecord {
    /// Build the game.
    ///
    /// # Errors
    /// Returns `UpDownError::InvalidGame` for dangling edges, cycles (unless
    /// `reduced`) or colors on unknown nodes.
    pub fn into_game(self) -> Result<UpDown> {
        let dag = Dag::from_adjacency(self.dag)?;
        if self.reduced {
            Ok(UpDown::from_reduced(dag, self.coloring))
        } else {
            UpDown::new(dag, self.coloring)
        }
    }
}

impl From<&UpDown> for GameRecord {
    fn from(game: &UpDown) -> Self {
        Self {
            dag: game.dag().adjacency().clone(),
            coloring: Some(game.coloring().clone()),
            reduced: true,
        }
    }
}
