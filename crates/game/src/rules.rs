//! Implementation of the search-facing `Game` trait for upset-downset.

use updown_core::{Game, Result};
use updown_poset::Node;

use crate::encoding::FixedEncoding;
use crate::game::UpDown;
use crate::Player;

/// Default size of the action space: one slot per node label.
pub const DEFAULT_MAX_NODES: usize = 32;

/// A position together with the player to move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub game: UpDown,
    pub mover: Player,
}

impl GameState {
    pub fn new(game: UpDown, mover: Player) -> Self {
        Self { game, mover }
    }
}

/// Upset-downset rules over a fixed action space of `max_nodes` labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpDownRules {
    max_nodes: usize,
}

impl UpDownRules {
    pub fn new(max_nodes: usize) -> Self {
        Self { max_nodes }
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }
}

impl Default for UpDownRules {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NODES)
    }
}

impl Game for UpDownRules {
    type State = GameState;
    type Action = Node;
    type Observation = FixedEncoding;

    fn legal_actions(&self, state: &GameState) -> Vec<Node> {
        state.game.nodes_for(state.mover)
    }

    fn apply(&self, state: &GameState, action: Node) -> Result<GameState> {
        let game = state.game.play(state.mover, action)?;
        Ok(GameState::new(game, state.mover.opposite()))
    }

    fn is_terminal(&self, state: &GameState) -> bool {
        !state
            .game
            .coloring()
            .values()
            .any(|c| c.playable_by(state.mover))
    }

    fn outcome(&self, state: &GameState) -> Option<f32> {
        // normal play: the player unable to move loses
        self.is_terminal(state).then_some(1.0)
    }

    fn observe(&self, state: &GameState) -> Result<FixedEncoding> {
        FixedEncoding::encode(&state.game, state.mover, self.max_nodes)
    }

    fn action_to_index(&self, action: Node) -> usize {
        action
    }

    fn index_to_action(&self, index: usize) -> Option<Node> {
        (index < self.max_nodes).then_some(index)
    }

    fn num_actions(&self) -> usize {
        self.max_nodes
    }
}
