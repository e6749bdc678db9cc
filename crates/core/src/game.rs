use std::hash::Hash;

use crate::Result;

/// A game abstraction for tree search.
///
/// This trait is what the PUCT search consumes. It is deliberately small:
/// the rules object knows how to list, apply and index actions, and how to
/// turn a state into the fixed-size observation handed to the oracle.
pub trait Game: Clone + Send + Sync {
    /// The game state (e.g., a position plus the player to move)
    type State: Clone + Send;

    /// A game action (e.g., the node played)
    type Action: Clone + Copy + Send + Eq + Hash + std::fmt::Debug;

    /// The observation format handed to the oracle
    type Observation;

    /// Returns all legal actions from the given state, in ascending index order
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Applies an action, returning a new state (immutable operation)
    fn apply(&self, state: &Self::State, action: Self::Action) -> Result<Self::State>;

    /// Returns true if the player to move has no legal action
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Returns the game outcome from the perspective of the player who just moved:
    /// - `Some(1.0)` if that player won
    /// - `Some(-1.0)` if that player lost
    /// - `None` if the game is not terminal
    fn outcome(&self, state: &Self::State) -> Option<f32>;

    /// Converts game state to the oracle's observation format.
    ///
    /// Fails when the state does not fit the fixed observation size.
    fn observe(&self, state: &Self::State) -> Result<Self::Observation>;

    /// Maps an action to a flat index for the policy vector
    fn action_to_index(&self, action: Self::Action) -> usize;

    /// Maps a flat index back to an action, returning None if invalid
    fn index_to_action(&self, index: usize) -> Option<Self::Action>;

    /// Total number of possible action indices (size of policy vector)
    fn num_actions(&self) -> usize;
}
