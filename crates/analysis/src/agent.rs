//! Search-driven play for games too large to solve exactly.
//!
//! The agent plays both sides with greedy (temperature 0) search moves and
//! reads the outcome class off two playouts, one with each player starting.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use updown_core::{Game, Result};
use updown_game::{GameState, Node, Outcome, Player, UpDown, UpDownRules, DEFAULT_MAX_NODES};
use updown_mcts::{Evaluator, Mcts, MctsConfig, RolloutEvaluator, UniformEvaluator};

/// Leaf evaluation used by the agent's searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playout {
    /// Uniform priors, value 0.
    Uniform,
    /// Uniform priors, value of one random playout of at most `depth` moves.
    Rollout { depth: usize },
}

/// A greedy search player.
#[derive(Clone, Debug)]
pub struct Agent {
    simulations: usize,
    playout: Playout,
    seed: u64,
}

impl Agent {
    pub fn new(simulations: usize, playout: Playout, seed: u64) -> Self {
        Self {
            simulations,
            playout,
            seed,
        }
    }

    /// The search's choice for `player` to move in `game`.
    ///
    /// # Errors
    /// `NoLegalMoves` if `player` has no node to play.
    pub fn predict_next_move(&self, game: &UpDown, player: Player) -> Result<Node> {
        let rules = rules_for(game);
        let state = GameState::new(game.clone(), player);
        match self.playout {
            Playout::Uniform => self.best_move(&rules, &state, UniformEvaluator, 0),
            Playout::Rollout { depth } => self.best_move(
                &rules,
                &state,
                RolloutEvaluator::new(ChaCha8Rng::seed_from_u64(self.seed), depth),
                0,
            ),
        }
    }

    /// Approximate outcome class from one playout per starting player.
    ///
    /// A playout ending after an even number of moves is a win for the
    /// second player.
    pub fn approximate_outcome(&self, game: &UpDown) -> Result<Outcome> {
        let up_first = self.playout_length(game, Player::Up)? % 2 == 0;
        let down_first = self.playout_length(game, Player::Down)? % 2 == 0;

        let outcome = match (up_first, down_first) {
            (true, true) => Outcome::Previous,
            (false, false) => Outcome::Next,
            (true, false) => Outcome::Down,
            (false, true) => Outcome::Up,
        };
        debug!(nodes = game.node_count(), %outcome, "approximated outcome");
        Ok(outcome)
    }

    /// Number of moves in a greedy self-play game from `game` with `first`
    /// to move.
    fn playout_length(&self, game: &UpDown, first: Player) -> Result<usize> {
        let rules = rules_for(game);
        let mut state = GameState::new(game.clone(), first);
        let mut moves = 0;

        while !rules.is_terminal(&state) {
            let action = match self.playout {
                Playout::Uniform => self.best_move(&rules, &state, UniformEvaluator, moves)?,
                Playout::Rollout { depth } => self.best_move(
                    &rules,
                    &state,
                    RolloutEvaluator::new(
                        ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(moves as u64)),
                        depth,
                    ),
                    moves,
                )?,
            };
            state = rules.apply(&state, action)?;
            moves += 1;
        }
        Ok(moves)
    }

    fn best_move<E: Evaluator<UpDownRules>>(
        &self,
        rules: &UpDownRules,
        state: &GameState,
        evaluator: E,
        move_number: usize,
    ) -> Result<Node> {
        let rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(1000 + move_number as u64));
        let mut mcts = Mcts::new(MctsConfig::for_evaluation(self.simulations), evaluator, rng);
        Ok(mcts.search(rules, state)?.best_action)
    }
}

/// Rules whose action space holds every label of `game`.
fn rules_for(game: &UpDown) -> UpDownRules {
    let labels = game.dag().max_node().map_or(0, |max| max + 1);
    UpDownRules::new(labels.max(DEFAULT_MAX_NODES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use updown_core::UpDownError;
    use updown_game::{Color, Dag};

    fn agent() -> Agent {
        Agent::new(100, Playout::Rollout { depth: 20 }, 7)
    }

    #[test]
    fn test_predicts_the_winning_nim_move() {
        let agent = Agent::new(300, Playout::Uniform, 0);
        assert_eq!(agent.predict_next_move(&UpDown::nim(&[1, 2]), Player::Up).unwrap(), 2);
    }

    #[test]
    fn test_predict_without_moves() {
        let blue = BTreeMap::from([(0, Color::Blue)]);
        let game = UpDown::from_reduced(Dag::antichain(1), Some(blue));
        assert_eq!(
            agent().predict_next_move(&game, Player::Down),
            Err(UpDownError::NoLegalMoves)
        );
    }

    #[test]
    fn test_forced_playouts() {
        // every line of play has a fixed length here, so the search cannot
        // get these wrong
        assert_eq!(agent().approximate_outcome(&UpDown::empty()).unwrap(), Outcome::Previous);
        assert_eq!(agent().approximate_outcome(&UpDown::nim(&[1])).unwrap(), Outcome::Next);
        assert_eq!(
            agent().approximate_outcome(&UpDown::nim(&[1, 1])).unwrap(),
            Outcome::Previous
        );

        let blue = BTreeMap::from([(0, Color::Blue), (1, Color::Blue)]);
        let game = UpDown::from_reduced(Dag::antichain(2), Some(blue));
        assert_eq!(agent().approximate_outcome(&game).unwrap(), Outcome::Up);
        assert_eq!(
            agent().approximate_outcome(&game.negate()).unwrap(),
            Outcome::Down
        );
    }

    #[test]
    fn test_large_labels_get_a_larger_action_space() {
        let game = UpDown::nim(&[20, 20]);
        assert_eq!(rules_for(&game).num_actions(), 40);
        assert_eq!(rules_for(&UpDown::empty()).num_actions(), DEFAULT_MAX_NODES);
    }
}
