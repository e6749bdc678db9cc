//! The oracle boundary of the search.
//!
//! The `Evaluator` trait is the only place the search talks to the outside
//! world: on expanding a node it asks for prior probabilities over the full
//! action space and a value estimate for the player to move.
//! - `UniformEvaluator`: uniform priors, value 0
//! - `RolloutEvaluator`: uniform priors, value of one random playout
//! - `OracleEvaluator`: wraps a function of the encoded observation, such
//!   as a trained policy/value model

use std::cell::RefCell;

use rand::Rng;
use updown_core::{Game, Result, UpDownError, Value};

/// Evaluation result: prior policy + value estimate.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// Prior probability for each action index.
    /// Length should equal `game.num_actions()`.
    pub policy: Vec<f32>,

    /// Value estimate from this position (from perspective of player to move).
    /// Should be in range [-1, 1].
    pub value: f32,
}

/// Trait for evaluating game positions.
pub trait Evaluator<G: Game> {
    /// Evaluate a non-terminal position, returning prior policy and value
    /// estimate.
    ///
    /// The value is from the perspective of the player to move, in [-1, 1].
    ///
    /// # Errors
    /// Any error is fatal to the running search and is returned to its
    /// caller unchanged; the search never retries.
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation>;
}

/// Uniform prior over the legal actions of `state`.
fn uniform_policy<G: Game>(game: &G, state: &G::State) -> Vec<f32> {
    let legal_actions = game.legal_actions(state);
    let mut policy = vec![0.0; game.num_actions()];
    if !legal_actions.is_empty() {
        let prior = 1.0 / legal_actions.len() as f32;
        for action in &legal_actions {
            if let Some(p) = policy.get_mut(game.action_to_index(*action)) {
                *p = prior;
            }
        }
    }
    policy
}

/// Evaluator with no knowledge: uniform priors over legal actions and a
/// neutral value.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformEvaluator;

impl<G: Game> Evaluator<G> for UniformEvaluator {
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation> {
        Ok(Evaluation {
            policy: uniform_policy(game, state),
            value: 0.0,
        })
    }
}

/// Evaluator using uniform prior and random rollouts.
///
/// - Policy: uniform distribution over legal actions
/// - Value: result of a random playout from the position
pub struct RolloutEvaluator<R: Rng> {
    /// Random number generator (wrapped in RefCell for interior mutability).
    rng: RefCell<R>,

    /// Maximum depth for random rollouts.
    max_rollout_depth: usize,
}

impl<R: Rng> RolloutEvaluator<R> {
    /// Create a new rollout evaluator.
    ///
    /// # Arguments
    /// * `rng` - Random number generator for rollouts
    /// * `max_rollout_depth` - Maximum moves in a random playout
    pub fn new(rng: R, max_rollout_depth: usize) -> Self {
        Self {
            rng: RefCell::new(rng),
            max_rollout_depth,
        }
    }

    /// Perform a random rollout from the given state.
    ///
    /// Returns the game outcome from the perspective of the player
    /// who was to move at the start of the rollout.
    fn rollout<G: Game>(&self, game: &G, initial_state: &G::State) -> Result<f32> {
        let mut state = initial_state.clone();
        let mut depth = 0;

        while !game.is_terminal(&state) && depth < self.max_rollout_depth {
            let legal_actions = game.legal_actions(&state);
            if legal_actions.is_empty() {
                break;
            }

            let idx = self.rng.borrow_mut().gen_range(0..legal_actions.len());
            state = game.apply(&state, legal_actions[idx])?;
            depth += 1;
        }

        // outcome() is from the perspective of the player who just moved:
        // the starting player if depth is odd, the opponent if even
        Ok(match game.outcome(&state) {
            Some(outcome) if depth % 2 == 1 => outcome,
            Some(outcome) => -outcome,
            None => 0.0,
        })
    }
}

impl<G: Game, R: Rng> Evaluator<G> for RolloutEvaluator<R> {
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation> {
        Ok(Evaluation {
            policy: uniform_policy(game, state),
            value: self.rollout(game, state)?,
        })
    }
}

/// Evaluator backed by a function of the encoded observation, returning
/// `(priors, value)`.
///
/// Priors must cover the whole action space; values are clamped into
/// [-1, 1].
pub struct OracleEvaluator<F> {
    oracle: F,
}

impl<F> OracleEvaluator<F> {
    pub fn new(oracle: F) -> Self {
        Self { oracle }
    }
}

impl<G, F> Evaluator<G> for OracleEvaluator<F>
where
    G: Game,
    F: Fn(&G::Observation) -> Result<(Vec<f32>, f32)>,
{
    fn evaluate(&self, game: &G, state: &G::State) -> Result<Evaluation> {
        let observation = game.observe(state)?;
        let (policy, value) = (self.oracle)(&observation)?;

        if policy.len() != game.num_actions() {
            return Err(UpDownError::Oracle(format!(
                "oracle returned {} priors for {} actions",
                policy.len(),
                game.num_actions()
            )));
        }
        if let Some(p) = policy.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(UpDownError::Oracle(format!("oracle returned prior {}", p)));
        }

        Ok(Evaluation {
            policy,
            value: Value::clamped(value).get(),
        })
    }
}
