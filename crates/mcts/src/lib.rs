//! PUCT tree search for upset-downset and other two-player games.
//!
//! The search is generic over any game implementing `updown_core::Game` and
//! talks to the outside world only through an [`Evaluator`], which supplies
//! priors over the fixed action space and a value for the player to move.
//!
//! # Features
//!
//! - **PUCT Selection**: Q = W / (1 + N), U = c·√ΣN·P / (1 + N); invalid
//!   actions are never selected and ties go to the lowest index
//! - **Dirichlet Noise**: blended into the root priors over the full action
//!   space, resampled at every root selection
//! - **Lazy Children**: a child node exists only once its action was taken
//! - **Temperature Policies**: visit counts to probabilities via
//!   [`visit_policy`], with temperature 0 meaning one-hot
//! - **Fatal Oracle Errors**: an evaluator failure ends the run and is
//!   returned to the caller
//!
//! # Example
//!
//! ```
//! use updown_game::{GameState, Player, UpDown, UpDownRules};
//! use updown_mcts::{Mcts, MctsConfig, RolloutEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let rules = UpDownRules::default();
//! let state = GameState::new(UpDown::nim(&[1, 2]), Player::Up);
//!
//! let rng = ChaCha8Rng::seed_from_u64(42);
//! let evaluator = RolloutEvaluator::new(rng.clone(), 20);
//! let mut mcts = Mcts::new(MctsConfig::for_evaluation(200), evaluator, rng);
//!
//! let result = mcts.search(&rules, &state).expect("Up has moves");
//! println!("Best action: {:?}", result.best_action);
//! println!("Root value: {}", result.root_value);
//!
//! let policy = result.typed_policy().expect("valid policy");
//! assert!((policy.sum() - 1.0).abs() < 1e-5);
//! ```

pub mod config;
pub mod evaluator;
mod node;
pub mod search;
mod tree;

pub use config::MctsConfig;
pub use evaluator::{Evaluation, Evaluator, OracleEvaluator, RolloutEvaluator, UniformEvaluator};
pub use search::{select_puct, visit_policy, Mcts, SearchResult};
