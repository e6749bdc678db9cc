//! PUCT tree search.
//!
//! One search run expands the root, then repeats simulations: descend through
//! expanded nodes by the PUCT score, evaluate the first unexpanded node (or
//! score a terminal one as a loss for its mover) and back the value up to the
//! root, flipping its sign at every level.
//!
//! Nodes do not store positions. A simulation re-applies the actions along
//! its path to the root state, so the tree only holds statistics.

use crate::{
    config::MctsConfig,
    evaluator::Evaluator,
    node::NodeId,
    tree::Tree,
};
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};
use std::hash::Hash;
use std::marker::PhantomData;
use tracing::{debug, instrument, trace};
use updown_core::{Game, Policy, Result, UpDownError, Value};

/// Result of a search run, read off the root.
#[derive(Clone, Debug)]
pub struct SearchResult<A: Clone + Copy + Eq + Hash> {
    /// Visit count of every valid root action, in ascending index order.
    pub visit_counts: Vec<(A, u32)>,

    /// Most visited action, lowest index on ties.
    /// For temperature-based selection, use `select_action()` instead.
    pub best_action: A,

    /// Visit counts normalized over the whole action space (temperature 1).
    pub policy: Vec<f32>,

    /// ΣW / ΣN at the root, from the perspective of the player to move.
    pub root_value: f32,

    visits: Vec<u32>,
    valid_actions: Vec<usize>,
}

impl<A: Clone + Copy + Eq + Hash> SearchResult<A> {
    /// Visit policy at the given temperature (see [`visit_policy`]).
    pub fn policy(&self, temperature: f32) -> Result<Policy> {
        visit_policy(&self.visits, &self.valid_actions, temperature)
    }

    /// Select an action using temperature-based sampling.
    ///
    /// - temperature = 0: always return best action (greedy)
    /// - temperature = 1: sample proportional to visit counts
    /// - temperature > 1: more uniform distribution
    ///
    /// Formula: P(a) ∝ N(a)^(1/τ) where τ is temperature
    pub fn select_action<R: Rng + ?Sized>(&self, temperature: f32, rng: &mut R) -> A {
        if temperature <= 0.0 || self.visit_counts.len() <= 1 {
            return self.best_action;
        }
        let policy = match self.policy(temperature) {
            Ok(policy) => policy,
            Err(_) => return self.best_action,
        };

        let threshold: f32 = rng.gen::<f32>();
        let mut cumulative = 0.0;
        for (&index, &(action, _)) in self.valid_actions.iter().zip(&self.visit_counts) {
            cumulative += policy.get_or_zero(index);
            if cumulative >= threshold {
                return action;
            }
        }

        // rounding left the cumulative sum just below the threshold
        self.best_action
    }

    /// Get the best action (greedy selection).
    pub fn best(&self) -> A {
        self.best_action
    }

    /// Raw root visit counts over the whole action space.
    pub fn visits(&self) -> &[u32] {
        &self.visits
    }

    /// Valid root action indices, ascending.
    pub fn valid_actions(&self) -> &[usize] {
        &self.valid_actions
    }

    /// Get the policy as a typed Policy (enforces sum to 1.0 invariant).
    ///
    /// # Errors
    /// Returns error if policy doesn't sum to 1.0 (indicates a bug).
    pub fn typed_policy(&self) -> Result<Policy> {
        Policy::new(self.policy.clone())
    }

    /// Get the root value as a typed Value (enforces [-1, 1] range invariant).
    pub fn typed_value(&self) -> Value {
        Value::clamped(self.root_value)
    }
}

/// Index of the valid action with the highest PUCT score.
///
/// score(a) = Q(a) + U(a) with Q(a) = W(a) / (1 + N(a)) and
/// U(a) = c · √ΣN · P(a) / (1 + N(a)). Actions outside `valid` are never
/// chosen; ties go to the lowest index. Returns `None` when `valid` is empty.
///
/// # Panics
/// Panics if a valid index is outside the statistics vectors.
pub fn select_puct(
    visits: &[u32],
    values: &[f32],
    priors: &[f32],
    valid: &[usize],
    c_puct: f32,
) -> Option<usize> {
    let total: u32 = visits.iter().sum();
    let sqrt_total = (total as f32).sqrt();

    let mut best: Option<(usize, f32)> = None;
    for &action in valid {
        let n = 1.0 + visits[action] as f32;
        let score = values[action] / n + c_puct * sqrt_total * priors[action] / n;
        let score = if score.is_nan() { f32::NEG_INFINITY } else { score };
        best = match best {
            Some((b, s)) if s > score || (s == score && b < action) => Some((b, s)),
            _ => Some((action, score)),
        };
    }
    best.map(|(action, _)| action)
}

/// Turn visit counts into a policy over the whole action space.
///
/// With temperature 0 the result is one-hot on the most visited valid action
/// (lowest index on ties). Otherwise each valid action gets weight
/// (N(a) / max N)^(1/T), renormalized; if no valid action has been visited
/// the policy is uniform over `valid`. Invalid actions always get 0.
///
/// # Errors
/// `NoLegalMoves` when `valid` is empty, `InvalidPolicy` when an index is out
/// of range or the temperature is not a number.
pub fn visit_policy(visits: &[u32], valid: &[usize], temperature: f32) -> Result<Policy> {
    if valid.is_empty() {
        return Err(UpDownError::NoLegalMoves);
    }
    if let Some(&index) = valid.iter().find(|&&i| i >= visits.len()) {
        return Err(UpDownError::InvalidPolicy(format!(
            "action {} outside action space of {}",
            index,
            visits.len()
        )));
    }

    if temperature <= 0.0 {
        let mut best = valid[0];
        for &a in valid {
            if visits[a] > visits[best] || (visits[a] == visits[best] && a < best) {
                best = a;
            }
        }
        return Policy::one_hot(visits.len(), best);
    }

    let max_visits = valid.iter().map(|&a| visits[a]).max().unwrap_or(0);
    if max_visits == 0 {
        return Policy::uniform_over(visits.len(), valid);
    }

    // scale by the maximum first so large counts and small temperatures stay finite
    let inv_temp = 1.0 / temperature as f64;
    let mut weights = vec![0.0; visits.len()];
    for &a in valid {
        weights[a] = (visits[a] as f64 / max_visits as f64).powf(inv_temp) as f32;
    }
    Policy::from_unnormalized(weights)
}

/// Monte Carlo Tree Search with PUCT selection.
///
/// Generic over:
/// - `G`: The game being played
/// - `E`: The evaluation strategy (the oracle)
/// - `R`: The random number generator for root noise
pub struct Mcts<G: Game, E: Evaluator<G>, R: Rng> {
    config: MctsConfig,
    evaluator: E,
    rng: R,
    tree: Tree,
    _game: PhantomData<G>,
}

impl<G, E, R> Mcts<G, E, R>
where
    G: Game,
    E: Evaluator<G>,
    R: Rng,
{
    /// Create a new MCTS instance.
    pub fn new(config: MctsConfig, evaluator: E, rng: R) -> Self {
        Self {
            config,
            evaluator,
            rng,
            tree: Tree::new(0),
            _game: PhantomData,
        }
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Number of nodes created by the last search.
    pub fn tree_size(&self) -> usize {
        self.tree.len()
    }

    /// Run a search from `state`.
    ///
    /// The root expansion counts as the first simulation.
    ///
    /// # Errors
    /// - `NoLegalMoves` if the player to move at the root cannot move
    /// - any evaluator error, unchanged; the run is abandoned
    /// - `Oracle` if the evaluator returns priors of the wrong length
    /// - `GameTooLarge` if a legal action does not fit the action space
    #[instrument(skip(self, game, state), fields(simulations = self.config.num_simulations))]
    pub fn search(&mut self, game: &G, state: &G::State) -> Result<SearchResult<G::Action>> {
        if game.is_terminal(state) {
            return Err(UpDownError::NoLegalMoves);
        }

        let num_actions = game.num_actions();
        self.tree.reset(num_actions);
        let noise = self.root_noise(num_actions)?;

        for _ in 0..self.config.num_simulations.max(1) {
            self.simulate(game, state, noise.as_ref())?;
        }

        let result = self.extract_results(game)?;
        debug!(
            nodes = self.tree.len(),
            root_value = result.root_value,
            best = ?result.best_action,
            "search finished"
        );
        Ok(result)
    }

    /// One simulation: select down to a leaf, expand it, back its value up.
    fn simulate(
        &mut self,
        game: &G,
        root_state: &G::State,
        noise: Option<&Dirichlet<f32>>,
    ) -> Result<()> {
        let mut state = root_state.clone();
        let mut current = NodeId::ROOT;

        loop {
            let node = self.tree.get(current);
            if node.terminal || !node.expanded {
                break;
            }
            // INVARIANT: expanded non-terminal nodes have at least one valid action
            let index = self
                .select(current, noise)
                .expect("BUG: expanded node without valid actions");
            let action = game
                .index_to_action(index)
                .expect("BUG: valid action index has no action");
            state = game.apply(&state, action)?;
            current = self.tree.child(current, index);
        }

        let value = if self.tree.get(current).terminal {
            terminal_value(game, &state)
        } else {
            self.expand(game, &state, current)?
        };
        self.backup(current, value);
        Ok(())
    }

    /// PUCT choice at `id`; the root's priors are blended with fresh noise.
    fn select(&mut self, id: NodeId, noise: Option<&Dirichlet<f32>>) -> Option<usize> {
        let node = self.tree.get(id);
        let stats = &node.stats;
        match noise {
            Some(dirichlet) if id == NodeId::ROOT => {
                let eps = self.config.dirichlet_epsilon;
                let sample = sample_noise(dirichlet, &mut self.rng, stats.priors.len());
                let priors: Vec<f32> = stats
                    .priors
                    .iter()
                    .zip(&sample)
                    .map(|(p, n)| (1.0 - eps) * p + eps * n)
                    .collect();
                select_puct(
                    &stats.visits,
                    &stats.values,
                    &priors,
                    &node.valid_actions,
                    self.config.c_puct,
                )
            }
            _ => select_puct(
                &stats.visits,
                &stats.values,
                &stats.priors,
                &node.valid_actions,
                self.config.c_puct,
            ),
        }
    }

    /// Evaluate a leaf and record its priors and valid actions.
    ///
    /// A position with no legal action is marked terminal and never reaches
    /// the evaluator.
    fn expand(&mut self, game: &G, state: &G::State, id: NodeId) -> Result<f32> {
        let legal_actions = game.legal_actions(state);
        if game.is_terminal(state) || legal_actions.is_empty() {
            self.tree.get_mut(id).terminal = true;
            return Ok(terminal_value(game, state));
        }

        let num_actions = game.num_actions();
        let mut valid: Vec<usize> = legal_actions
            .into_iter()
            .map(|a| game.action_to_index(a))
            .collect();
        valid.sort_unstable();
        if let Some(&index) = valid.iter().find(|&&i| i >= num_actions) {
            return Err(UpDownError::GameTooLarge {
                node: index,
                max_nodes: num_actions,
            });
        }

        let evaluation = self.evaluator.evaluate(game, state)?;
        if evaluation.policy.len() != num_actions {
            return Err(UpDownError::Oracle(format!(
                "evaluator returned {} priors for {} actions",
                evaluation.policy.len(),
                num_actions
            )));
        }

        trace!(node = id.0, valid = valid.len(), value = evaluation.value, "expand");
        let node = self.tree.get_mut(id);
        node.stats.priors = evaluation.policy;
        node.valid_actions = valid;
        node.expanded = true;
        Ok(evaluation.value)
    }

    /// Add `value` (from the leaf mover's perspective) along the path to the
    /// root. The parent of the leaf sees `-value`, its parent `+value`, ...
    fn backup(&mut self, leaf: NodeId, value: f32) {
        let mut sign = -1.0;
        let mut current = leaf;
        while let (Some(parent), Some(action)) =
            (self.tree.get(current).parent, self.tree.get(current).action)
        {
            let stats = &mut self.tree.get_mut(parent).stats;
            stats.visits[action] += 1;
            stats.values[action] += sign * value;
            sign = -sign;
            current = parent;
        }
    }

    /// Root noise distribution over the whole action space, if enabled.
    fn root_noise(&self, num_actions: usize) -> Result<Option<Dirichlet<f32>>> {
        // Dirichlet needs at least two components
        if self.config.dirichlet_epsilon <= 0.0 || num_actions < 2 {
            return Ok(None);
        }
        let alpha = vec![self.config.dirichlet_alpha; num_actions];
        Dirichlet::new(&alpha).map(Some).map_err(|e| {
            UpDownError::InvalidPolicy(format!(
                "Dirichlet concentration {}: {:?}",
                self.config.dirichlet_alpha, e
            ))
        })
    }

    fn extract_results(&self, game: &G) -> Result<SearchResult<G::Action>> {
        let root = self.tree.root();
        let visits = root.stats.visits.clone();
        let valid_actions = root.valid_actions.clone();

        let to_action = |index: usize| {
            game.index_to_action(index)
                .expect("BUG: valid action index has no action")
        };
        let visit_counts = valid_actions
            .iter()
            .map(|&i| (to_action(i), visits[i]))
            .collect();
        let best_action = to_action(visit_policy(&visits, &valid_actions, 0.0)?.argmax());
        let policy = visit_policy(&visits, &valid_actions, 1.0)?.into_inner();

        Ok(SearchResult {
            visit_counts,
            best_action,
            policy,
            root_value: root.stats.mean_value(),
            visits,
            valid_actions,
        })
    }
}

/// Value of a terminal position for its mover: the negated outcome of the
/// player who just moved, a loss if the game does not say.
fn terminal_value<G: Game>(game: &G, state: &G::State) -> f32 {
    game.outcome(state).map_or(-1.0, |outcome| -outcome)
}

/// One Dirichlet sample, replaced by the uniform vector if it degenerates
/// (tiny concentrations can underflow to NaN in single precision).
fn sample_noise<R: Rng + ?Sized>(dirichlet: &Dirichlet<f32>, rng: &mut R, len: usize) -> Vec<f32> {
    let sample: Vec<f32> = dirichlet.sample(rng);
    if sample.len() == len && sample.iter().all(|x| x.is_finite()) {
        sample
    } else {
        vec![1.0 / len as f32; len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Evaluation, OracleEvaluator, RolloutEvaluator, UniformEvaluator};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use updown_game::{FixedEncoding, GameState, Player, UpDown, UpDownRules};

    fn greedy(simulations: usize) -> Mcts<UpDownRules, UniformEvaluator, ChaCha8Rng> {
        Mcts::new(
            MctsConfig::for_evaluation(simulations),
            UniformEvaluator,
            ChaCha8Rng::seed_from_u64(0),
        )
    }

    #[test]
    fn test_terminal_root_has_no_moves() {
        let rules = UpDownRules::new(4);
        let state = GameState::new(UpDown::empty(), Player::Up);
        assert_eq!(
            greedy(10).search(&rules, &state).unwrap_err(),
            UpDownError::NoLegalMoves
        );
    }

    #[test]
    fn test_single_node_is_a_sure_win() {
        let rules = UpDownRules::new(4);
        let state = GameState::new(UpDown::nim(&[1]), Player::Up);
        let result = greedy(10).search(&rules, &state).unwrap();

        assert_eq!(result.best_action, 0);
        assert_eq!(result.visit_counts, vec![(0, 9)]);
        assert!((result.root_value - 1.0).abs() < 1e-6);
        assert_eq!(result.policy, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_finds_the_winning_nim_move() {
        // heaps [1, 2]: only leaving [1, 1] wins, by taking the top of the 2-heap
        let rules = UpDownRules::new(4);
        let state = GameState::new(UpDown::nim(&[1, 2]), Player::Up);
        let result = greedy(300).search(&rules, &state).unwrap();

        assert_eq!(result.best_action, 2);
        assert!(result.root_value > 0.0);
    }

    #[test]
    fn test_visits_add_up() {
        let rules = UpDownRules::new(8);
        let state = GameState::new(UpDown::nim(&[2, 3]), Player::Down);
        let result = greedy(50).search(&rules, &state).unwrap();

        // the root expansion is the first of the 50 simulations
        let total: u32 = result.visit_counts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 49);
        assert_eq!(result.valid_actions(), &[0, 1, 2, 3, 4]);
        assert!((result.policy.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(result.typed_policy().is_ok());
    }

    #[test]
    fn test_search_is_deterministic() {
        let rules = UpDownRules::new(8);
        let state = GameState::new(UpDown::complete_bipartite(&[(2, 2)]), Player::Up);
        let run = |seed: u64| {
            let rng = ChaCha8Rng::seed_from_u64(seed);
            let evaluator = RolloutEvaluator::new(rng.clone(), 20);
            let mut mcts = Mcts::new(MctsConfig::with_simulations(60), evaluator, rng);
            mcts.search(&rules, &state).unwrap()
        };
        let (a, b) = (run(7), run(7));
        assert_eq!(a.visit_counts, b.visit_counts);
        assert_eq!(a.best_action, b.best_action);
        assert_eq!(a.root_value, b.root_value);
    }

    #[test]
    fn test_noise_never_selects_invalid_actions() {
        // only node 0 is Blue; Up has a single legal move whatever the noise says
        use std::collections::BTreeMap;
        use updown_game::{Color, Dag};

        let coloring = BTreeMap::from([(0, Color::Blue), (1, Color::Red), (2, Color::Red)]);
        let game = UpDown::from_reduced(Dag::antichain(3), Some(coloring));
        let rules = UpDownRules::new(6);
        let config = MctsConfig {
            dirichlet_epsilon: 1.0,
            ..MctsConfig::with_simulations(40)
        };
        let mut mcts = Mcts::new(config, UniformEvaluator, ChaCha8Rng::seed_from_u64(3));
        let result = mcts
            .search(&rules, &GameState::new(game, Player::Up))
            .unwrap();

        assert_eq!(result.visit_counts, vec![(0, 39)]);
        assert!(result.visits().iter().skip(1).all(|&n| n == 0));
    }

    #[test]
    fn test_oracle_failure_aborts_search() {
        let rules = UpDownRules::new(4);
        let state = GameState::new(UpDown::nim(&[2]), Player::Up);
        let oracle = OracleEvaluator::new(|_: &FixedEncoding| -> Result<(Vec<f32>, f32)> {
            Err(UpDownError::Oracle("unavailable".to_string()))
        });
        let mut mcts = Mcts::new(
            MctsConfig::with_simulations(10),
            oracle,
            ChaCha8Rng::seed_from_u64(0),
        );
        assert_eq!(
            mcts.search(&rules, &state).unwrap_err(),
            UpDownError::Oracle("unavailable".to_string())
        );
    }

    struct ShortPriors;

    impl Evaluator<UpDownRules> for ShortPriors {
        fn evaluate(&self, _: &UpDownRules, _: &GameState) -> Result<Evaluation> {
            Ok(Evaluation {
                policy: vec![1.0],
                value: 0.0,
            })
        }
    }

    #[test]
    fn test_wrong_prior_length_is_an_oracle_error() {
        let rules = UpDownRules::new(4);
        let state = GameState::new(UpDown::nim(&[2]), Player::Up);
        let mut mcts = Mcts::new(
            MctsConfig::with_simulations(5),
            ShortPriors,
            ChaCha8Rng::seed_from_u64(0),
        );
        assert!(matches!(
            mcts.search(&rules, &state),
            Err(UpDownError::Oracle(_))
        ));
    }

    #[test]
    fn test_game_too_large_for_action_space() {
        let rules = UpDownRules::new(2);
        let state = GameState::new(UpDown::nim(&[3]), Player::Up);
        assert_eq!(
            greedy(5).search(&rules, &state).unwrap_err(),
            UpDownError::GameTooLarge {
                node: 2,
                max_nodes: 2
            }
        );
    }

    #[test]
    fn test_select_puct_prefers_prior_then_lowest_index() {
        let visits = [0, 0, 0, 0];
        let values = [0.0; 4];
        // nothing visited yet: every score is 0, lowest valid index wins
        assert_eq!(
            select_puct(&visits, &values, &[0.1, 0.2, 0.3, 0.4], &[1, 3], 1.0),
            Some(1)
        );

        let visits = [1, 1, 1, 1];
        assert_eq!(
            select_puct(&visits, &values, &[0.1, 0.2, 0.3, 0.4], &[0, 1, 2], 1.0),
            Some(2)
        );
        assert_eq!(
            select_puct(&visits, &values, &[0.5, 0.5, 0.0, 0.0], &[0, 1], 1.0),
            Some(0)
        );
        assert_eq!(select_puct(&visits, &values, &[0.25; 4], &[], 1.0), None);
    }

    #[test]
    fn test_select_puct_ignores_invalid_prior_mass() {
        let visits = [3, 0, 5];
        let values = [1.0, 0.0, 4.0];
        let priors = [0.0, 1.0, 0.0];
        assert_eq!(select_puct(&visits, &values, &priors, &[0, 2], 2.0), Some(2));
    }

    #[test]
    fn test_visit_policy_greedy() {
        let policy = visit_policy(&[3, 7, 7, 9], &[0, 1, 2], 0.0).unwrap();
        assert_eq!(policy.as_slice(), &[0.0, 1.0, 0.0, 0.0]);

        let policy = visit_policy(&[0, 0, 0], &[1, 2], 0.0).unwrap();
        assert_eq!(policy.as_slice(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_visit_policy_with_temperature() {
        let policy = visit_policy(&[1, 3, 0, 100], &[0, 1, 2], 1.0).unwrap();
        assert!((policy[0] - 0.25).abs() < 1e-6);
        assert!((policy[1] - 0.75).abs() < 1e-6);
        assert_eq!(policy[2], 0.0);
        assert_eq!(policy[3], 0.0);

        let sharp = visit_policy(&[1, 3], &[0, 1], 0.5).unwrap();
        assert!((sharp[0] - 0.1).abs() < 1e-6);

        let unvisited = visit_policy(&[0, 0, 0], &[0, 2], 1.0).unwrap();
        assert_eq!(unvisited.as_slice(), &[0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_visit_policy_errors() {
        assert_eq!(
            visit_policy(&[1, 2], &[], 1.0).unwrap_err(),
            UpDownError::NoLegalMoves
        );
        assert!(visit_policy(&[1, 2], &[5], 1.0).is_err());
    }

    #[test]
    fn test_select_action() {
        let rules = UpDownRules::new(8);
        let state = GameState::new(UpDown::nim(&[3]), Player::Up);
        let result = greedy(40).search(&rules, &state).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        assert_eq!(result.select_action(0.0, &mut rng), result.best_action);
        for _ in 0..20 {
            let action = result.select_action(1.0, &mut rng);
            assert!(result.valid_actions().contains(&action));
        }
    }
}
