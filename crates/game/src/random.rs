//! Random games on (almost) uniformly random posets.

use std::collections::BTreeMap;

use rand::Rng;
use updown_core::Result;
use updown_poset::uniform_random_dag;

use crate::game::UpDown;
use crate::Color;

/// Parameters of random game generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomGameConfig {
    /// The Markov chain runs `n^markov_exponent` steps.
    pub markov_exponent: u32,
    /// Steps added on top of `n^markov_exponent`.
    pub extra_steps: usize,
    /// Color nodes uniformly at random instead of all Green.
    pub colored: bool,
}

impl Default for RandomGameConfig {
    fn default() -> Self {
        Self {
            markov_exponent: 2,
            extra_steps: 0,
            colored: false,
        }
    }
}

impl RandomGameConfig {
    /// Default chain length with random colors.
    pub fn colored() -> Self {
        Self {
            colored: true,
            ..Self::default()
        }
    }
}

impl UpDown {
    /// A game on `n` nodes labelled `0..n` whose poset is drawn (almost)
    /// uniformly at random.
    pub fn random<R: Rng + ?Sized>(n: usize, config: &RandomGameConfig, rng: &mut R) -> Result<Self> {
        let dag = uniform_random_dag(n, config.markov_exponent, config.extra_steps, None, rng)?;
        let coloring = config.colored.then(|| {
            dag.nodes()
                .map(|v| (v, Color::ALL[rng.gen_range(0..Color::ALL.len())]))
                .collect::<BTreeMap<_, _>>()
        });
        UpDown::new(dag, coloring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_game_is_reduced_and_sized() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let game = UpDown::random(7, &RandomGameConfig::default(), &mut rng).unwrap();
        assert_eq!(game.node_count(), 7);
        assert_eq!(game.dag().transitive_reduction(), *game.dag());
        assert!(game.coloring().values().all(|&c| c == Color::Green));
    }

    #[test]
    fn test_colored_random_games_use_every_color() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let game = UpDown::random(30, &RandomGameConfig::colored(), &mut rng).unwrap();
        for color in Color::ALL {
            assert!(game.coloring().values().any(|&c| c == color));
        }
    }
}
