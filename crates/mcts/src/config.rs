//! Search configuration parameters.

/// PUCT search configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct MctsConfig {
    /// Number of simulations per search.
    pub num_simulations: usize,

    /// Exploration constant `c` of the PUCT formula.
    pub c_puct: f32,

    /// Dirichlet noise concentration `η` (for root exploration).
    /// Higher values = more uniform noise, lower = more concentrated.
    pub dirichlet_alpha: f32,

    /// Fraction `ε` of the root prior replaced with Dirichlet noise.
    /// 0 = no exploration noise, 1 = pure noise.
    pub dirichlet_epsilon: f32,

    /// Temperature for turning root visit counts into a move.
    /// - 0.0: always pick highest visit count (greedy)
    /// - 1.0: sample proportional to visit counts
    pub temperature: f32,

    /// Move number from which the temperature drops to 0 (greedy).
    /// Set to 0 to always use the configured temperature.
    pub temperature_drop_move: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 600,
            c_puct: 1.0,
            dirichlet_alpha: 1.0,
            dirichlet_epsilon: 0.25,
            temperature: 1.0,
            temperature_drop_move: 2,
        }
    }
}

impl MctsConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }

    /// Create a config for evaluation (greedy action selection).
    pub fn for_evaluation(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            temperature: 0.0,
            temperature_drop_move: 0,
            // No exploration noise for evaluation
            dirichlet_epsilon: 0.0,
            ..Default::default()
        }
    }

    /// Get the effective temperature for a given move number.
    pub fn effective_temperature(&self, move_number: usize) -> f32 {
        if self.temperature_drop_move > 0 && move_number >= self.temperature_drop_move {
            0.0
        } else {
            self.temperature
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.num_simulations, 600);
        assert!((config.c_puct - 1.0).abs() < 1e-6);
        assert!((config.dirichlet_alpha - 1.0).abs() < 1e-6);
        assert!((config.dirichlet_epsilon - 0.25).abs() < 1e-6);
        assert!((config.temperature - 1.0).abs() < 1e-6);
        assert_eq!(config.temperature_drop_move, 2);
    }

    #[test]
    fn test_for_evaluation() {
        let config = MctsConfig::for_evaluation(100);
        assert_eq!(config.num_simulations, 100);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.dirichlet_epsilon, 0.0);
        assert_eq!(config.effective_temperature(0), 0.0);
    }

    #[test]
    fn test_effective_temperature() {
        let config = MctsConfig::default();
        assert!((config.effective_temperature(0) - 1.0).abs() < 1e-6);
        assert!((config.effective_temperature(1) - 1.0).abs() < 1e-6);
        assert_eq!(config.effective_temperature(2), 0.0);
        assert_eq!(config.effective_temperature(40), 0.0);

        let no_drop = MctsConfig {
            temperature_drop_move: 0,
            ..MctsConfig::default()
        };
        assert!((no_drop.effective_temperature(100) - 1.0).abs() < 1e-6);
    }
}
