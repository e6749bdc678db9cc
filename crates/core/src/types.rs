//! Search output types with enforced invariants.
//!
//! - Policy: probability distribution over the action space summing to 1.0
//! - Value: game value in range [-1, 1]

use crate::{Result, UpDownError};

/// Tolerance for policy sum validation.
pub(crate) const POLICY_SUM_TOLERANCE: f32 = 1e-5;

/// A probability distribution over action indices.
///
/// Invariant: All values are finite, non-negative and sum to 1.0 (±1e-5).
///
/// # Example
/// ```
/// use updown_core::Policy;
///
/// let policy = Policy::new(vec![0.25, 0.5, 0.25]).unwrap();
/// assert!((policy.sum() - 1.0).abs() < 1e-5);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Policy(Vec<f32>);

impl Policy {
    /// Create a new policy from a probability distribution.
    ///
    /// # Errors
    /// Returns `UpDownError::InvalidPolicy` if the vector is empty, holds a
    /// negative or non-finite entry, or does not sum to 1.0.
    pub fn new(probs: Vec<f32>) -> Result<Self> {
        check_entries(&probs)?;

        let sum: f32 = probs.iter().sum();
        if (sum - 1.0).abs() > POLICY_SUM_TOLERANCE {
            return Err(UpDownError::InvalidPolicy(format!(
                "policy sum {} is not 1.0 (tolerance {})",
                sum, POLICY_SUM_TOLERANCE
            )));
        }

        Ok(Self(probs))
    }

    /// Create a policy from raw weights, normalizing them to sum to 1.0.
    ///
    /// # Errors
    /// Returns error if any weight is negative or all weights are zero.
    pub fn from_unnormalized(weights: Vec<f32>) -> Result<Self> {
        check_entries(&weights)?;

        let sum: f32 = weights.iter().sum();
        if sum == 0.0 {
            return Err(UpDownError::InvalidPolicy(
                "cannot normalize: all weights are zero".to_string(),
            ));
        }

        Ok(Self(weights.iter().map(|&w| w / sum).collect()))
    }

    /// A distribution putting all mass on `index`.
    pub fn one_hot(len: usize, index: usize) -> Result<Self> {
        if index >= len {
            return Err(UpDownError::InvalidPolicy(format!(
                "one-hot index {} outside action space of {}",
                index, len
            )));
        }
        let mut probs = vec![0.0; len];
        probs[index] = 1.0;
        Ok(Self(probs))
    }

    /// Uniform distribution over `indices` within an action space of `len`.
    pub fn uniform_over(len: usize, indices: &[usize]) -> Result<Self> {
        let mut weights = vec![0.0; len];
        for &i in indices {
            if i >= len {
                return Err(UpDownError::InvalidPolicy(format!(
                    "index {} outside action space of {}",
                    i, len
                )));
            }
            weights[i] = 1.0;
        }
        Self::from_unnormalized(weights)
    }

    /// Get the probability at the given index, returning 0 if out of bounds.
    pub fn get_or_zero(&self, index: usize) -> f32 {
        self.0.get(index).copied().unwrap_or(0.0)
    }

    /// Number of action indices covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed policy.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all probabilities (~1.0).
    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Index of the maximum probability, lowest index on ties.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.0.iter().enumerate() {
            if p > self.0[best] {
                best = i;
            }
        }
        best
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.0.iter()
    }
}

fn check_entries(values: &[f32]) -> Result<()> {
    if values.is_empty() {
        return Err(UpDownError::InvalidPolicy(
            "policy cannot be empty".to_string(),
        ));
    }
    if values.iter().any(|&p| !p.is_finite() || p < 0.0) {
        return Err(UpDownError::InvalidPolicy(
            "policy contains negative or non-finite values".to_string(),
        ));
    }
    Ok(())
}

impl std::ops::Index<usize> for Policy {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// A game value estimate.
///
/// Invariant: Value is in range [-1, 1] where:
/// - +1 means the player to move is winning
/// - -1 means the player to move is losing
///
/// # Example
/// ```
/// use updown_core::Value;
///
/// let value = Value::new(0.5).unwrap();
/// assert_eq!(value.negate().get(), -0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value(f32);

impl Value {
    /// Create a new value.
    ///
    /// # Errors
    /// Returns `UpDownError::InvalidValue` if the value is outside [-1, 1].
    pub fn new(value: f32) -> Result<Self> {
        if !(-1.0..=1.0).contains(&value) {
            return Err(UpDownError::InvalidValue(format!(
                "value {} is outside range [-1, 1]",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Create a value by clamping to [-1, 1]. NaN maps to 0.
    pub fn clamped(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(-1.0, 1.0))
    }

    /// Value for a win.
    pub const WIN: Self = Self(1.0);

    /// Value for a loss.
    pub const LOSS: Self = Self(-1.0);

    pub fn get(self) -> f32 {
        self.0
    }

    /// Negate the value (for opponent's perspective).
    pub fn negate(self) -> Self {
        Self(-self.0)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<Value> for f32 {
    fn from(v: Value) -> f32 {
        v.0
    }
}
