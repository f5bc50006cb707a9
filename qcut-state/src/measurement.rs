//! Shot sampling from a probability distribution
//!
//! Uses Walker's alias method: `O(N)` table construction, `O(1)` per shot.
//! All randomness comes from the caller's RNG, so equal seeds give equal
//! shot sequences.

use crate::error::{Result, StateError};
use rand::Rng;

/// Alias table for O(1) sampling
#[derive(Debug, Clone)]
pub struct AliasTable {
    /// Acceptance threshold for each index
    prob: Vec<f64>,

    /// Alias index for each index
    alias: Vec<usize>,
}

impl AliasTable {
    /// Build an alias table from (possibly unnormalized) weights
    ///
    /// # Errors
    /// Returns error if the slice is empty, holds a negative or non-finite
    /// weight, or sums to zero
    pub fn new(weights: &[f64]) -> Result<Self> {
        let n = weights.len();
        if n == 0 {
            return Err(StateError::InvalidDistribution("no outcomes".to_string()));
        }
        if let Some(position) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(StateError::InvalidDistribution(format!(
                "weight {} at index {} is not a non-negative number",
                weights[position], position
            )));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(StateError::InvalidDistribution(
                "weights sum to zero".to_string(),
            ));
        }

        let mut scaled: Vec<f64> = weights.iter().map(|&w| w * n as f64 / total).collect();
        let mut prob = vec![0.0; n];
        let mut alias: Vec<usize> = (0..n).collect();

        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&i| scaled[i] < 1.0);

        while let (Some(&s), Some(&l)) = (small.last(), large.last()) {
            small.pop();
            prob[s] = scaled[s];
            alias[s] = l;
            scaled[l] = (scaled[l] + scaled[s]) - 1.0;
            if scaled[l] < 1.0 {
                large.pop();
                small.push(l);
            }
        }

        // Leftovers are 1.0 up to rounding
        for i in large.into_iter().chain(small) {
            prob[i] = 1.0;
        }

        Ok(Self { prob, alias })
    }

    /// Number of outcomes
    #[inline]
    pub fn len(&self) -> usize {
        self.prob.len()
    }

    /// Always false for a constructed table
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prob.is_empty()
    }

    /// Draw one outcome index
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let i = rng.gen_range(0..self.prob.len());
        if rng.gen::<f64>() < self.prob[i] {
            i
        } else {
            self.alias[i]
        }
    }
}

/// Draw `shots` outcomes and return per-index counts
///
/// # Errors
/// Returns error if the distribution is invalid
pub fn sample_counts<R: Rng + ?Sized>(
    probabilities: &[f64],
    shots: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let table = AliasTable::new(probabilities)?;
    let mut counts = vec![0usize; table.len()];
    for _ in 0..shots {
        counts[table.sample(rng)] += 1;
    }
    Ok(counts)
}
