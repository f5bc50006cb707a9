//! Bitstring → probability histogram
//!
//! Keys are bitstrings with character `i` giving the value of qubit `i`
//! (see [`qcut_core::index_to_bitstring`]). The map is ordered, so iteration
//! and serialization are deterministic.

use crate::error::{Result, StateError};
use qcut_core::{index_to_bitstring, parse_bitstring};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized measurement histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleHistogram {
    num_bits: usize,
    /// Number of shots behind the frequencies; `None` for exact distributions
    shots: Option<usize>,
    probabilities: BTreeMap<String, f64>,
}

impl SampleHistogram {
    /// Build from per-index shot counts
    ///
    /// Outcomes never observed are omitted.
    ///
    /// # Errors
    /// Returns error if `counts` is not `2^num_bits` long or holds no shots
    pub fn from_counts(num_bits: usize, counts: &[usize]) -> Result<Self> {
        check_dimension(num_bits, counts.len())?;
        let shots: usize = counts.iter().sum();
        if shots == 0 {
            return Err(StateError::InvalidDistribution("no shots recorded".to_string()));
        }

        let probabilities = counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(index, &c)| (index_to_bitstring(index, num_bits), c as f64 / shots as f64))
            .collect();

        Ok(Self {
            num_bits,
            shots: Some(shots),
            probabilities,
        })
    }

    /// Build from an exact probability vector in index order
    ///
    /// Zero-probability outcomes are omitted; the rest are renormalized.
    ///
    /// # Errors
    /// Returns error on a length mismatch or an invalid distribution
    pub fn from_probabilities(num_bits: usize, probabilities: &[f64]) -> Result<Self> {
        check_dimension(num_bits, probabilities.len())?;
        let entries = probabilities
            .iter()
            .enumerate()
            .filter(|(_, &p)| p != 0.0)
            .map(|(index, &p)| (index_to_bitstring(index, num_bits), p));
        Self::normalized(num_bits, None, entries)
    }

    /// Build from bitstring-keyed weights (e.g. counts returned by a remote service)
    ///
    /// # Errors
    /// Returns error if a key is not a `num_bits`-wide bitstring or the
    /// weights do not form a distribution
    pub fn from_map(
        num_bits: usize,
        shots: Option<usize>,
        weights: BTreeMap<String, f64>,
    ) -> Result<Self> {
        for key in weights.keys() {
            match parse_bitstring(key) {
                Some(bits) if bits.len() == num_bits => {},
                Some(bits) => {
                    return Err(StateError::DimensionMismatch {
                        expected: num_bits,
                        actual: bits.len(),
                    })
                },
                None => {
                    return Err(StateError::InvalidDistribution(format!(
                        "malformed bitstring {:?}",
                        key
                    )))
                },
            }
        }
        Self::normalized(num_bits, shots, weights)
    }

    fn normalized(
        num_bits: usize,
        shots: Option<usize>,
        entries: impl IntoIterator<Item = (String, f64)>,
    ) -> Result<Self> {
        let entries: Vec<(String, f64)> = entries.into_iter().collect();
        if let Some((key, p)) = entries.iter().find(|(_, p)| !p.is_finite() || *p < 0.0) {
            return Err(StateError::InvalidDistribution(format!(
                "weight {} for {} is not a non-negative number",
                p, key
            )));
        }
        let total: f64 = entries.iter().map(|(_, p)| p).sum();
        if total <= 0.0 {
            return Err(StateError::InvalidDistribution("weights sum to zero".to_string()));
        }

        let probabilities = entries
            .into_iter()
            .map(|(key, p)| (key, p / total))
            .collect();

        Ok(Self {
            num_bits,
            shots,
            probabilities,
        })
    }

    /// Bitstring width
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Shot count, if the histogram came from sampling
    #[inline]
    pub fn shots(&self) -> Option<usize> {
        self.shots
    }

    /// Number of distinct outcomes
    #[inline]
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// True if no outcome is present
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Probability of a bitstring (0 if absent)
    pub fn probability(&self, bitstring: &str) -> f64 {
        self.probabilities.get(bitstring).copied().unwrap_or(0.0)
    }

    /// Outcomes in lexicographic bitstring order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.probabilities.iter().map(|(k, &p)| (k.as_str(), p))
    }

    /// Underlying ordered map
    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.probabilities
    }

    /// Sum of all probabilities (1 up to rounding)
    pub fn total(&self) -> f64 {
        self.probabilities.values().sum()
    }

    /// Outcomes sorted by descending probability, ties lexicographic
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

fn check_dimension(num_bits: usize, actual: usize) -> Result<()> {
    if num_bits >= usize::BITS as usize {
        return Err(StateError::TooManyQubits {
            num_qubits: num_bits,
            max_qubits: usize::BITS as usize - 1,
        });
    }
    let expected = 1usize << num_bits;
    if actual != expected {
        return Err(StateError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
