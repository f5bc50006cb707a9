//! Histogram → partition decoding
//!
//! Entries below the probability floor `ε` are dropped as noise. The most
//! probable remaining bitstring wins; probabilities within [`TIE_TOLERANCE`]
//! of each other count as equal and the lexicographically smallest bitstring
//! is taken, so the result is deterministic. Character `i` of the winner
//! assigns `node_ids[i]` to group 0 or 1.

use qcut_core::{parse_bitstring, Graph};
use qcut_state::SampleHistogram;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Probabilities closer than this are treated as tied
pub const TIE_TOLERANCE: f64 = 1e-12;

/// Decoding failure; no partial partition is produced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Histogram is empty")]
    EmptyHistogram,

    #[error("No outcome reaches the probability floor {epsilon} (largest is {max_probability})")]
    AllBelowThreshold { epsilon: f64, max_probability: f64 },

    #[error("Bitstring width {actual} does not match {expected} node IDs")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("Malformed bitstring {0:?}")]
    MalformedBitstring(String),
}

/// One node's side of the cut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAssignment {
    pub id: String,
    /// 0 or 1
    pub group: u8,
    /// Share of retained probability mass that puts this node in `group`
    pub confidence: f64,
}

/// Two-way partition of the graph nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    bitstring: String,
    probability: f64,
    assignments: Vec<NodeAssignment>,
}

impl Partition {
    /// Winning bitstring
    pub fn bitstring(&self) -> &str {
        &self.bitstring
    }

    /// Probability of the winning bitstring in the histogram
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Per-node assignments in node order
    pub fn assignments(&self) -> &[NodeAssignment] {
        &self.assignments
    }

    fn find(&self, id: &str) -> Option<&NodeAssignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    /// Group of a node
    pub fn group(&self, id: &str) -> Option<u8> {
        self.find(id).map(|a| a.group)
    }

    /// Confidence of a node's assignment
    pub fn confidence(&self, id: &str) -> Option<f64> {
        self.find(id).map(|a| a.confidence)
    }

    /// Node IDs in group 0 and group 1
    pub fn groups(&self) -> (Vec<&str>, Vec<&str>) {
        let mut zero = Vec::new();
        let mut one = Vec::new();
        for a in &self.assignments {
            if a.group == 0 {
                zero.push(a.id.as_str());
            } else {
                one.push(a.id.as_str());
            }
        }
        (zero, one)
    }

    /// Whether two nodes ended up on opposite sides
    pub fn separates(&self, a: &str, b: &str) -> bool {
        matches!((self.group(a), self.group(b)), (Some(x), Some(y)) if x != y)
    }

    /// Weight of the graph edges this partition cuts
    ///
    /// Returns `None` if a graph node is missing from the partition.
    pub fn cut_value(&self, graph: &Graph) -> Option<f64> {
        let bits = graph
            .nodes()
            .iter()
            .map(|node| self.group(&node.id))
            .collect::<Option<Vec<u8>>>()?;
        Some(graph.cut_value(&bits))
    }
}

/// Decode a partition from a measurement histogram
///
/// # Errors
/// - [`DecodeError::EmptyHistogram`] if there are no entries
/// - [`DecodeError::WidthMismatch`] if the bitstring width differs from the
///   node count
/// - [`DecodeError::MalformedBitstring`] for a key that is not a bitstring
/// - [`DecodeError::AllBelowThreshold`] if every entry is below `epsilon`
///
/// # Example
/// ```
/// use qcut_sim::decode;
/// use qcut_state::SampleHistogram;
///
/// // "01" and "10" tie at 0.45
/// let histogram = SampleHistogram::from_counts(2, &[10, 45, 45, 0]).unwrap();
/// let partition = decode(&histogram, &["a".into(), "b".into()], 0.01).unwrap();
/// assert_eq!(partition.bitstring(), "01");
/// assert_eq!(partition.group("b"), Some(1));
/// ```
pub fn decode(
    histogram: &SampleHistogram,
    node_ids: &[String],
    epsilon: f64,
) -> Result<Partition, DecodeError> {
    if histogram.is_empty() {
        return Err(DecodeError::EmptyHistogram);
    }
    let width = node_ids.len();
    if histogram.num_bits() != width {
        return Err(DecodeError::WidthMismatch {
            expected: width,
            actual: histogram.num_bits(),
        });
    }

    let mut retained: Vec<(&str, Vec<u8>, f64)> = Vec::new();
    let mut max_probability = 0.0f64;
    for (key, probability) in histogram.iter() {
        let bits = parse_bitstring(key).ok_or_else(|| DecodeError::MalformedBitstring(key.to_string()))?;
        if bits.len() != width {
            return Err(DecodeError::WidthMismatch {
                expected: width,
                actual: bits.len(),
            });
        }
        max_probability = max_probability.max(probability);
        if probability >= epsilon {
            retained.push((key, bits, probability));
        }
    }

    // Keys arrive in lexicographic order, so the first of a tie is kept
    let mut winner: Option<&(&str, Vec<u8>, f64)> = None;
    for entry in &retained {
        match winner {
            Some(best) if entry.2 <= best.2 + TIE_TOLERANCE => {},
            _ => winner = Some(entry),
        }
    }
    let (bitstring, bits, probability) = winner.ok_or(DecodeError::AllBelowThreshold {
        epsilon,
        max_probability,
    })?;

    let total: f64 = retained.iter().map(|e| e.2).sum();
    let assignments = node_ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let agreeing: f64 = retained
                .iter()
                .filter(|e| e.1[i] == bits[i])
                .map(|e| e.2)
                .sum();
            NodeAssignment {
                id: id.clone(),
                group: bits[i],
                confidence: agreeing / total,
            }
        })
        .collect();

    Ok(Partition {
        bitstring: bitstring.to_string(),
        probability: *probability,
        assignments,
    })
}
