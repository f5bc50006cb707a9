//! Max-Cut cost Hamiltonian
//!
//! Each edge `(i, j, w)` contributes `w/2 · (1 − s_i s_j)` where `s_k = ±1` is
//! the spin of node `k` (bit 0 → +1, bit 1 → −1). The builder keeps the
//! interaction part `Σ (w/2) s_i s_j` as a list of [`ZzTerm`]s and the constant
//! part `Σ w/2` as a separate offset, so
//!
//! ```text
//! cut(z) = offset − E(z),   E(z) = Σ c_ij s_i s_j
//! ```
//!
//! The optimizer minimizes `⟨E⟩`, which maximizes the expected cut.

use crate::bitstring::index_to_bitstring;
use crate::{Graph, Result};
use serde::{Deserialize, Serialize};

/// Largest qubit count for which [`CostHamiltonian::max_cut_brute_force`] runs
pub const MAX_BRUTE_FORCE_QUBITS: usize = 24;

/// A single `c · Z_i Z_j` interaction term with `i < j`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZzTerm {
    pub i: usize,
    pub j: usize,
    pub coefficient: f64,
}

impl ZzTerm {
    /// Create a term, canonicalizing the endpoint order
    pub fn new(a: usize, b: usize, coefficient: f64) -> Self {
        Self {
            i: a.min(b),
            j: a.max(b),
            coefficient,
        }
    }

    /// Spin product `s_i s_j` for a basis-state index
    #[inline]
    fn spin_product(&self, index: usize) -> f64 {
        if ((index >> self.i) ^ (index >> self.j)) & 1 == 0 {
            1.0
        } else {
            -1.0
        }
    }
}

/// Ising form of the Max-Cut objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostHamiltonian {
    num_qubits: usize,
    terms: Vec<ZzTerm>,
    offset: f64,
}

/// Build the cost Hamiltonian for a graph
///
/// The graph is validated first. Terms come out sorted by `(i, j)`, so the
/// result does not depend on edge insertion order or endpoint orientation.
///
/// # Errors
/// Returns any [`GraphError`](crate::GraphError) raised by [`Graph::validate`].
///
/// # Example
/// ```
/// use qcut_core::{build_hamiltonian, Graph};
///
/// let a = build_hamiltonian(&Graph::from_edges(3, &[(0, 1, 1.0), (1, 2, 2.0)])).unwrap();
/// let b = build_hamiltonian(&Graph::from_edges(3, &[(2, 1, 2.0), (0, 1, 1.0)])).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn build_hamiltonian(graph: &Graph) -> Result<CostHamiltonian> {
    graph.validate()?;

    let mut terms: Vec<ZzTerm> = graph
        .edges()
        .iter()
        .map(|e| ZzTerm::new(e.i, e.j, e.weight / 2.0))
        .collect();
    terms.sort_by(|a, b| (a.i, a.j).cmp(&(b.i, b.j)));

    // Summed after sorting so the offset is bit-identical across edge orders
    let offset = terms.iter().map(|t| t.coefficient).sum();

    Ok(CostHamiltonian {
        num_qubits: graph.num_nodes(),
        terms,
        offset,
    })
}

impl CostHamiltonian {
    /// Number of qubits (graph nodes)
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Interaction terms sorted by `(i, j)`
    pub fn terms(&self) -> &[ZzTerm] {
        &self.terms
    }

    /// Constant offset `Σ w/2`
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// True if every assignment has the same cost
    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|t| t.coefficient == 0.0)
    }

    /// Interaction energy `E(z)` for a basis-state index
    pub fn energy_of_index(&self, index: usize) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * t.spin_product(index))
            .sum()
    }

    /// Interaction energy `E(z)` for an assignment (position `i` = node `i`)
    pub fn interaction_energy(&self, bits: &[u8]) -> f64 {
        self.terms
            .iter()
            .map(|t| {
                if bits[t.i] == bits[t.j] {
                    t.coefficient
                } else {
                    -t.coefficient
                }
            })
            .sum()
    }

    /// Cut value `offset − E(z)` for an assignment
    pub fn cut_value(&self, bits: &[u8]) -> f64 {
        self.offset - self.interaction_energy(bits)
    }

    /// Energies of all `2^n` basis states, indexed with qubit `q` at bit `q`
    ///
    /// Allocates `8 · 2^n` bytes; callers bound `n` before calling.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..1usize << self.num_qubits)
            .map(|index| self.energy_of_index(index))
            .collect()
    }

    /// Exhaustive Max-Cut reference: `(best cut, bitstring)`
    ///
    /// Ties resolve to the lexicographically smallest bitstring. Returns `None`
    /// above [`MAX_BRUTE_FORCE_QUBITS`].
    pub fn max_cut_brute_force(&self) -> Option<(f64, String)> {
        if self.num_qubits > MAX_BRUTE_FORCE_QUBITS {
            return None;
        }

        let mut best: Option<(f64, String)> = None;
        for index in 0..1usize << self.num_qubits {
            let cut = self.offset - self.energy_of_index(index);
            let bitstring = index_to_bitstring(index, self.num_qubits);
            let replace = match &best {
                None => true,
                Some((value, current)) => cut > *value || (cut == *value && bitstring < *current),
            };
            if replace {
                best = Some((cut, bitstring));
            }
        }
        best
    }
}
