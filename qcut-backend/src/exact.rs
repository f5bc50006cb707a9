//! Exact state-vector simulator

use crate::simulator::prepare_state;
use crate::{Backend, BackendError, BackendKind, Result};
use qcut_core::{AnsatzCircuit, CostHamiltonian};
use qcut_state::{sample_counts, SampleHistogram, MAX_STATE_QUBITS};
use rand::rngs::StdRng;

/// Default register limit for the local simulators
pub const DEFAULT_MAX_QUBITS: usize = 20;

/// Dense simulator with deterministic expectation values
///
/// `expectation` is `Σ_z |ψ_z|² E(z)` and ignores the RNG; `sample` draws
/// shots from the exact distribution with it.
#[derive(Debug, Clone)]
pub struct ExactSimulator {
    max_qubits: usize,
}

impl ExactSimulator {
    /// Simulator with the default limit of 20 qubits
    pub fn new() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }

    /// Set the register limit, capped at [`MAX_STATE_QUBITS`]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits.min(MAX_STATE_QUBITS);
        self
    }

    /// Exact output distribution of `circuit(params)`
    pub fn distribution(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
    ) -> Result<SampleHistogram> {
        self.validate_request(circuit, cost, params)?;
        let prepared = prepare_state(circuit, cost, params)?;
        Ok(SampleHistogram::from_probabilities(
            circuit.num_qubits(),
            &prepared.state.probabilities(),
        )?)
    }
}

impl Default for ExactSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for ExactSimulator {
    fn name(&self) -> &str {
        "exact_simulator"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::ExactSimulator
    }

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn expectation(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
        _rng: &mut StdRng,
    ) -> Result<f64> {
        self.validate_request(circuit, cost, params)?;
        prepare_state(circuit, cost, params)?.expected_energy()
    }

    fn sample(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
        shots: usize,
        rng: &mut StdRng,
    ) -> Result<SampleHistogram> {
        self.validate_request(circuit, cost, params)?;
        if shots == 0 {
            return Err(BackendError::InvalidParameters(
                "shot count must be positive".to_string(),
            ));
        }
        let prepared = prepare_state(circuit, cost, params)?;
        let counts = sample_counts(&prepared.state.probabilities(), shots, rng)?;
        Ok(SampleHistogram::from_counts(circuit.num_qubits(), &counts)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qcut_core::{build_circuit, build_hamiltonian, Graph};
    use rand::SeedableRng;

    #[test]
    fn test_expectation_ignores_rng() {
        let cost = build_hamiltonian(&Graph::complete(3)).unwrap();
        let circuit = build_circuit(3, 2);
        let params = [0.3, 0.7, 1.1, 0.2];
        let backend = ExactSimulator::new();

        let a = backend
            .expectation(&circuit, &cost, &params, &mut StdRng::seed_from_u64(1))
            .unwrap();
        let b = backend
            .expectation(&circuit, &cost, &params, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_distribution_matches_expectation() {
        let cost = build_hamiltonian(&Graph::cycle(4)).unwrap();
        let circuit = build_circuit(4, 1);
        let params = [0.8, 0.35];
        let backend = ExactSimulator::new();

        let hist = backend.distribution(&circuit, &cost, &params).unwrap();
        let from_hist: f64 = hist
            .iter()
            .map(|(bits, p)| {
                let bits = qcut_core::parse_bitstring(bits).unwrap();
                p * cost.interaction_energy(&bits)
            })
            .sum();
        let direct = backend
            .expectation(&circuit, &cost, &params, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_relative_eq!(from_hist, direct, epsilon = 1e-10);
    }

    #[test]
    fn test_too_many_qubits() {
        let cost = build_hamiltonian(&Graph::path(5)).unwrap();
        let backend = ExactSimulator::new().with_max_qubits(4);
        let err = backend
            .expectation(&build_circuit(5, 1), &cost, &[0.0, 0.0], &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert_eq!(err, BackendError::TooManyQubits { num_qubits: 5, max_qubits: 4 });
    }

    #[test]
    fn test_max_qubits_is_capped() {
        assert_eq!(ExactSimulator::new().with_max_qubits(40).max_qubits(), MAX_STATE_QUBITS);
    }

    #[test]
    fn test_zero_shots_rejected() {
        let cost = build_hamiltonian(&Graph::path(2)).unwrap();
        let result = ExactSimulator::new().sample(
            &build_circuit(2, 1),
            &cost,
            &[0.0, 0.0],
            0,
            &mut StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(BackendError::InvalidParameters(_))));
    }
}
