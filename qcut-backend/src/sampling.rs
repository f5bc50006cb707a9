//! Shot-based simulator
//!
//! Prepares the same dense state as [`ExactSimulator`](crate::ExactSimulator)
//! but estimates `⟨E⟩` from a finite number of measurements, which is what a
//! device would report.

use crate::exact::DEFAULT_MAX_QUBITS;
use crate::simulator::prepare_state;
use crate::{Backend, BackendError, BackendKind, Result};
use qcut_core::{AnsatzCircuit, CostHamiltonian};
use qcut_state::{sample_counts, SampleHistogram, MAX_STATE_QUBITS};
use rand::rngs::StdRng;

/// Dense simulator with shot-noise expectation values
#[derive(Debug, Clone)]
pub struct SamplingSimulator {
    shots: usize,
    max_qubits: usize,
}

impl SamplingSimulator {
    /// Simulator estimating each expectation from `shots` draws
    ///
    /// # Panics
    /// Panics if `shots` is 0
    pub fn new(shots: usize) -> Self {
        assert!(shots > 0, "Sampling simulator needs at least one shot");
        Self {
            shots,
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }

    /// Set the register limit, capped at [`MAX_STATE_QUBITS`]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits.min(MAX_STATE_QUBITS);
        self
    }

    /// Shots per expectation estimate
    pub fn shots(&self) -> usize {
        self.shots
    }
}

impl Backend for SamplingSimulator {
    fn name(&self) -> &str {
        "sampling_simulator"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::SamplingSimulator
    }

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn expectation(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
        rng: &mut StdRng,
    ) -> Result<f64> {
        self.validate_request(circuit, cost, params)?;
        let prepared = prepare_state(circuit, cost, params)?;
        let counts = sample_counts(&prepared.state.probabilities(), self.shots, rng)?;

        let total: f64 = counts
            .iter()
            .zip(&prepared.energies)
            .map(|(&count, &energy)| count as f64 * energy)
            .sum();
        Ok(total / self.shots as f64)
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
