//! Backend trait
//!
//! A backend turns `(circuit, cost, params)` into either the expected
//! interaction energy `⟨E⟩` or a measurement histogram. The cost Hamiltonian
//! travels with every call because the default problem layer evolves under it.

use crate::{BackendError, Result};
use qcut_core::{AnsatzCircuit, CancelToken, CostHamiltonian};
use qcut_state::SampleHistogram;
use rand::rngs::StdRng;
use std::fmt;

/// Kind of execution backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Dense state vector, exact expectation values
    ExactSimulator,
    /// Dense state vector, expectation values estimated from shots
    SamplingSimulator,
    /// Remote execution service
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::ExactSimulator => write!(f, "exact simulator"),
            BackendKind::SamplingSimulator => write!(f, "sampling simulator"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

/// Execution backend
///
/// Implementations must be safe to call from several rayon workers at once;
/// every source of randomness is the `rng` argument.
///
/// # Example
///
/// ```
/// use qcut_backend::{Backend, ExactSimulator};
/// use qcut_core::{build_circuit, build_hamiltonian, Graph};
/// use rand::SeedableRng;
///
/// let cost = build_hamiltonian(&Graph::from_edges(2, &[(0, 1, 1.0)])).unwrap();
/// let circuit = build_circuit(2, 1);
/// let backend = ExactSimulator::new();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
///
/// // All angles zero: uniform superposition, ⟨E⟩ = 0
/// let energy = backend.expectation(&circuit, &cost, &[0.0, 0.0], &mut rng).unwrap();
/// assert!(energy.abs() < 1e-12);
/// ```
pub trait Backend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Backend kind
    fn kind(&self) -> BackendKind;

    /// Largest register this backend accepts
    fn max_qubits(&self) -> usize;

    /// Expected interaction energy `⟨E⟩` of `circuit(params)`
    fn expectation(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
        rng: &mut StdRng,
    ) -> Result<f64>;

    /// Measure `circuit(params)` `shots` times
    fn sample(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
        shots: usize,
        rng: &mut StdRng,
    ) -> Result<SampleHistogram>;

    /// Open an execution session (no-op for local backends)
    fn open_session(&self) -> Result<()> {
        Ok(())
    }

    /// Close the execution session (no-op for local backends)
    fn close_session(&self) -> Result<()> {
        Ok(())
    }

    /// Observe `token` inside long-running calls
    ///
    /// Backends that block on external work (remote job polling) stop and
    /// cancel that work once the token fires. Local backends return between
    /// evaluations anyway and ignore it.
    fn bind_cancel_token(&self, _token: &CancelToken) {}

    /// Check a request against the backend before running it
    fn validate_request(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
    ) -> Result<()> {
        if circuit.num_qubits() != cost.num_qubits() {
            return Err(BackendError::InvalidCircuit(format!(
                "circuit has {} qubits but the cost Hamiltonian has {}",
                circuit.num_qubits(),
                cost.num_qubits()
            )));
        }
        if circuit.num_qubits() > self.max_qubits() {
            return Err(BackendError::TooManyQubits {
                num_qubits: circuit.num_qubits(),
                max_qubits: self.max_qubits(),
            });
        }
        circuit
            .check_parameters(params)
            .map_err(BackendError::InvalidParameters)
    }
}
