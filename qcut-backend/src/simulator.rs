//! State preparation shared by the local simulators

use crate::Result;
use qcut_core::{AnsatzCircuit, Axis, CostHamiltonian, Gate};
use qcut_state::DenseState;
use tracing::trace;

/// A prepared state together with the energy diagonal it was evolved under
#[derive(Debug, Clone)]
pub struct PreparedState {
    pub state: DenseState,
    /// `E(z)` for every basis index
    pub energies: Vec<f64>,
}

impl PreparedState {
    /// `⟨E⟩ = Σ_z |ψ_z|² E(z)`
    pub fn expected_energy(&self) -> Result<f64> {
        Ok(self.state.expectation_diagonal(&self.energies)?)
    }
}

/// Run the gate records of `circuit` on `|0...0⟩`
///
/// The caller has already validated the request; `MeasureAll` ends the walk.
pub fn prepare_state(
    circuit: &AnsatzCircuit,
    cost: &CostHamiltonian,
    params: &[f64],
) -> Result<PreparedState> {
    let energies = cost.diagonal();
    let mut state = DenseState::new(circuit.num_qubits())?;

    for gate in circuit.gates() {
        match *gate {
            Gate::Superpose { qubit } => state.apply_hadamard(qubit)?,
            Gate::Rotate { axis, qubit, param } => {
                let theta = params[param];
                match axis {
                    Axis::X => state.apply_rx(qubit, theta)?,
                    Axis::Y => state.apply_ry(qubit, theta)?,
                    Axis::Z => state.apply_rz(qubit, theta)?,
                }
            },
            Gate::CostPhase { param } => state.apply_phase_diagonal(&energies, params[param])?,
            Gate::MeasureAll => break,
        }
    }

    trace!(num_qubits = circuit.num_qubits(), gates = circuit.len(), "prepared state");
    Ok(PreparedState { state, energies })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qcut_core::{build_circuit, build_circuit_with, build_hamiltonian, Graph, ProblemLayer};
    use std::f64::consts::FRAC_PI_8;

    #[test]
    fn test_single_edge_optimum() {
        let cost = build_hamiltonian(&Graph::from_edges(2, &[(0, 1, 1.0)])).unwrap();
        let circuit = build_circuit(2, 1);
        // ⟨ZZ⟩ = sin(4β)·sin(γ) with RX(θ₁ = 2β)
        let prepared = prepare_state(&circuit, &cost, &[-std::f64::consts::FRAC_PI_2, 2.0 * FRAC_PI_8]).unwrap();
        let energy = prepared.expected_energy().unwrap();
        assert_relative_eq!(energy, -0.5, epsilon = 1e-10);
        assert_relative_eq!(cost.offset() - energy, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_angles_leave_uniform_state() {
        let cost = build_hamiltonian(&Graph::complete(3)).unwrap();
        let prepared = prepare_state(&build_circuit(3, 2), &cost, &[0.0; 4]).unwrap();
        for p in prepared.state.probabilities() {
            assert_relative_eq!(p, 0.125, epsilon = 1e-12);
        }
        assert_relative_eq!(prepared.expected_energy().unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_local_z_layer_is_product_state() {
        let cost = build_hamiltonian(&Graph::from_edges(2, &[(0, 1, 1.0)])).unwrap();
        let circuit = build_circuit_with(2, 1, ProblemLayer::LocalZ);
        for &(g, b) in &[(0.4, 0.9), (2.0, -0.3), (1.3, 1.7)] {
            let prepared = prepare_state(&circuit, &cost, &[g, b]).unwrap();
            let probs = prepared.state.probabilities();
            // p(00)·p(11) = p(01)·p(10) for a product state
            assert_relative_eq!(probs[0] * probs[3], probs[1] * probs[2], epsilon = 1e-12);
        }
    }
}
