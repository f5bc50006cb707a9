//! QAOA ansatz as an arena of tagged gate records
//!
//! The circuit is a fixed template: for a given `(n, reps, layer)` the record
//! sequence is always the same and only the parameter vector changes between
//! optimizer iterations. Parameters are laid out as
//! `[γ_1, β_1, γ_2, β_2, ...]`, i.e. `θ[2p]` drives the problem layer and
//! `θ[2p + 1]` the mixer of layer `p`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rotation axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// A single gate-application record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    /// Hadamard on one qubit
    Superpose { qubit: usize },

    /// `R_axis(θ[param]) = exp(−i θ σ_axis / 2)` on one qubit
    Rotate { axis: Axis, qubit: usize, param: usize },

    /// `exp(−i θ[param] H_C)` for the cost Hamiltonian the circuit is run against
    CostPhase { param: usize },

    /// Terminal marker: the state is ready for computational-basis measurement
    MeasureAll,
}

impl Gate {
    /// Parameter index this gate reads, if any
    pub fn param(&self) -> Option<usize> {
        match *self {
            Gate::Rotate { param, .. } | Gate::CostPhase { param } => Some(param),
            Gate::Superpose { .. } | Gate::MeasureAll => None,
        }
    }
}

/// How the problem-dependent half of each layer is realized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemLayer {
    /// Evolve under the cost Hamiltonian (one `CostPhase` record per layer)
    #[default]
    CostPhase,

    /// Independent `RZ(θ)` per qubit; ignores the cost structure
    LocalZ,
}

/// Parameterized QAOA circuit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnsatzCircuit {
    num_qubits: usize,
    reps: usize,
    layer: ProblemLayer,
    gates: Vec<Gate>,
}

/// Build the default QAOA ansatz (cost-phase problem layer)
///
/// # Panics
/// Panics if `num_qubits` or `reps` is 0
///
/// # Example
/// ```
/// use qcut_core::{build_circuit, Gate};
///
/// let circuit = build_circuit(3, 2);
/// assert_eq!(circuit.num_parameters(), 4);
/// assert_eq!(circuit.gates().last(), Some(&Gate::MeasureAll));
/// ```
pub fn build_circuit(num_qubits: usize, reps: usize) -> AnsatzCircuit {
    build_circuit_with(num_qubits, reps, ProblemLayer::CostPhase)
}

/// Build a QAOA ansatz with an explicit problem-layer variant
///
/// # Panics
/// Panics if `num_qubits` or `reps` is 0
pub fn build_circuit_with(num_qubits: usize, reps: usize, layer: ProblemLayer) -> AnsatzCircuit {
    assert!(num_qubits > 0, "Circuit must have at least one qubit");
    assert!(reps > 0, "Circuit must have at least one layer");

    let per_layer = match layer {
        ProblemLayer::CostPhase => 1 + num_qubits,
        ProblemLayer::LocalZ => 2 * num_qubits,
    };
    let mut gates = Vec::with_capacity(num_qubits + reps * per_layer + 1);

    gates.extend((0..num_qubits).map(|qubit| Gate::Superpose { qubit }));

    for p in 0..reps {
        let gamma = 2 * p;
        let beta = 2 * p + 1;

        match layer {
            ProblemLayer::CostPhase => gates.push(Gate::CostPhase { param: gamma }),
            ProblemLayer::LocalZ => gates.extend((0..num_qubits).map(|qubit| Gate::Rotate {
                axis: Axis::Z,
                qubit,
                param: gamma,
            })),
        }

        gates.extend((0..num_qubits).map(|qubit| Gate::Rotate {
            axis: Axis::X,
            qubit,
            param: beta,
        }));
    }

    gates.push(Gate::MeasureAll);

    AnsatzCircuit {
        num_qubits,
        reps,
        layer,
        gates,
    }
}

impl AnsatzCircuit {
    /// Number of qubits
    #[inline]
    pub const fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of alternating problem/mixer layers
    #[inline]
    pub const fn reps(&self) -> usize {
        self.reps
    }

    /// Problem-layer variant
    #[inline]
    pub const fn problem_layer(&self) -> ProblemLayer {
        self.layer
    }

    /// Length of the parameter vector (`2 × reps`)
    #[inline]
    pub const fn num_parameters(&self) -> usize {
        2 * self.reps
    }

    /// Gate records in application order
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Number of gate records
    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Always false: a built circuit holds at least the superposition layer
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Check a parameter vector against the circuit
    ///
    /// Returns a description of the mismatch on failure.
    pub fn check_parameters(&self, params: &[f64]) -> std::result::Result<(), String> {
        if params.len() != self.num_parameters() {
            return Err(format!(
                "expected {} parameters, got {}",
                self.num_parameters(),
                params.len()
            ));
        }
        if let Some(position) = params.iter().position(|p| !p.is_finite()) {
            return Err(format!("parameter {} is not finite", position));
        }
        Ok(())
    }
}

impl fmt::Display for AnsatzCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "AnsatzCircuit({} qubits, {} reps, {} gates)",
            self.num_qubits,
            self.reps,
            self.gates.len()
        )?;
        for (position, gate) in self.gates.iter().enumerate() {
            match gate {
                Gate::Superpose { qubit } => writeln!(f, "  {:3}: h q[{}]", position, qubit)?,
                Gate::Rotate { axis, qubit, param } => {
                    writeln!(f, "  {:3}: r{}(θ[{}]) q[{}]", position, axis, param, qubit)?
                },
                Gate::CostPhase { param } => writeln!(f, "  {:3}: cost(θ[{}])", position, param)?,
                Gate::MeasureAll => writeln!(f, "  {:3}: measure", position)?,
            }
        }
        Ok(())
    }
}
