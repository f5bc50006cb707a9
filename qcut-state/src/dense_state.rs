//! Dense quantum state representation
//!
//! Holds all `2^n` complex amplitudes of an n-qubit register, with qubit `q`
//! at bit `q` of the amplitude index. Memory use is `16 · 2^n` bytes, so the
//! constructor refuses registers above [`MAX_STATE_QUBITS`].

use crate::error::{Result, StateError};
use crate::kernels;
use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// Hard cap on register size (1 GiB of amplitudes)
pub const MAX_STATE_QUBITS: usize = 26;

/// Dense state vector
///
/// # Example
///
/// ```
/// use qcut_state::DenseState;
///
/// let mut state = DenseState::new(2).unwrap();
/// state.apply_hadamard(0).unwrap();
/// state.apply_hadamard(1).unwrap();
///
/// for p in state.probabilities() {
///     assert!((p - 0.25).abs() < 1e-12);
/// }
/// ```
#[derive(Clone, PartialEq)]
pub struct DenseState {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl DenseState {
    /// Create a state initialized to |0...0⟩
    ///
    /// # Errors
    /// Returns error if `num_qubits` is 0 or exceeds [`MAX_STATE_QUBITS`]
    pub fn new(num_qubits: usize) -> Result<Self> {
        Self::check_size(num_qubits)?;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1usize << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Create the uniform superposition `H^{⊗n}|0...0⟩` directly
    ///
    /// # Errors
    /// Same as [`DenseState::new`]
    pub fn uniform_superposition(num_qubits: usize) -> Result<Self> {
        Self::check_size(num_qubits)?;
        let dimension = 1usize << num_qubits;
        let amplitude = Complex64::new(1.0 / (dimension as f64).sqrt(), 0.0);
        Ok(Self {
            num_qubits,
            amplitudes: vec![amplitude; dimension],
        })
    }

    /// Create a state from explicit amplitudes
    ///
    /// # Errors
    /// Returns error if the length is not `2^num_qubits`
    pub fn from_amplitudes(num_qubits: usize, amplitudes: Vec<Complex64>) -> Result<Self> {
        Self::check_size(num_qubits)?;
        let expected = 1usize << num_qubits;
        if amplitudes.len() != expected {
            return Err(StateError::DimensionMismatch {
                expected,
                actual: amplitudes.len(),
            });
        }
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    fn check_size(num_qubits: usize) -> Result<()> {
        if num_qubits == 0 {
            return Err(StateError::DimensionMismatch {
                expected: 2,
                actual: 1,
            });
        }
        if num_qubits > MAX_STATE_QUBITS {
            return Err(StateError::TooManyQubits {
                num_qubits,
                max_qubits: MAX_STATE_QUBITS,
            });
        }
        Ok(())
    }

    #[inline]
    fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(StateError::InvalidQubitIndex {
                index: qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// State dimension (`2^num_qubits`)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Amplitudes in index order
    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply an arbitrary 2×2 unitary to one qubit
    pub fn apply_single_qubit_gate(
        &mut self,
        matrix: &[[Complex64; 2]; 2],
        qubit: usize,
    ) -> Result<()> {
        self.check_qubit(qubit)?;
        kernels::apply_single_qubit(&mut self.amplitudes, matrix, qubit, self.num_qubits);
        Ok(())
    }

    /// Hadamard
    pub fn apply_hadamard(&mut self, qubit: usize) -> Result<()> {
        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        self.apply_single_qubit_gate(&[[h, h], [h, -h]], qubit)
    }

    /// `RX(θ) = exp(−iθX/2)`
    pub fn apply_rx(&mut self, qubit: usize, theta: f64) -> Result<()> {
        let (s, c) = (theta / 2.0).sin_cos();
        let cos = Complex64::new(c, 0.0);
        let isin = Complex64::new(0.0, -s);
        self.apply_single_qubit_gate(&[[cos, isin], [isin, cos]], qubit)
    }

    /// `RY(θ) = exp(−iθY/2)`
    pub fn apply_ry(&mut self, qubit: usize, theta: f64) -> Result<()> {
        let (s, c) = (theta / 2.0).sin_cos();
        let cos = Complex64::new(c, 0.0);
        let sin = Complex64::new(s, 0.0);
        self.apply_single_qubit_gate(&[[cos, -sin], [sin, cos]], qubit)
    }

    /// `RZ(θ) = exp(−iθZ/2)`
    pub fn apply_rz(&mut self, qubit: usize, theta: f64) -> Result<()> {
        let zero = Complex64::new(0.0, 0.0);
        let m0 = Complex64::from_polar(1.0, -theta / 2.0);
        let m1 = Complex64::from_polar(1.0, theta / 2.0);
        self.apply_single_qubit_gate(&[[m0, zero], [zero, m1]], qubit)
    }

    /// Evolve under a diagonal Hamiltonian: `ψ_z ← e^{−iθ E_z} ψ_z`
    ///
    /// # Errors
    /// Returns error if `energies` does not have one entry per basis state
    pub fn apply_phase_diagonal(&mut self, energies: &[f64], theta: f64) -> Result<()> {
        if energies.len() != self.amplitudes.len() {
            return Err(StateError::DimensionMismatch {
                expected: self.amplitudes.len(),
                actual: energies.len(),
            });
        }
        kernels::apply_phase_diagonal(&mut self.amplitudes, energies, theta, self.num_qubits);
        Ok(())
    }

    /// Measurement probabilities in index order
    pub fn probabilities(&self) -> Vec<f64> {
        kernels::probabilities(&self.amplitudes, self.num_qubits)
    }

    /// Expectation value of a diagonal observable
    ///
    /// # Errors
    /// Returns error if `diagonal` does not have one entry per basis state
    pub fn expectation_diagonal(&self, diagonal: &[f64]) -> Result<f64> {
        if diagonal.len() != self.amplitudes.len() {
            return Err(StateError::DimensionMismatch {
                expected: self.amplitudes.len(),
                actual: diagonal.len(),
            });
        }
        Ok(kernels::expectation_diagonal(
            &self.amplitudes,
            diagonal,
            self.num_qubits,
        ))
    }

    /// Euclidean norm of the amplitude vector
    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// Check normalization within a tolerance
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.norm() - 1.0).abs() < tolerance
    }
}

impl fmt::Debug for DenseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseState")
            .field("num_qubits", &self.num_qubits)
            .field("dimension", &self.amplitudes.len())
            .finish()
    }
}
