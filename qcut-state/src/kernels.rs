//! State-vector kernels
//!
//! All kernels operate on a raw amplitude slice of length `2^n` with qubit
//! `q` at bit `q` of the index. Each has a scalar reference path and a
//! rayon path used from [`PARALLEL_THRESHOLD`] qubits up.

use num_complex::Complex64;
use rayon::prelude::*;

/// Qubit count from which kernels split work across the rayon pool
pub const PARALLEL_THRESHOLD: usize = 16;

#[inline]
fn use_parallel(num_qubits: usize) -> bool {
    num_qubits >= PARALLEL_THRESHOLD && rayon::current_num_threads() > 1
}

/// Apply a 2×2 unitary to one qubit (scalar reference)
///
/// Amplitude pairs `(i, i | 1<<q)` with bit `q` clear in `i` are mixed by
/// the matrix.
pub fn apply_single_qubit_scalar(
    state: &mut [Complex64],
    matrix: &[[Complex64; 2]; 2],
    qubit: usize,
    num_qubits: usize,
) {
    let dimension = 1usize << num_qubits;
    let mask = 1usize << qubit;
    let [[m00, m01], [m10, m11]] = *matrix;

    for i in 0..dimension {
        if i & mask != 0 {
            continue;
        }
        let j = i | mask;
        let amp0 = state[i];
        let amp1 = state[j];
        state[i] = m00 * amp0 + m01 * amp1;
        state[j] = m10 * amp0 + m11 * amp1;
    }
}

/// Apply a 2×2 unitary to one qubit using the rayon pool
///
/// Each chunk of `2 · 2^q` amplitudes holds complete pairs, lower half with
/// bit `q` clear and upper half with it set.
pub fn apply_single_qubit_parallel(
    state: &mut [Complex64],
    matrix: &[[Complex64; 2]; 2],
    qubit: usize,
) {
    let stride = 1usize << qubit;
    let [[m00, m01], [m10, m11]] = *matrix;

    state.par_chunks_mut(2 * stride).for_each(|chunk| {
        let (low, high) = chunk.split_at_mut(stride);
        for (a, b) in low.iter_mut().zip(high.iter_mut()) {
            let amp0 = *a;
            let amp1 = *b;
            *a = m00 * amp0 + m01 * amp1;
            *b = m10 * amp0 + m11 * amp1;
        }
    });
}

/// Apply a single-qubit gate, choosing the scalar or parallel path
#[inline]
pub fn apply_single_qubit(
    state: &mut [Complex64],
    matrix: &[[Complex64; 2]; 2],
    qubit: usize,
    num_qubits: usize,
) {
    if use_parallel(num_qubits) {
        apply_single_qubit_parallel(state, matrix, qubit);
    } else {
        apply_single_qubit_scalar(state, matrix, qubit, num_qubits);
    }
}

/// Multiply every amplitude by `e^{−i θ E(z)}`
///
/// `energies[z]` is the diagonal of the Hamiltonian in the computational basis.
pub fn apply_phase_diagonal(
    state: &mut [Complex64],
    energies: &[f64],
    theta: f64,
    num_qubits: usize,
) {
    let phase = |amp: &mut Complex64, energy: f64| {
        *amp *= Complex64::from_polar(1.0, -theta * energy);
    };

    if use_parallel(num_qubits) {
        state
            .par_iter_mut()
            .zip(energies.par_iter())
            .for_each(|(amp, &energy)| phase(amp, energy));
    } else {
        for (amp, &energy) in state.iter_mut().zip(energies) {
            phase(amp, energy);
        }
    }
}

/// Measurement probabilities `|ψ_z|²`
pub fn probabilities(state: &[Complex64], num_qubits: usize) -> Vec<f64> {
    if use_parallel(num_qubits) {
        state.par_iter().map(|a| a.norm_sqr()).collect()
    } else {
        state.iter().map(|a| a.norm_sqr()).collect()
    }
}

/// Expectation `Σ_z |ψ_z|² d_z` of a diagonal observable
pub fn expectation_diagonal(state: &[Complex64], diagonal: &[f64], num_qubits: usize) -> f64 {
    if use_parallel(num_qubits) {
        state
            .par_iter()
            .zip(diagonal.par_iter())
            .map(|(a, &d)| a.norm_sqr() * d)
            .sum()
    } else {
        state
            .iter()
            .zip(diagonal)
            .map(|(a, &d)| a.norm_sqr() * d)
            .sum()
    }
}
