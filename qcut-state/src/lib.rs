//! State-vector simulation for qcut
//!
//! - [`DenseState`]: all `2^n` amplitudes, with rotation, Hadamard and
//!   diagonal-phase evolution
//! - [`kernels`]: the raw slice kernels behind it (rayon above
//!   [`kernels::PARALLEL_THRESHOLD`] qubits)
//! - [`AliasTable`] / [`sample_counts`]: O(1)-per-shot sampling driven by a
//!   caller-supplied RNG
//! - [`SampleHistogram`]: normalized, ordered bitstring histogram

pub mod dense_state;
pub mod error;
pub mod histogram;
pub mod kernels;
pub mod measurement;

pub use dense_state::{DenseState, MAX_STATE_QUBITS};
pub use error::{Result, StateError};
pub use histogram::SampleHistogram;
pub use measurement::{sample_counts, AliasTable};
