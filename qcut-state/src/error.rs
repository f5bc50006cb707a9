//! Error types for state vector operations

use thiserror::Error;

/// Errors that can occur during state vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Invalid qubit index
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// State would not fit the configured size limit
    #[error("State of {num_qubits} qubits exceeds the limit of {max_qubits}")]
    TooManyQubits { num_qubits: usize, max_qubits: usize },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Probabilities are negative, non-finite, or sum to zero
    #[error("Invalid probability distribution: {0}")]
    InvalidDistribution(String),
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
