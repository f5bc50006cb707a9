//! Error types for backend operations

use qcut_state::StateError;
use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur during backend operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Circuit does not fit the cost Hamiltonian or the backend
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Parameter vector has the wrong length or non-finite entries
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Register larger than the backend accepts
    #[error("Circuit needs {num_qubits} qubits, backend allows {max_qubits}")]
    TooManyQubits { num_qubits: usize, max_qubits: usize },

    /// Local state-vector failure
    #[error("Simulation error: {0}")]
    Simulation(#[from] StateError),

    /// Credentials rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request or job exceeded its time limit
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Service asked us to slow down
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Service or device temporarily unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Remote job finished in a failed state
    #[error("Job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    /// Cancelled through a [`CancelToken`](qcut_core::CancelToken)
    #[error("Operation cancelled")]
    Cancelled,

    /// Request or response body could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BackendError {
    /// True for failures worth retrying unchanged
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::Network(_)
                | BackendError::Timeout(_)
                | BackendError::RateLimited(_)
                | BackendError::Unavailable(_)
        )
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}
