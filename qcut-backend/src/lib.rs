//! Execution backends for qcut
//!
//! A [`Backend`] evaluates the QAOA ansatz for a given parameter vector,
//! either as an expectation value of the cost Hamiltonian or as a shot
//! histogram.
//!
//! - [`ExactSimulator`]: dense state vector, deterministic `⟨E⟩`
//! - [`SamplingSimulator`]: dense state vector, `⟨E⟩` from finite shots
//! - [`remote::RemoteBackend`] (feature `remote`): HTTP runtime service
//!
//! [`RetryPolicy`] and [`SessionGuard`] cover transient failures and session
//! lifetime for backends that have them.

pub mod backend;
pub mod error;
pub mod exact;
pub mod retry;
pub mod sampling;
pub mod session;
pub mod simulator;

#[cfg(feature = "remote")]
pub mod remote;

pub use backend::{Backend, BackendKind};
pub use error::{BackendError, Result};
pub use exact::{ExactSimulator, DEFAULT_MAX_QUBITS};
pub use retry::RetryPolicy;
pub use sampling::SamplingSimulator;
pub use session::SessionGuard;
pub use simulator::{prepare_state, PreparedState};

#[cfg(feature = "remote")]
pub use remote::{RemoteBackend, RemoteConfig};
