//! Scoped backend sessions

use crate::{Backend, Result};
use tracing::{info, warn};

/// Opens a backend session on creation and closes it when dropped
///
/// Every exit path releases the session, including early returns through
/// `?` and unwinding panics. Call [`SessionGuard::close`] to observe the
/// close error instead of having it logged.
///
/// # Example
///
/// ```
/// use qcut_backend::{ExactSimulator, SessionGuard};
///
/// let backend = ExactSimulator::new();
/// let guard = SessionGuard::open(&backend).unwrap();
/// // ... run jobs ...
/// guard.close().unwrap();
/// ```
pub struct SessionGuard<'a> {
    backend: &'a dyn Backend,
    open: bool,
}

impl<'a> SessionGuard<'a> {
    /// Open a session on `backend`
    pub fn open(backend: &'a dyn Backend) -> Result<Self> {
        backend.open_session()?;
        info!(backend = backend.name(), "session opened");
        Ok(Self {
            backend,
            open: true,
        })
    }

    /// The backend this guard holds a session on
    pub fn backend(&self) -> &'a dyn Backend {
        self.backend
    }

    /// Close the session now and report the outcome
    pub fn close(mut self) -> Result<()> {
        self.open = false;
        let result = self.backend.close_session();
        info!(backend = self.backend.name(), ok = result.is_ok(), "session closed");
        result
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        match self.backend.close_session() {
            Ok(()) => info!(backend = self.backend.name(), "session closed"),
            Err(err) => warn!(backend = self.backend.name(), error = %err, "failed to close session"),
        }
    }
}
