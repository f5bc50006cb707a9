//! Retry policy for transient backend failures

use crate::{BackendError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Fixed-backoff retry for [transient](BackendError::is_transient) errors
///
/// Non-transient errors surface on the first attempt. When every attempt
/// fails, the last error is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first (at least 1)
    pub max_attempts: usize,
    /// Pause between attempts in milliseconds
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 200,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 0,
        }
    }

    /// Set the attempt limit
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the pause between attempts
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff_ms = backoff.as_millis() as u64;
        self
    }

    /// Pause between attempts
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Run `operation`, retrying transient failures
    ///
    /// The closure receives the 1-based attempt number.
    pub fn run<T, F>(&self, what: &str, operation: F) -> Result<T>
    where
        F: FnMut(usize) -> Result<T>,
    {
        self.run_when(what, BackendError::is_transient, operation)
    }

    /// Run `operation`, retrying failures for which `retryable` holds
    ///
    /// For operations that must not be repeated once the other side has seen
    /// them, `retryable` narrows the transient set to failures that prove the
    /// previous attempt had no effect.
    pub fn run_when<T, F, P>(&self, what: &str, retryable: P, mut operation: F) -> Result<T>
    where
        F: FnMut(usize) -> Result<T>,
        P: Fn(&BackendError) -> bool,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if retryable(&err) && attempt < self.max_attempts.max(1) => {
                    warn!(
                        operation = what,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "transient failure, retrying"
                    );
                    if self.backoff_ms > 0 {
                        std::thread::sleep(self.backoff());
                    }
                    attempt += 1;
                },
                Err(err) => return Err(err),
            }
        }
    }
}
