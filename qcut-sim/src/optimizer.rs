//! Variational optimizer
//!
//! Drives a [`SearchStrategy`] over the QAOA expectation landscape:
//!
//! ```text
//! Initialized → Iterating → { Converged | Exhausted | Aborted }
//! ```
//!
//! - `Converged`: the strategy's spread fell below the tolerance
//! - `Exhausted`: the iteration limit was hit; best parameters are still
//!   returned with `converged = false`
//! - `Aborted`: a backend call failed or the cancel token fired; the error is
//!   returned unchanged

use crate::config::QaoaConfig;
use crate::objective::{Objective, OptimizationTrace};
use crate::strategy::{SearchStrategy, StrategyKind};
use qcut_backend::{Backend, BackendError};
use qcut_core::{AnsatzCircuit, CancelToken, CostHamiltonian};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Optimizer lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerState {
    Initialized,
    Iterating,
    Converged,
    Exhausted,
    Aborted,
}

impl fmt::Display for OptimizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizerState::Initialized => "initialized",
            OptimizerState::Iterating => "iterating",
            OptimizerState::Converged => "converged",
            OptimizerState::Exhausted => "exhausted",
            OptimizerState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Optimizer settings
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Iteration limit
    pub max_iterations: usize,

    /// Convergence threshold on the strategy's spread
    pub tolerance: f64,

    /// Starting point; drawn uniformly from `[0, 2π)` when `None`
    pub initial_params: Option<Vec<f64>>,

    /// Search strategy
    pub strategy: StrategyKind,

    /// Checked before every evaluation
    pub cancel: Option<CancelToken>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-2,
            initial_params: None,
            strategy: StrategyKind::default(),
            cancel: None,
        }
    }
}

impl OptimizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_initial_params(mut self, params: Vec<f64>) -> Self {
        self.initial_params = Some(params);
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

impl From<&QaoaConfig> for OptimizerConfig {
    fn from(config: &QaoaConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            initial_params: None,
            strategy: config.strategy,
            cancel: None,
        }
    }
}

/// Outcome of an optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Parameters with the lowest observed cost
    pub best_params: Vec<f64>,

    /// Lowest observed expected interaction energy
    pub best_cost: f64,

    /// Whether the tolerance was met before the iteration limit
    pub converged: bool,

    /// Terminal state (`Converged` or `Exhausted`)
    pub status: OptimizerState,

    /// Completed iterations, not counting initialization
    pub iterations: usize,

    /// Backend expectation calls
    pub evaluations: usize,

    /// Every evaluation in order
    pub trace: OptimizationTrace,

    /// Wall-clock time
    pub elapsed: Duration,
}

impl OptimizationResult {
    /// Expected cut `offset − best_cost`
    pub fn expected_cut(&self, cost: &CostHamiltonian) -> f64 {
        cost.offset() - self.best_cost
    }
}

/// Draw a parameter vector uniformly from `[0, 2π)`
pub fn random_initial_parameters(num_parameters: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..num_parameters).map(|_| rng.gen_range(0.0..TAU)).collect()
}

/// Optimizer with a pluggable strategy
pub struct VariationalOptimizer {
    config: OptimizerConfig,
    strategy: Box<dyn SearchStrategy>,
}

impl VariationalOptimizer {
    /// Optimizer using the strategy named in `config`
    pub fn new(config: OptimizerConfig) -> Self {
        let strategy = config.strategy.build();
        Self { config, strategy }
    }

    /// Replace the strategy with a custom one
    pub fn with_strategy(mut self, strategy: Box<dyn SearchStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Minimize `⟨E⟩` over the circuit parameters
    ///
    /// # Errors
    /// - [`BackendError::InvalidParameters`] if supplied initial parameters
    ///   have the wrong length or are not finite
    /// - [`BackendError::Cancelled`] if the cancel token fires
    /// - any error a backend call returns, unchanged
    pub fn run(
        mut self,
        backend: &dyn Backend,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        rng: &mut StdRng,
    ) -> Result<OptimizationResult, BackendError> {
        let start = Instant::now();
        let initial = match self.config.initial_params.take() {
            Some(params) => {
                circuit
                    .check_parameters(&params)
                    .map_err(BackendError::InvalidParameters)?;
                params
            },
            None => random_initial_parameters(circuit.num_parameters(), rng),
        };

        let mut objective = Objective::new(backend, circuit, cost);
        if let Some(ref token) = self.config.cancel {
            objective = objective.with_cancel_token(token.clone());
        }

        let strategy = self.strategy.name();
        info!(
            state = %OptimizerState::Initialized,
            strategy,
            backend = backend.name(),
            num_parameters = initial.len(),
            max_iterations = self.config.max_iterations,
            "optimizer initialized"
        );

        if let Err(err) = self.strategy.initialize(&initial, &mut objective, rng) {
            return Err(abort(err, 0, objective.evaluations()));
        }
        info!(state = %OptimizerState::Iterating, best_cost = objective.best().cost(), "optimizer iterating");

        let mut iterations = 0;
        let status = loop {
            let spread = self.strategy.spread();
            if spread < self.config.tolerance {
                break OptimizerState::Converged;
            }
            if iterations >= self.config.max_iterations {
                break OptimizerState::Exhausted;
            }

            iterations += 1;
            objective.set_iteration(iterations);
            if let Err(err) = self.strategy.step(&mut objective, rng) {
                return Err(abort(err, iterations, objective.evaluations()));
            }

            debug!(
                iteration = iterations,
                best_cost = objective.best().cost(),
                incumbent_cost = self.strategy.incumbent().1,
                spread = self.strategy.spread(),
                evaluations = objective.evaluations(),
                "optimizer step"
            );
        };

        let evaluations = objective.evaluations();
        let (trace, best) = objective.into_parts();
        let result = OptimizationResult {
            best_params: best.params().to_vec(),
            best_cost: best.cost(),
            converged: status == OptimizerState::Converged,
            status,
            iterations,
            evaluations,
            trace,
            elapsed: start.elapsed(),
        };

        info!(
            state = %status,
            iterations,
            evaluations,
            best_cost = result.best_cost,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "optimizer finished"
        );
        Ok(result)
    }
}

fn abort(err: BackendError, iteration: usize, evaluations: usize) -> BackendError {
    warn!(state = %OptimizerState::Aborted, iteration, evaluations, error = %err, "optimizer aborted");
    err
}

/// Minimize the expected cost of `circuit` on `backend`
///
/// Convenience wrapper around [`VariationalOptimizer`].
///
/// # Example
/// ```
/// use qcut_backend::ExactSimulator;
/// use qcut_core::{build_circuit, build_hamiltonian, Graph};
/// use qcut_sim::{optimize, OptimizerConfig};
/// use rand::SeedableRng;
///
/// let cost = build_hamiltonian(&Graph::from_edges(2, &[(0, 1, 1.0)])).unwrap();
/// let circuit = build_circuit(2, 2);
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
///
/// let result = optimize(&ExactSimulator::new(), &circuit, &cost, &OptimizerConfig::default(), &mut rng).unwrap();
/// assert!(result.expected_cut(&cost) > 0.9);
/// ```
pub fn optimize(
    backend: &dyn Backend,
    circuit: &AnsatzCircuit,
    cost: &CostHamiltonian,
    config: &OptimizerConfig,
    rng: &mut StdRng,
) -> Result<OptimizationResult, BackendError> {
    VariationalOptimizer::new(config.clone()).run(backend, circuit, cost, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcut_backend::ExactSimulator;
    use qcut_core::{build_circuit, build_hamiltonian, Graph};
    use rand::SeedableRng;

    #[test]
    fn test_initial_parameters_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = random_initial_parameters(50, &mut rng);
        assert_eq!(params.len(), 50);
        assert!(params.iter().all(|&p| (0.0..TAU).contains(&p)));
    }

    #[test]
    fn test_wrong_initial_length_rejected() {
        let cost = build_hamiltonian(&Graph::path(2)).unwrap();
        let circuit = build_circuit(2, 2);
        let config = OptimizerConfig::new().with_initial_params(vec![0.1, 0.2]);
        let err = optimize(
            &ExactSimulator::new(),
            &circuit,
            &cost,
            &config,
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();
        assert!(matches!(err, BackendError::InvalidParameters(_)));
    }

    #[test]
    fn test_exhausted_is_not_an_error() {
        let cost = build_hamiltonian(&Graph::complete(3)).unwrap();
        let circuit = build_circuit(3, 2);
        let config = OptimizerConfig::new()
            .with_max_iterations(2)
            .with_tolerance(1e-12);
        let result = optimize(
            &ExactSimulator::new(),
            &circuit,
            &cost,
            &config,
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();
        assert_eq!(result.status, OptimizerState::Exhausted);
        assert!(!result.converged);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.best_params.len(), 4);
        assert_eq!(result.evaluations, result.trace.len());
    }

    #[test]
    fn test_best_cost_is_trace_minimum() {
        let cost = build_hamiltonian(&Graph::cycle(4)).unwrap();
        let circuit = build_circuit(4, 1);
        let result = optimize(
            &ExactSimulator::new(),
            &circuit,
            &cost,
            &OptimizerConfig::default(),
            &mut StdRng::seed_from_u64(8),
        )
        .unwrap();
        let minimum = result
            .trace
            .records()
            .iter()
            .map(|r| r.cost)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(result.best_cost, minimum);
    }
}
