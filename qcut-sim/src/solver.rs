//! End-to-end Max-Cut solver
//!
//! validate config → build Hamiltonian → build circuit → open session →
//! optimize → sample → decode

use crate::config::{ConfigError, QaoaConfig};
use crate::decoder::{decode, DecodeError, Partition};
use crate::optimizer::{OptimizationResult, OptimizerConfig, VariationalOptimizer};
use qcut_backend::{Backend, BackendError, SessionGuard};
use qcut_core::{
    build_circuit_with, build_hamiltonian, AnsatzCircuit, CancelToken, CostHamiltonian, Graph,
    GraphError,
};
use qcut_state::SampleHistogram;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Any failure of the pipeline, carrying the stage's error unchanged
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result of a solver run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Decoded two-way partition
    pub partition: Partition,

    /// Cut weight of `partition` on the input graph
    pub cut_value: f64,

    /// Expected cut `offset − best_cost` at the optimized parameters
    pub expected_cut: f64,

    /// Optimizer outcome and trace
    pub optimization: OptimizationResult,

    /// Final measurement histogram
    pub histogram: SampleHistogram,
}

/// QAOA Max-Cut solver
///
/// # Example
/// ```
/// use qcut_backend::ExactSimulator;
/// use qcut_core::Graph;
/// use qcut_sim::{MaxCutSolver, QaoaConfig};
///
/// let graph = Graph::from_id_edges(&["a", "b"], &[("a", "b", 1.0)]).unwrap();
/// let solver = MaxCutSolver::new(QaoaConfig::new().with_seed(3));
/// let solution = solver.solve(&graph, &ExactSimulator::new()).unwrap();
///
/// assert!(solution.partition.separates("a", "b"));
/// assert_eq!(solution.cut_value, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MaxCutSolver {
    config: QaoaConfig,
    cancel: Option<CancelToken>,
}

impl MaxCutSolver {
    pub fn new(config: QaoaConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Cancel the run when `cancel` fires
    ///
    /// The token is checked by the optimizer between evaluations and bound to
    /// the backend with [`Backend::bind_cancel_token`], so a remote job still
    /// being polled is cancelled on the service too.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &QaoaConfig {
        &self.config
    }

    /// Partition `graph` using `backend`
    ///
    /// The backend session is open from before the first expectation call
    /// until after the final sample, and is released on every exit path.
    pub fn solve(&self, graph: &Graph, backend: &dyn Backend) -> Result<Solution, SolveError> {
        self.config.validate()?;
        if graph.num_nodes() > self.config.max_qubits {
            return Err(BackendError::TooManyQubits {
                num_qubits: graph.num_nodes(),
                max_qubits: self.config.max_qubits,
            }
            .into());
        }

        let cost = build_hamiltonian(graph)?;
        let circuit = build_circuit_with(graph.num_nodes(), self.config.reps, self.config.problem_layer);
        let mut rng = make_rng(self.config.seed);

        info!(
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            reps = self.config.reps,
            backend = backend.name(),
            "solving max-cut"
        );

        if let Some(ref token) = self.cancel {
            backend.bind_cancel_token(token);
        }
        let session = SessionGuard::open(backend)?;

        let mut optimizer_config = OptimizerConfig::from(&self.config);
        optimizer_config.cancel = self.cancel.clone();
        let optimization = VariationalOptimizer::new(optimizer_config).run(backend, &circuit, &cost, &mut rng)?;

        let histogram = backend.sample(
            &circuit,
            &cost,
            &optimization.best_params,
            self.config.shots,
            &mut rng,
        )?;

        if let Err(err) = session.close() {
            warn!(error = %err, "session close failed after sampling");
        }

        let partition = decode(&histogram, &graph.node_ids(), self.config.epsilon)?;
        let cut_value = partition.cut_value(graph).unwrap_or(0.0);
        let expected_cut = optimization.expected_cut(&cost);

        info!(
            bitstring = partition.bitstring(),
            probability = partition.probability(),
            cut_value,
            expected_cut,
            converged = optimization.converged,
            "max-cut solved"
        );

        Ok(Solution {
            partition,
            cut_value,
            expected_cut,
            optimization,
            histogram,
        })
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Measure `circuit(params)` `shots` times with a seeded RNG
///
/// Identical arguments and seed give bit-identical histograms. With
/// `seed = None` the RNG is seeded from the OS.
pub fn sample(
    backend: &dyn Backend,
    circuit: &AnsatzCircuit,
    cost: &CostHamiltonian,
    params: &[f64],
    shots: usize,
    seed: Option<u64>,
) -> Result<SampleHistogram, BackendError> {
    let mut rng = make_rng(seed);
    backend.sample(circuit, cost, params, shots, &mut rng)
}
