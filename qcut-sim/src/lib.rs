//! QAOA Max-Cut partitioning
//!
//! Splits a weighted similarity graph into two groups:
//!
//! 1. [`build_hamiltonian`] turns the graph into an Ising cost function
//! 2. [`build_circuit`] lays out the parameterized ansatz
//! 3. [`optimize`] tunes the parameters against a [`Backend`]
//! 4. [`sample`] measures the tuned circuit and [`decode`] picks the partition
//!
//! [`MaxCutSolver`] runs all of it, holding a backend session for the
//! duration.
//!
//! # Example
//! ```
//! use qcut_backend::ExactSimulator;
//! use qcut_core::Graph;
//! use qcut_sim::{MaxCutSolver, QaoaConfig};
//!
//! let graph = Graph::complete(3);
//! let solution = MaxCutSolver::new(QaoaConfig::new().with_seed(11))
//!     .solve(&graph, &ExactSimulator::new())
//!     .unwrap();
//! assert_eq!(solution.cut_value, 2.0);
//! ```

pub mod config;
pub mod decoder;
pub mod objective;
pub mod optimizer;
pub mod solver;
pub mod strategy;

pub use config::{ConfigError, QaoaConfig};
pub use decoder::{decode, DecodeError, NodeAssignment, Partition, TIE_TOLERANCE};
pub use objective::{EvaluationRecord, Objective, OptimizationTrace};
pub use optimizer::{
    optimize, random_initial_parameters, OptimizationResult, OptimizerConfig, OptimizerState,
    VariationalOptimizer,
};
pub use solver::{sample, MaxCutSolver, Solution, SolveError};
pub use strategy::{SearchStrategy, StrategyKind};

pub use qcut_backend::{Backend, BackendError, BackendKind, ExactSimulator, SamplingSimulator};
pub use qcut_core::{build_circuit, build_hamiltonian, AnsatzCircuit, CostHamiltonian, Graph, GraphError};
pub use qcut_state::SampleHistogram;
