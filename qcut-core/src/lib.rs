//! Core types for the qcut Max-Cut partitioner
//!
//! This crate provides the problem-side building blocks of the QAOA pipeline:
//! - [`Graph`]: weighted undirected similarity graph over opaque node IDs
//! - [`CostHamiltonian`]: Ising form of the Max-Cut objective
//! - [`AnsatzCircuit`]: fixed-structure parameterized circuit, stored as an
//!   arena of tagged gate records
//! - [`CancelToken`]: cooperative cancellation shared by optimizer and backends
//!
//! # Example
//! ```
//! use qcut_core::{build_circuit, build_hamiltonian, Graph};
//!
//! let graph = Graph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)]);
//! let cost = build_hamiltonian(&graph).unwrap();
//! assert_eq!(cost.offset(), 1.5);
//!
//! let circuit = build_circuit(graph.num_nodes(), 2);
//! assert_eq!(circuit.num_parameters(), 4);
//! ```

pub mod bitstring;
pub mod cancel;
pub mod circuit;
pub mod error;
pub mod graph;
pub mod hamiltonian;

pub use bitstring::{bits_to_index, index_to_bitstring, parse_bitstring};
pub use cancel::CancelToken;
pub use circuit::{build_circuit, build_circuit_with, AnsatzCircuit, Axis, Gate, ProblemLayer};
pub use error::GraphError;
pub use graph::{Edge, Graph, Node};
pub use hamiltonian::{build_hamiltonian, CostHamiltonian, ZzTerm, MAX_BRUTE_FORCE_QUBITS};

/// Type alias for results in qcut-core
pub type Result<T> = std::result::Result<T, GraphError>;
