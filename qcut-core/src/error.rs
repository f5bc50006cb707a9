//! Error types for graph validation

use thiserror::Error;

/// Errors raised for malformed input graphs
///
/// These are fatal: a graph that fails validation never reaches the
/// optimizer, and nothing is retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// Graph has no nodes
    #[error("Graph must have at least one node")]
    EmptyGraph,

    /// Edge connects a node to itself
    #[error("Self-loop on node {0}")]
    SelfLoop(usize),

    /// Same unordered pair appears twice
    #[error("Duplicate edge between nodes {0} and {1}")]
    DuplicateEdge(usize, usize),

    /// Edge weight below zero
    #[error("Negative weight {weight} on edge ({i}, {j})")]
    NegativeWeight { i: usize, j: usize, weight: f64 },

    /// Edge weight is NaN or infinite
    #[error("Non-finite weight on edge ({i}, {j})")]
    NonFiniteWeight { i: usize, j: usize },

    /// Edge endpoint outside the node range
    #[error("Node index {index} out of range: graph has {num_nodes} nodes")]
    NodeOutOfRange { index: usize, num_nodes: usize },

    /// Edge references an ID that is not in the node list
    #[error("Unknown node ID '{0}'")]
    UnknownNode(String),

    /// Node list contains the same ID twice
    #[error("Duplicate node ID '{0}'")]
    DuplicateNode(String),
}

impl GraphError {
    /// Create a negative weight error
    pub fn negative_weight(i: usize, j: usize, weight: f64) -> Self {
        Self::NegativeWeight { i, j, weight }
    }

    /// Create an out-of-range error
    pub fn out_of_range(index: usize, num_nodes: usize) -> Self {
        Self::NodeOutOfRange { index, num_nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_weight_message() {
        let err = GraphError::negative_weight(0, 1, -1.0);
        let msg = format!("{}", err);
        assert!(msg.contains("-1"));
        assert!(msg.contains("(0, 1)"));
    }

    #[test]
    fn test_out_of_range_message() {
        let err = GraphError::out_of_range(5, 3);
        let msg = format!("{}", err);
        assert!(msg.contains("5"));
        assert!(msg.contains("3"));
    }

    #[test]
    fn test_empty_graph_message() {
        let msg = format!("{}", GraphError::EmptyGraph);
        assert!(msg.contains("at least one node"));
    }
}
