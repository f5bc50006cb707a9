//! Weighted undirected similarity graph
//!
//! The graph is supplied by the caller as a node-ID list plus an edge list of
//! `(id_a, id_b, weight)` triples. Nodes are addressed internally by position,
//! and position `i` becomes qubit `i` / bit `i` downstream.
//!
//! Construction does not validate edge semantics (self-loops, duplicates,
//! weight sign); [`Graph::validate`] does, and the Hamiltonian builder calls it.

use crate::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A graph node: opaque ID plus arbitrary attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque identifier supplied by the caller
    pub id: String,
    /// Caller-defined attributes, carried through untouched
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Node {
    /// Create a node without attributes
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: serde_json::Map::new(),
        }
    }

    /// Attach an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// An undirected weighted edge between node positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub i: usize,
    pub j: usize,
    pub weight: f64,
}

/// Weighted undirected graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Create a graph over `num_nodes` anonymous nodes from index triples
    ///
    /// Node IDs are the decimal positions (`"0"`, `"1"`, ...).
    ///
    /// # Example
    /// ```
    /// use qcut_core::Graph;
    ///
    /// let graph = Graph::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.5), (2, 3, 1.0)]);
    /// assert_eq!(graph.num_nodes(), 4);
    /// assert_eq!(graph.num_edges(), 3);
    /// ```
    pub fn from_edges(num_nodes: usize, edges: &[(usize, usize, f64)]) -> Self {
        let nodes = (0..num_nodes).map(|i| Node::new(i.to_string())).collect();
        let edges = edges
            .iter()
            .map(|&(i, j, weight)| Edge { i, j, weight })
            .collect();
        Self { nodes, edges }
    }

    /// Create a graph from node IDs and `(id_a, id_b, weight)` triples
    ///
    /// # Errors
    /// Returns error if an ID is repeated or an edge names an unknown ID
    pub fn from_id_edges<S: AsRef<str>>(
        node_ids: &[S],
        edges: &[(S, S, f64)],
    ) -> Result<Self> {
        let nodes = node_ids.iter().map(|id| Node::new(id.as_ref())).collect();
        Self::from_nodes(nodes, edges)
    }

    /// Create a graph from full node records and `(id_a, id_b, weight)` triples
    ///
    /// # Errors
    /// Returns error if an ID is repeated or an edge names an unknown ID
    pub fn from_nodes<S: AsRef<str>>(nodes: Vec<Node>, edges: &[(S, S, f64)]) -> Result<Self> {
        let resolved = {
            let mut index: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
            for (position, node) in nodes.iter().enumerate() {
                if index.insert(node.id.as_str(), position).is_some() {
                    return Err(GraphError::DuplicateNode(node.id.clone()));
                }
            }

            let lookup = |id: &str| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
            };

            let mut resolved = Vec::with_capacity(edges.len());
            for (a, b, weight) in edges {
                resolved.push(Edge {
                    i: lookup(a.as_ref())?,
                    j: lookup(b.as_ref())?,
                    weight: *weight,
                });
            }
            resolved
        };

        Ok(Self {
            nodes,
            edges: resolved,
        })
    }

    /// Create a complete graph with unit weights
    pub fn complete(num_nodes: usize) -> Self {
        let mut edges = Vec::new();
        for i in 0..num_nodes {
            for j in (i + 1)..num_nodes {
                edges.push((i, j, 1.0));
            }
        }
        Self::from_edges(num_nodes, &edges)
    }

    /// Create a cycle graph with unit weights
    pub fn cycle(num_nodes: usize) -> Self {
        let edges: Vec<_> = (0..num_nodes)
            .map(|i| (i, (i + 1) % num_nodes, 1.0))
            .collect();
        Self::from_edges(num_nodes, &edges)
    }

    /// Create a path graph with unit weights
    pub fn path(num_nodes: usize) -> Self {
        let edges: Vec<_> = (1..num_nodes).map(|i| (i - 1, i, 1.0)).collect();
        Self::from_edges(num_nodes, &edges)
    }

    /// Check the structural invariants required by the Hamiltonian builder
    ///
    /// # Errors
    /// - [`GraphError::EmptyGraph`] if there are no nodes
    /// - [`GraphError::NodeOutOfRange`] for a dangling endpoint
    /// - [`GraphError::SelfLoop`] for `i == j`
    /// - [`GraphError::NonFiniteWeight`] / [`GraphError::NegativeWeight`]
    /// - [`GraphError::DuplicateEdge`] if an unordered pair repeats
    pub fn validate(&self) -> Result<()> {
        let num_nodes = self.nodes.len();
        if num_nodes == 0 {
            return Err(GraphError::EmptyGraph);
        }

        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            for endpoint in [edge.i, edge.j] {
                if endpoint >= num_nodes {
                    return Err(GraphError::out_of_range(endpoint, num_nodes));
                }
            }
            if edge.i == edge.j {
                return Err(GraphError::SelfLoop(edge.i));
            }
            if !edge.weight.is_finite() {
                return Err(GraphError::NonFiniteWeight {
                    i: edge.i,
                    j: edge.j,
                });
            }
            if edge.weight < 0.0 {
                return Err(GraphError::negative_weight(edge.i, edge.j, edge.weight));
            }
            let key = (edge.i.min(edge.j), edge.i.max(edge.j));
            if !seen.insert(key) {
                return Err(GraphError::DuplicateEdge(key.0, key.1));
            }
        }

        Ok(())
    }

    /// Number of nodes (binary decision variables)
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// All nodes in position order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Node IDs in position order
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// Position of a node ID
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Neighbors of a node with edge weights
    pub fn neighbors(&self, node: usize) -> Vec<(usize, f64)> {
        self.edges
            .iter()
            .filter_map(|e| {
                if e.i == node {
                    Some((e.j, e.weight))
                } else if e.j == node {
                    Some((e.i, e.weight))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Degree of a node
    pub fn degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }

    /// Sum of all edge weights
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Weight of the edges cut by an assignment (position `i` = node `i`)
    ///
    /// # Panics
    /// Panics if `bits` is shorter than the node count.
    pub fn cut_value(&self, bits: &[u8]) -> f64 {
        self.edges
            .iter()
            .filter(|e| bits[e.i] != bits[e.j])
            .map(|e| e.weight)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_creation() {
        let graph = Graph::from_edges(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)]);
        assert_eq!(graph.num_nodes(), 4);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.degree(1), 2);
        assert_eq!(graph.degree(0), 1);
        assert_eq!(graph.node_ids(), vec!["0", "1", "2", "3"]);
    }

    #[test]
    fn test_complete_graph() {
        let graph = Graph::complete(4);
        assert_eq!(graph.num_edges(), 6);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_cycle_graph() {
        let graph = Graph::cycle(5);
        assert_eq!(graph.num_edges(), 5);
        for i in 0..5 {
            assert_eq!(graph.degree(i), 2);
        }
    }

    #[test]
    fn test_from_id_edges() {
        let graph = Graph::from_id_edges(
            &["alice", "bob", "carol"],
            &[("alice", "bob", 0.5), ("carol", "bob", 0.8)],
        )
        .unwrap();
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.index_of("carol"), Some(2));
        assert_eq!(graph.edges()[1], Edge { i: 2, j: 1, weight: 0.8 });
    }

    #[test]
    fn test_unknown_node_id() {
        let err = Graph::from_id_edges(&["a", "b"], &[("a", "z", 1.0)]).unwrap_err();
        assert_eq!(err, GraphError::UnknownNode("z".to_string()));
    }

    #[test]
    fn test_duplicate_node_id() {
        let err = Graph::from_id_edges::<&str>(&["a", "a"], &[]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode("a".to_string()));
    }

    #[test]
    fn test_validate_rejects_self_loop() {
        let graph = Graph::from_edges(2, &[(0, 0, 1.0)]);
        assert_eq!(graph.validate(), Err(GraphError::SelfLoop(0)));
    }

    #[test]
    fn test_validate_rejects_reversed_duplicate() {
        let graph = Graph::from_edges(3, &[(0, 1, 1.0), (1, 0, 2.0)]);
        assert_eq!(graph.validate(), Err(GraphError::DuplicateEdge(0, 1)));
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let negative = Graph::from_edges(2, &[(0, 1, -1.0)]);
        assert!(matches!(
            negative.validate(),
            Err(GraphError::NegativeWeight { .. })
        ));

        let nan = Graph::from_edges(2, &[(0, 1, f64::NAN)]);
        assert!(matches!(nan.validate(), Err(GraphError::NonFiniteWeight { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_and_dangling() {
        assert_eq!(Graph::from_edges(0, &[]).validate(), Err(GraphError::EmptyGraph));

        let dangling = Graph::from_edges(2, &[(0, 5, 1.0)]);
        assert_eq!(dangling.validate(), Err(GraphError::out_of_range(5, 2)));
    }

    #[test]
    fn test_cut_value() {
        let graph = Graph::cycle(4);
        assert_eq!(graph.cut_value(&[1, 0, 1, 0]), 4.0);
        assert_eq!(graph.cut_value(&[0, 0, 0, 0]), 0.0);
    }

    #[test]
    fn test_node_attributes_survive() {
        let nodes = vec![
            Node::new("n1").with_attribute("cluster", serde_json::json!("left")),
            Node::new("n2"),
        ];
        let graph = Graph::from_nodes(nodes, &[("n1", "n2", 0.9)]).unwrap();
        assert_eq!(graph.nodes()[0].attributes["cluster"], "left");
    }
}
