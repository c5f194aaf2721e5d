/*
Indexed adjacency-list graph with non-negative f64 edge weights.

Nodes are dense indices 0..len. Edges can be added one at a time or loaded from
a CSV edge list with a header row and columns node_id,neighbor_id,weight.
Weights are validated here, at the collaborator boundary, since the search
engine itself never checks them.
*/

use ordered_float::OrderedFloat;
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

pub type NodeId = usize;
pub type Cost = f64;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("reading edge list: {0}")]
    Csv(#[from] csv::Error),

    #[error("opening edge list: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: column {column} has invalid value {value:?}")]
    InvalidField {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("edge {from} -> {to} has weight {weight}; weights must be finite and non-negative")]
    InvalidWeight { from: NodeId, to: NodeId, weight: Cost },

    #[error("node {node} is out of range for a graph of {len} nodes")]
    NodeOutOfRange { node: NodeId, len: usize },
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    adj: Vec<Vec<(NodeId, Cost)>>,
    edges: usize,
}

impl Graph {
    pub fn with_nodes(n: usize) -> Self {
        Self {
            adj: vec![Vec::new(); n],
            edges: 0,
        }
    }

    /// Builds a graph with `max id + 1` nodes from directed `(from, to, weight)` triples.
    pub fn from_edges(edges: &[(NodeId, NodeId, Cost)]) -> Result<Self, GraphError> {
        let n = edges
            .iter()
            .map(|&(u, v, _)| u.max(v) + 1)
            .max()
            .unwrap_or(0);

        let mut graph = Self::with_nodes(n);
        for &(u, v, w) in edges {
            graph.add_edge(u, v, w)?;
        }
        Ok(graph)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, GraphError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut edges = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            let node_id: NodeId = parse_field(&record, line, 0)?;
            let neighbor_id: NodeId = parse_field(&record, line, 1)?;
            let weight: Cost = parse_field(&record, line, 2)?;
            edges.push((node_id, neighbor_id, weight));
        }
        tracing::debug!(edges = edges.len(), "parsed edge list");

        Self::from_edges(&edges)
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: Cost) -> Result<(), GraphError> {
        let len = self.adj.len();
        if let Some(node) = [from, to].into_iter().find(|&n| n >= len) {
            return Err(GraphError::NodeOutOfRange { node, len });
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight { from, to, weight });
        }
        self.adj[from].push((to, weight));
        self.edges += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.adj.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, Cost)] {
        self.adj.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Out-edges of `node` in the form the search engine consumes, or `None`
    /// if it has none.
    pub fn weighted_neighbors(
        &self,
        node: NodeId,
    ) -> Option<impl Iterator<Item = (NodeId, OrderedFloat<Cost>)> + '_> {
        let edges = self.neighbors(node);
        if edges.is_empty() {
            return None;
        }
        Some(edges.iter().map(|&(v, w)| (v, OrderedFloat(w))))
    }

    /// Out-neighbours of `node` with weights dropped, for flood fills.
    pub fn unweighted_neighbors(&self, node: NodeId) -> Option<impl Iterator<Item = NodeId> + '_> {
        self.weighted_neighbors(node).map(|it| it.map(|(v, _)| v))
    }
}

fn parse_field<F: std::str::FromStr>(record: &csv::StringRecord, line: u64, column: usize) -> Result<F, GraphError> {
    let raw = record.get(column).unwrap_or_default();
    raw.parse().map_err(|_| GraphError::InvalidField {
        line,
        column,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_edge_triples() {
        let graph = Graph::from_edges(&[(0, 1, 1.5), (1, 3, 2.0), (0, 1, 4.0)]).unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(0), &[(1, 1.5), (1, 4.0)]);
        assert!(graph.neighbors(2).is_empty());
        assert!(graph.neighbors(99).is_empty());
        assert!(graph.weighted_neighbors(2).is_none());
        let unweighted: Vec<NodeId> = graph.unweighted_neighbors(0).unwrap().collect();
        assert_eq!(unweighted, vec![1, 1]);
    }

    #[test]
    fn empty_edge_list_is_empty_graph() {
        let graph = Graph::from_edges(&[]).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn rejects_bad_weights() {
        for weight in [-1.0, f64::NAN, f64::INFINITY] {
            let err = Graph::from_edges(&[(0, 1, weight)]).unwrap_err();
            assert!(matches!(err, GraphError::InvalidWeight { from: 0, to: 1, .. }));
        }
    }

    #[test]
    fn rejects_out_of_range_nodes() {
        let mut graph = Graph::with_nodes(2);
        let err = graph.add_edge(0, 5, 1.0).unwrap_err();
        assert!(matches!(err, GraphError::NodeOutOfRange { node: 5, len: 2 }));
        assert_eq!(err.to_string(), "node 5 is out of range for a graph of 2 nodes");
    }

    #[test]
    fn loads_csv() {
        let data = "node_id,neighbor_id,weight\n0,1,1.0\n1, 2, 0.5\n2,0,3\n";
        let graph = Graph::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.neighbors(1), &[(2, 0.5)]);
        assert_eq!(graph.neighbors(2), &[(0, 3.0)]);
    }

    #[test]
    fn csv_errors_name_the_line() {
        let data = "node_id,neighbor_id,weight\n0,1,1.0\n1,x,2.0\n";
        let err = Graph::from_csv_reader(data.as_bytes()).unwrap_err();
        match err {
            GraphError::InvalidField { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, 1);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn csv_missing_column() {
        let data = "node_id,neighbor_id,weight\n0,1\n";
        let err = Graph::from_csv_reader(data.as_bytes()).unwrap_err();
        // The csv reader itself rejects ragged rows.
        assert!(matches!(err, GraphError::Csv(_)));
    }
}
