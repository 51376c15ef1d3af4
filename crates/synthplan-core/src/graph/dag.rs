use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use crate::error::{PlanError, Result};
use crate::spec::ColumnSpec;

/// A directed graph of column dependencies.
///
/// Nodes are added in declaration order, so a node's index is the position
/// of its spec in the declaration list. Edges point from the column being
/// read to the column that reads it (dependency → dependent).
#[derive(Debug, Clone)]
pub struct ColumnGraph {
    pub graph: DiGraph<String, EdgeInfo>,
    pub node_indices: HashMap<String, NodeIndex>,
}

/// How a dependent column reads its dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Listed in `base_column`.
    Base,
    /// Named by an expression placeholder.
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct EdgeInfo {
    pub kind: EdgeKind,
    /// Position of the reference within the dependent's reference list.
    pub position: usize,
}

impl ColumnGraph {
    /// Build the graph from declared specs.
    ///
    /// References to `seed_column` are satisfied by the row id base and add
    /// no edge. Any other reference must name a declared column.
    pub fn build(specs: &[ColumnSpec], seed_column: &str) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for spec in specs {
            let idx = graph.add_node(spec.name().to_string());
            node_indices.insert(spec.name().to_string(), idx);
        }

        for spec in specs {
            let to_idx = node_indices[spec.name()];
            for (position, reference) in spec.references().into_iter().enumerate() {
                if reference == seed_column {
                    continue;
                }
                let Some(&from_idx) = node_indices.get(reference) else {
                    return Err(PlanError::UnknownReference {
                        column: spec.name().to_string(),
                        reference: reference.to_string(),
                    });
                };
                let kind = if spec.base_columns().iter().any(|b| b == reference) {
                    EdgeKind::Base
                } else {
                    EdgeKind::Placeholder
                };
                graph.add_edge(from_idx, to_idx, EdgeInfo { kind, position });
            }
        }

        Ok(Self {
            graph,
            node_indices,
        })
    }

    pub fn column_name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn node_index(&self, column: &str) -> Option<NodeIndex> {
        self.node_indices.get(column).copied()
    }

    /// Columns read by `idx`, in the order the dependent lists them.
    pub fn dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.weight().position, e.source()))
            .collect();
        deps.sort_by_key(|(position, _)| *position);
        deps.into_iter().map(|(_, node)| node).collect()
    }

    pub fn column_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
