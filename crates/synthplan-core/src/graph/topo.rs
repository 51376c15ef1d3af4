use petgraph::graph::NodeIndex;

use crate::error::{PlanError, Result};
use crate::graph::dag::ColumnGraph;

/// Evaluation order of the columns in a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOrder {
    /// Declaration indices, dependencies before dependents.
    pub indices: Vec<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Visited,
}

/// Depth-first topological sort.
///
/// Roots are taken in declaration order and each column's dependencies are
/// visited in the order it lists them, so columns with no ordering
/// constraint between them keep their relative declaration order. Meeting a
/// column that is still being visited means a cycle; the error names it as
/// a path, e.g. `a -> b -> a`.
pub fn resolve_order(graph: &ColumnGraph) -> Result<EvaluationOrder> {
    let n = graph.column_count();
    let mut marks = vec![Mark::Unvisited; n];
    let mut indices = Vec::with_capacity(n);
    let mut path: Vec<NodeIndex> = Vec::new();

    for root in graph.graph.node_indices() {
        visit(graph, root, &mut marks, &mut path, &mut indices)?;
    }

    Ok(EvaluationOrder { indices })
}

fn visit(
    graph: &ColumnGraph,
    node: NodeIndex,
    marks: &mut [Mark],
    path: &mut Vec<NodeIndex>,
    order: &mut Vec<usize>,
) -> Result<()> {
    match marks[node.index()] {
        Mark::Visited => return Ok(()),
        Mark::Visiting => return Err(cycle_error(graph, path, node)),
        Mark::Unvisited => {}
    }

    marks[node.index()] = Mark::Visiting;
    path.push(node);
    for dep in graph.dependencies(node) {
        visit(graph, dep, marks, path, order)?;
    }
    path.pop();
    marks[node.index()] = Mark::Visited;
    order.push(node.index());
    Ok(())
}

/// The DFS path runs dependent → dependency; the cycle is reported in
/// reading order starting from where it closes.
fn cycle_error(graph: &ColumnGraph, path: &[NodeIndex], closing: NodeIndex) -> PlanError {
    let start = path.iter().position(|&n| n == closing).unwrap_or(0);
    let mut names: Vec<&str> = path[start..]
        .iter()
        .map(|&n| graph.column_name(n))
        .collect();
    names.push(graph.column_name(closing));
    PlanError::CyclicDependency {
        cycle: names.join(" -> "),
    }
}
