use petgraph::visit::EdgeRef;

use crate::graph::dag::{ColumnGraph, EdgeKind};

/// Output format for graph visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mermaid" => Ok(GraphFormat::Mermaid),
            "dot" | "graphviz" => Ok(GraphFormat::Dot),
            other => Err(format!("unknown graph format '{}', expected mermaid or dot", other)),
        }
    }
}

/// Render the column dependency graph. Edges run from a column to the
/// columns that read it.
pub fn visualize(graph: &ColumnGraph, format: GraphFormat) -> String {
    match format {
        GraphFormat::Mermaid => generate_mermaid(graph),
        GraphFormat::Dot => generate_dot(graph),
    }
}

fn edge_label(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Base => "base",
        EdgeKind::Placeholder => "expr",
    }
}

fn generate_mermaid(graph: &ColumnGraph) -> String {
    let mut output = String::from("graph TD\n");

    for node in graph.graph.node_indices() {
        let name = graph.column_name(node);
        output.push_str(&format!("    {}[{}]\n", name, name));
    }

    output.push('\n');

    for edge in graph.graph.edge_references() {
        let from = graph.column_name(edge.source());
        let to = graph.column_name(edge.target());
        let style = match edge.weight().kind {
            EdgeKind::Base => "-->",
            EdgeKind::Placeholder => "-.->",
        };
        output.push_str(&format!(
            "    {} {}|{}| {}\n",
            from,
            style,
            edge_label(edge.weight().kind),
            to
        ));
    }

    output
}

fn generate_dot(graph: &ColumnGraph) -> String {
    let mut output = String::from("digraph dependencies {\n");
    output.push_str("    rankdir=TB;\n");
    output.push_str("    node [shape=box, style=rounded];\n\n");

    for node in graph.graph.node_indices() {
        output.push_str(&format!("    \"{}\";\n", graph.column_name(node)));
    }

    for edge in graph.graph.edge_references() {
        let from = graph.column_name(edge.source());
        let to = graph.column_name(edge.target());
        let kind = edge.weight().kind;
        let extra = if kind == EdgeKind::Placeholder {
            ", style=dashed"
        } else {
            ""
        };
        output.push_str(&format!(
            "    \"{}\" -> \"{}\" [label=\"{}\"{}];\n",
            from,
            to,
            edge_label(kind),
            extra
        ));
    }

    output.push_str("}\n");
    output
}
