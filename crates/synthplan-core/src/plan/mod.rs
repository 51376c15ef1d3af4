//! # Generation Plan
//!
//! The compiled artifact: every column's synthesized expression in
//! evaluation order, plus row count, partition count and seed. A plan is
//! immutable once built and holds no per-row state, so it can be evaluated
//! any number of times, by any number of consumers at once.

pub mod builder;

use crate::config::{PlanFile, PlanSection};
use crate::graph::dag::ColumnGraph;
use crate::graph::visualize::{visualize, GraphFormat};
use crate::spec::{ColumnDeclaration, ColumnSpec};
use crate::synth::expr::ColumnExpr;

pub use self::builder::PlanBuilder;

/// One column of a compiled plan.
#[derive(Debug, Clone)]
pub struct PlannedColumn {
    pub(crate) spec: ColumnSpec,
    pub(crate) expr: ColumnExpr,
    pub(crate) outputs: Vec<String>,
    pub(crate) dependencies: Vec<String>,
}

impl PlannedColumn {
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    pub fn expr(&self) -> &ColumnExpr {
        &self.expr
    }

    /// Physical output column names, empty for omitted columns.
    pub fn outputs(&self) -> &[String] {
        if self.spec.is_omitted() {
            &[]
        } else {
            &self.outputs
        }
    }

    /// Names this column reads, including the row id column.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub(crate) name: String,
    pub(crate) rows: u64,
    pub(crate) partitions: usize,
    pub(crate) seed: u64,
    pub(crate) seed_column: String,
    pub(crate) id_output: bool,
    pub(crate) allow_empty: bool,
    /// Columns in evaluation order.
    pub(crate) columns: Vec<PlannedColumn>,
    /// Declarations in the order they were made.
    pub(crate) declarations: Vec<ColumnDeclaration>,
    pub(crate) graph: ColumnGraph,
}

impl GenerationPlan {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn seed_column(&self) -> &str {
        &self.seed_column
    }

    pub fn id_output(&self) -> bool {
        self.id_output
    }

    /// Columns in evaluation order; a column's slot is its index here.
    pub fn columns(&self) -> &[PlannedColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&PlannedColumn> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Column names in evaluation order.
    pub fn order(&self) -> Vec<&str> {
        self.columns.iter().map(PlannedColumn::name).collect()
    }

    /// Physical output columns: the row id first when requested, then every
    /// non-omitted expanded column in evaluation order.
    pub fn output_columns(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if self.id_output {
            names.push(self.seed_column.as_str());
        }
        for column in &self.columns {
            names.extend(column.outputs().iter().map(String::as_str));
        }
        names
    }

    pub fn declarations(&self) -> &[ColumnDeclaration] {
        &self.declarations
    }

    pub fn graph(&self) -> &ColumnGraph {
        &self.graph
    }

    pub fn visualize(&self, format: GraphFormat) -> String {
        visualize(&self.graph, format)
    }

    /// Recover the plan file that rebuilds this plan.
    pub fn to_plan_file(&self) -> PlanFile {
        PlanFile {
            plan: PlanSection {
                name: self.name.clone(),
                rows: self.rows,
                partitions: self.partitions,
                seed: self.seed,
                seed_column: self.seed_column.clone(),
                id_output: self.id_output,
                allow_empty: self.allow_empty,
            },
            columns: self.declarations.clone(),
        }
    }

    /// Human-readable build plan, one entry per column in evaluation order.
    pub fn explain(&self) -> String {
        let mut out = format!(
            "Generation plan '{}': {} rows, {} partition{}, seed {}\n",
            self.name,
            self.rows,
            self.partitions,
            if self.partitions == 1 { "" } else { "s" },
            self.seed
        );
        out.push_str(&format!(
            "  row id: {}{}\n",
            self.seed_column,
            if self.id_output { " (output)" } else { "" }
        ));
        for (i, column) in self.columns.iter().enumerate() {
            let spec = column.spec();
            let mut notes = Vec::new();
            if !column.dependencies.is_empty() {
                notes.push(format!("reads {}", column.dependencies.join(", ")));
            }
            if spec.is_omitted() {
                notes.push("omitted".to_string());
            }
            if column.outputs.len() > 1 {
                notes.push(format!("outputs {}", column.outputs.join(", ")));
            }
            let notes = if notes.is_empty() {
                String::new()
            } else {
                format!(" ({})", notes.join("; "))
            };
            out.push_str(&format!(
                "  {}. {} {} {}{}\n     {}\n",
                i + 1,
                column.name(),
                spec.data_type(),
                spec.kind(),
                notes,
                column.expr
            ));
        }
        out.push_str(&format!("  outputs: {}\n", self.output_columns().join(", ")));
        out
    }
}
