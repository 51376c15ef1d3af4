use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{PlanError, Result};
use crate::graph::dag::ColumnGraph;
use crate::graph::topo::resolve_order;
use crate::plan::{GenerationPlan, PlannedColumn};
use crate::spec::options::ColumnOptions;
use crate::spec::types::DataType;
use crate::spec::{ColumnDeclaration, ColumnSpec};
use crate::synth::Synthesizer;

/// Name of the row id column when none is configured.
pub const DEFAULT_SEED_COLUMN: &str = "id";

/// Plan seed when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Fluent accumulator of column declarations.
///
/// Each `with_column` call validates its declaration immediately. `build()`
/// consumes the builder, so a new plan always starts from a fresh one.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    name: String,
    rows: u64,
    partitions: usize,
    seed: u64,
    seed_column: String,
    id_output: bool,
    allow_empty: bool,
    pending: IndexMap<String, ColumnSpec>,
}

impl PlanBuilder {
    pub fn new(rows: u64, partitions: usize, name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows,
            partitions,
            seed: DEFAULT_SEED,
            seed_column: DEFAULT_SEED_COLUMN.to_string(),
            id_output: false,
            allow_empty: false,
            pending: IndexMap::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Rename the row id column (default `id`).
    pub fn with_seed_column(mut self, name: &str) -> Self {
        self.seed_column = name.to_string();
        self
    }

    /// Emit the row id column as the first output column.
    pub fn with_id_output(mut self) -> Self {
        self.id_output = true;
        self
    }

    /// Accept a row count of zero instead of failing with `ZeroRows`.
    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn with_column(self, name: &str, data_type: DataType, options: ColumnOptions) -> Result<Self> {
        let spec = ColumnSpec::new(name, data_type, options)?;
        self.with_column_spec(spec)
    }

    pub fn with_declaration(self, declaration: ColumnDeclaration) -> Result<Self> {
        let spec = ColumnSpec::from_declaration(declaration)?;
        self.with_column_spec(spec)
    }

    /// Add an already validated spec. An earlier implicit declaration with
    /// the same name is replaced in place; any other repeat is an error.
    pub fn with_column_spec(mut self, spec: ColumnSpec) -> Result<Self> {
        if spec.name() == self.seed_column {
            return Err(PlanError::DuplicateColumn {
                column: spec.name().to_string(),
            });
        }
        match self.pending.get(spec.name()) {
            Some(existing) if existing.is_implicit() => {
                debug!(column = spec.name(), "replacing implicit column definition");
            }
            Some(_) => {
                return Err(PlanError::DuplicateColumn {
                    column: spec.name().to_string(),
                });
            }
            None => {}
        }
        self.pending.insert(spec.name().to_string(), spec);
        Ok(self)
    }

    /// Number of declarations accumulated so far.
    pub fn column_count(&self) -> usize {
        self.pending.len()
    }

    /// Resolve dependencies, synthesize every column and freeze the plan.
    pub fn build(self) -> Result<GenerationPlan> {
        if self.rows == 0 && !self.allow_empty {
            return Err(PlanError::ZeroRows {
                plan: self.name,
                rows: self.rows,
            });
        }
        if self.partitions == 0 {
            return Err(PlanError::InvalidPlan {
                plan: self.name,
                message: "partitions must be at least 1".to_string(),
            });
        }
        if self.seed_column.trim().is_empty() {
            return Err(PlanError::InvalidPlan {
                plan: self.name,
                message: "seed column name must not be empty".to_string(),
            });
        }
        if self.pending.contains_key(&self.seed_column) {
            return Err(PlanError::DuplicateColumn {
                column: self.seed_column,
            });
        }

        let specs: Vec<ColumnSpec> = self.pending.into_values().collect();
        let declarations: Vec<ColumnDeclaration> = specs.iter().map(ColumnSpec::declaration).collect();

        let graph = ColumnGraph::build(&specs, &self.seed_column)?;
        let order = resolve_order(&graph)?;

        let mut slots: Vec<Option<ColumnSpec>> = specs.into_iter().map(Some).collect();
        let mut synth = Synthesizer::new(self.seed, &self.seed_column);
        let mut columns = Vec::with_capacity(slots.len());
        let mut seen_outputs: HashSet<String> = HashSet::new();
        seen_outputs.insert(self.seed_column.clone());

        for idx in order.indices {
            let spec = slots
                .get_mut(idx)
                .and_then(Option::take)
                .ok_or_else(|| PlanError::InvalidPlan {
                    plan: self.name.clone(),
                    message: format!("column at position {} was ordered twice", idx),
                })?;
            let synthesized = synth.synthesize(&spec)?;
            for output in &synthesized.outputs {
                if !seen_outputs.insert(output.clone()) {
                    return Err(PlanError::DuplicateColumn {
                        column: output.clone(),
                    });
                }
            }
            let dependencies = spec.references().iter().map(|r| r.to_string()).collect();
            columns.push(PlannedColumn {
                spec,
                expr: synthesized.expr,
                outputs: synthesized.outputs,
                dependencies,
            });
        }

        let plan = GenerationPlan {
            name: self.name,
            rows: self.rows,
            partitions: self.partitions,
            seed: self.seed,
            seed_column: self.seed_column,
            id_output: self.id_output,
            allow_empty: self.allow_empty,
            columns,
            declarations,
            graph,
        };

        info!(
            plan = %plan.name(),
            rows = plan.rows(),
            partitions = plan.partitions(),
            columns = plan.columns().len(),
            outputs = plan.output_columns().len(),
            "compiled generation plan"
        );

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_column_rejected_at_declaration() {
        let err = PlanBuilder::new(10, 1, "t")
            .with_column("a", DataType::Int, ColumnOptions::new())
            .unwrap()
            .with_column("a", DataType::Int, ColumnOptions::new())
            .unwrap_err();
        assert!(matches!(err, PlanError::DuplicateColumn { ref column } if column == "a"));
    }

    #[test]
    fn test_implicit_column_is_replaced_in_place() {
        let plan = PlanBuilder::new(10, 1, "t")
            .with_column("a", DataType::Int, ColumnOptions::new().implicit())
            .unwrap()
            .with_column("b", DataType::Int, ColumnOptions::new())
            .unwrap()
            .with_column("a", DataType::String, ColumnOptions::new().values(["x"]))
            .unwrap()
            .build()
            .unwrap();
        let names: Vec<&str> = plan.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(plan.columns()[0].spec().data_type(), DataType::String);
    }

    #[test]
    fn test_seed_column_name_is_reserved() {
        let err = PlanBuilder::new(10, 1, "t")
            .with_column("id", DataType::Int, ColumnOptions::new())
            .unwrap_err();
        assert!(matches!(err, PlanError::DuplicateColumn { .. }));

        let err = PlanBuilder::new(10, 1, "t")
            .with_column("row", DataType::Int, ColumnOptions::new())
            .unwrap()
            .with_seed_column("row")
            .build()
            .unwrap_err();
        assert!(matches!(err, PlanError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_zero_rows() {
        let err = PlanBuilder::new(0, 1, "empty").build().unwrap_err();
        assert!(matches!(err, PlanError::ZeroRows { .. }));
        let plan = PlanBuilder::new(0, 1, "empty").allow_empty().build().unwrap();
        assert_eq!(plan.rows(), 0);
    }

    #[test]
    fn test_zero_partitions() {
        let err = PlanBuilder::new(5, 0, "t").build().unwrap_err();
        assert!(matches!(err, PlanError::InvalidPlan { .. }));
    }

    #[test]
    fn test_sibling_name_clash() {
        let err = PlanBuilder::new(5, 1, "t")
            .with_column("r_1", DataType::Int, ColumnOptions::new())
            .unwrap()
            .with_column("r", DataType::Int, ColumnOptions::new().num_columns(2))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, PlanError::DuplicateColumn { ref column } if column == "r_1"));
    }

    #[test]
    fn test_unknown_reference_at_build() {
        let err = PlanBuilder::new(5, 1, "t")
            .with_column("b", DataType::Int, ColumnOptions::new().base_column("nope"))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, PlanError::UnknownReference { .. }));
    }
}
