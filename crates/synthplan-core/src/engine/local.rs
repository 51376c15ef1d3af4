use rayon::prelude::*;
use tracing::debug;

use crate::engine::evaluator::{ExpressionEvaluator, RenderedText};
use crate::engine::{ExecutionEngine, RowIdBase, Table};
use crate::error::Result;
use crate::plan::GenerationPlan;
use crate::synth::expr::RowContext;
use crate::value::Value;

/// In-process engine. Partitions are evaluated in parallel on the rayon
/// thread pool; rows within a partition are evaluated in order.
#[derive(Debug, Clone, Default)]
pub struct LocalEngine<E = RenderedText> {
    evaluator: E,
    partitions: Option<usize>,
}

impl LocalEngine<RenderedText> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: ExpressionEvaluator> LocalEngine<E> {
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            evaluator,
            partitions: None,
        }
    }

    /// Override the plan's partition count.
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = Some(partitions);
        self
    }

    /// Evaluate the plan over `0 .. plan.rows()`.
    pub fn evaluate(&self, plan: &GenerationPlan) -> Result<Table> {
        self.execute(plan, &RowIdBase::for_plan(plan))
    }

    /// Evaluate only the first `limit` rows of the plan.
    pub fn preview(&self, plan: &GenerationPlan, limit: u64) -> Result<Table> {
        let base = RowIdBase::Range {
            start: 0,
            count: plan.rows().min(limit),
        };
        self.execute(plan, &base)
    }
}

impl<E: ExpressionEvaluator> ExecutionEngine for LocalEngine<E> {
    fn execute(&self, plan: &GenerationPlan, base: &RowIdBase) -> Result<Table> {
        let partitions = self.partitions.unwrap_or(plan.partitions()).max(1);
        let ranges = base.partition_ranges(partitions);

        debug!(
            plan = %plan.name(),
            rows = base.len(),
            partitions = ranges.len(),
            "evaluating plan"
        );

        let chunks: Vec<Vec<Vec<Value>>> = ranges
            .into_par_iter()
            .map(|range| {
                range
                    .filter_map(|i| base.get(i))
                    .map(|row_id| evaluate_row(plan, row_id, &self.evaluator))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let columns = plan
            .output_columns()
            .into_iter()
            .map(str::to_string)
            .collect();

        Ok(Table {
            columns,
            rows: chunks.into_iter().flatten().collect(),
        })
    }
}

/// Evaluate every column of one row, in plan order, and lay out the output
/// cells.
pub fn evaluate_row<E>(plan: &GenerationPlan, row_id: i64, evaluator: &E) -> Result<Vec<Value>>
where
    E: ExpressionEvaluator + ?Sized,
{
    let mut slots: Vec<Value> = Vec::with_capacity(plan.columns().len());
    for column in plan.columns() {
        let row = RowContext {
            row_id,
            slots: &slots,
            rows: plan.rows(),
        };
        let value = column.expr().evaluate(column.name(), &row, evaluator)?;
        slots.push(value);
    }

    let mut out = Vec::with_capacity(slots.len() + 1);
    if plan.id_output() {
        out.push(Value::Int(row_id));
    }
    for (column, slot) in plan.columns().iter().zip(&slots) {
        if column.spec().is_omitted() {
            continue;
        }
        out.extend(column.expr().outputs(slot));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanBuilder;
    use crate::spec::options::ColumnOptions;
    use crate::spec::types::DataType;

    fn plan() -> GenerationPlan {
        PlanBuilder::new(50, 3, "local")
            .with_id_output()
            .with_column("a", DataType::Int, ColumnOptions::new().range(1, 10, 1).random(true))
            .unwrap()
            .with_column("b", DataType::Long, ColumnOptions::new().base_column("a").min(100))
            .unwrap()
            .with_column("t", DataType::String, ColumnOptions::new().expr("${a} + ${b}"))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_reads_produced_values() {
        let table = LocalEngine::new().evaluate(&plan()).unwrap();
        assert_eq!(table.num_rows(), 50);
        assert_eq!(table.columns, vec!["id", "a", "b", "t"]);
        for row in &table.rows {
            let a = row[1].as_int().unwrap();
            assert_eq!(row[2], Value::Int(a + 100));
            assert_eq!(row[3], Value::string(format!("{} + {}", a, a + 100)));
        }
    }

    #[test]
    fn test_partition_count_does_not_change_values() {
        let plan = plan();
        let one = LocalEngine::new().with_partitions(1).evaluate(&plan).unwrap();
        let many = LocalEngine::new().with_partitions(7).evaluate(&plan).unwrap();
        assert_eq!(one, many);
    }

    #[test]
    fn test_explicit_base_evaluates_given_ids() {
        let plan = plan();
        let engine = LocalEngine::new();
        let full = engine.evaluate(&plan).unwrap();
        let picked = engine
            .execute(&plan, &RowIdBase::Explicit(vec![42, 7]))
            .unwrap();
        assert_eq!(picked.rows[0], full.rows[42]);
        assert_eq!(picked.rows[1], full.rows[7]);
    }

    #[test]
    fn test_preview_limits_rows() {
        let table = LocalEngine::new().preview(&plan(), 5).unwrap();
        assert_eq!(table.num_rows(), 5);
    }
}
