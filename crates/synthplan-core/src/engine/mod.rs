//! # Execution
//!
//! A compiled plan is evaluated by an [`ExecutionEngine`] over a
//! [`RowIdBase`]. Every value is a pure function of the row id and the
//! values produced earlier in the same row, so rows may be split across any
//! number of partitions and evaluated in any order with identical results.
//!
//! [`LocalEngine`](local::LocalEngine) is an in-process engine used for
//! previews, tests and benchmarks.

pub mod evaluator;
pub mod local;

use std::ops::Range;

use indexmap::IndexMap;

use crate::error::Result;
use crate::plan::GenerationPlan;
use crate::value::Value;

/// Evaluates a plan over a row id base and materializes the result.
pub trait ExecutionEngine {
    fn execute(&self, plan: &GenerationPlan, base: &RowIdBase) -> Result<Table>;
}

/// The row ids a plan is evaluated over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIdBase {
    /// `start .. start + count`.
    Range { start: i64, count: u64 },
    /// An explicit id column.
    Explicit(Vec<i64>),
}

impl RowIdBase {
    /// `0 .. rows` for the plan's row count.
    pub fn for_plan(plan: &GenerationPlan) -> Self {
        RowIdBase::Range {
            start: 0,
            count: plan.rows(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RowIdBase::Range { count, .. } => *count as usize,
            RowIdBase::Explicit(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row id at a position of the base.
    pub fn get(&self, index: usize) -> Option<i64> {
        match self {
            RowIdBase::Range { start, count } => {
                ((index as u64) < *count).then(|| start.wrapping_add(index as i64))
            }
            RowIdBase::Explicit(ids) => ids.get(index).copied(),
        }
    }

    /// Split positions into at most `partitions` contiguous, near-equal
    /// ranges. Never returns an empty range.
    pub fn partition_ranges(&self, partitions: usize) -> Vec<Range<usize>> {
        let len = self.len();
        if len == 0 {
            return Vec::new();
        }
        let partitions = partitions.clamp(1, len);
        let chunk = len.div_ceil(partitions);
        (0..len)
            .step_by(chunk)
            .map(|start| start..(start + chunk).min(len))
            .collect()
    }
}

/// A materialized result: one row per row id, one column per output column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }

    /// One row keyed by column name, in column order.
    pub fn row_map(&self, index: usize) -> Option<IndexMap<&str, &Value>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect(),
        )
    }
}
