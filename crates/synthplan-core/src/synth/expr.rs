//! Synthesized, per-row value expressions.
//!
//! Expressions hold no per-row state. Evaluating one needs only the row id,
//! the values already produced for earlier columns of the same row, and the
//! row count of the plan.

use std::fmt;
use std::sync::Arc;

use crate::distribution::range::NumericRange;
use crate::distribution::seed::{SeedKey, Stream};
use crate::distribution::template::Template;
use crate::distribution::{Draw, NullInjection, ValueDistribution};
use crate::engine::evaluator::ExpressionEvaluator;
use crate::error::{PlanError, Result};
use crate::spec::options::RandomDistribution;
use crate::spec::types::DataType;
use crate::synth::shape::{cast, Shaping};
use crate::value::Value;

/// Everything an expression may read while evaluating one row.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub row_id: i64,
    /// Values produced so far for this row, one per column in plan order.
    pub slots: &'a [Value],
    /// Rows in the plan.
    pub rows: u64,
}

/// A reference to an already-produced value of the same row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// The row id itself, under its column name.
    RowId { name: String },
    /// The value produced by an earlier column, by its plan slot.
    Column { name: String, slot: usize },
}

impl Binding {
    pub fn name(&self) -> &str {
        match self {
            Binding::RowId { name } | Binding::Column { name, .. } => name,
        }
    }

    pub fn resolve(&self, row: &RowContext<'_>) -> Value {
        match self {
            Binding::RowId { .. } => Value::Int(row.row_id),
            Binding::Column { slot, .. } => row.slots.get(*slot).cloned().unwrap_or(Value::Null),
        }
    }
}

/// Where a non-random sample takes its ordinal from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrdinalSource {
    /// A single value, used directly when it has a natural ordinal.
    Value(Binding),
    /// Stable hash over several values.
    Hash(Vec<Binding>),
}

impl OrdinalSource {
    /// `None` when a directly used base value is null.
    pub fn resolve(&self, row: &RowContext<'_>) -> Option<i64> {
        match self {
            OrdinalSource::Value(binding) => {
                let value = binding.resolve(row);
                if value.is_null() {
                    return None;
                }
                Some(value.as_ordinal().unwrap_or_else(|| value.stable_hash()))
            }
            OrdinalSource::Hash(bindings) => {
                let values = bindings.iter().map(|b| b.resolve(row)).collect();
                Some(Value::Array(values).stable_hash())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum ValueSource {
    Sample {
        distribution: Arc<ValueDistribution>,
        seed: SeedKey,
        ordinal: OrdinalSource,
        /// Added to the ordinal; distinguishes non-random siblings.
        offset: i64,
        /// Shape of the uniform draw handed to the distribution.
        shape: RandomDistribution,
    },
    Template {
        template: Arc<Template>,
        /// One binding per placeholder, in placeholder order.
        bindings: Vec<Binding>,
    },
}

/// One produced value: a source, then casting or shaping, then nulls.
#[derive(Debug, Clone)]
pub struct ValueExpr {
    pub source: ValueSource,
    pub data_type: DataType,
    pub shaping: Option<Arc<Shaping>>,
    pub nulls: Option<NullInjection>,
}

impl ValueExpr {
    pub fn evaluate<E>(&self, column: &str, row: &RowContext<'_>, evaluator: &E) -> Result<Value>
    where
        E: ExpressionEvaluator + ?Sized,
    {
        if let Some(nulls) = &self.nulls {
            if nulls.is_null(row.row_id) {
                return Ok(Value::Null);
            }
        }

        match &self.source {
            ValueSource::Sample {
                distribution,
                seed,
                ordinal,
                offset,
                shape,
            } => {
                let Some(ordinal) = ordinal.resolve(row) else {
                    return Ok(Value::Null);
                };
                let draw = Draw {
                    uniform: seed.draw(row.row_id, Stream::Value, *shape),
                    ordinal: ordinal.wrapping_add(*offset),
                    modulus: row.rows,
                };
                let raw = distribution.sample(&draw);
                Ok(match &self.shaping {
                    Some(shaping) => shaping.apply(raw),
                    None => cast(raw, self.data_type),
                })
            }
            ValueSource::Template { .. } => {
                let text = self.render(row).unwrap_or_default();
                evaluator
                    .evaluate(&text, self.data_type)
                    .map_err(|message| PlanError::Evaluation {
                        column: column.to_string(),
                        message: format!("{} (expression: {})", message, text),
                    })
            }
        }
    }

    /// Rendered template text for a row; `None` for sampled values.
    pub fn render(&self, row: &RowContext<'_>) -> Option<String> {
        match &self.source {
            ValueSource::Template { template, bindings } => {
                let literals: Vec<String> = bindings
                    .iter()
                    .map(|b| b.resolve(row).to_literal())
                    .collect();
                Some(template.render(&literals))
            }
            ValueSource::Sample { .. } => None,
        }
    }
}

/// The compiled expression of one declaration.
#[derive(Debug, Clone)]
pub enum ColumnExpr {
    /// One value, one output column.
    Scalar(ValueExpr),
    /// `n` values, one output column each (`name_0 .. name_{n-1}`).
    Siblings(Vec<ValueExpr>),
    /// `n` values collected into one array-valued output column.
    Array(Vec<ValueExpr>),
}

impl ColumnExpr {
    pub fn elements(&self) -> &[ValueExpr] {
        match self {
            ColumnExpr::Scalar(expr) => std::slice::from_ref(expr),
            ColumnExpr::Siblings(exprs) | ColumnExpr::Array(exprs) => exprs,
        }
    }

    /// Value held in the column's slot. Siblings and arrays both produce an
    /// array; a column reading them binds to the whole list.
    pub fn evaluate<E>(&self, column: &str, row: &RowContext<'_>, evaluator: &E) -> Result<Value>
    where
        E: ExpressionEvaluator + ?Sized,
    {
        match self {
            ColumnExpr::Scalar(expr) => expr.evaluate(column, row, evaluator),
            ColumnExpr::Siblings(exprs) | ColumnExpr::Array(exprs) => exprs
                .iter()
                .map(|e| e.evaluate(column, row, evaluator))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
        }
    }

    /// Split a slot value into its output cells.
    pub fn outputs(&self, slot: &Value) -> Vec<Value> {
        match (self, slot) {
            (ColumnExpr::Siblings(exprs), Value::Array(items)) => {
                (0..exprs.len()).map(|i| items.get(i).cloned().unwrap_or(Value::Null)).collect()
            }
            (ColumnExpr::Siblings(exprs), _) => vec![Value::Null; exprs.len()],
            _ => vec![slot.clone()],
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for OrdinalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrdinalSource::Value(b) => write!(f, "{}", b),
            OrdinalSource::Hash(bs) => {
                let names: Vec<&str> = bs.iter().map(Binding::name).collect();
                write!(f, "hash({})", names.join(", "))
            }
        }
    }
}

fn list(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_literal)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ValueSource::Sample {
                distribution,
                seed,
                ordinal,
                offset,
                shape,
            } => {
                let seed = match shape {
                    RandomDistribution::Uniform => seed.to_string(),
                    RandomDistribution::Normal => format!("{}, normal", seed),
                };
                let over = if *offset == 0 {
                    ordinal.to_string()
                } else {
                    format!("{} + {}", ordinal, offset)
                };
                match distribution.as_ref() {
                    ValueDistribution::Range {
                        range,
                        random: true,
                        continuous,
                    } => {
                        let func = if *continuous { "continuous" } else { "uniform" };
                        write!(f, "{}({}, seed={})", func, range, seed)?
                    }
                    ValueDistribution::Range { range, .. } => {
                        write!(f, "cycle({}, over={})", range, over)?
                    }
                    ValueDistribution::Temporal { range, random } => {
                        let span = format!(
                            "from {} by {}s",
                            range.begin.format("%Y-%m-%d %H:%M:%S"),
                            match range.offsets {
                                NumericRange::Int { step, .. } => step,
                                _ => 0,
                            }
                        );
                        if *random {
                            write!(f, "uniform({}, seed={})", span, seed)?
                        } else {
                            write!(f, "cycle({}, over={})", span, over)?
                        }
                    }
                    ValueDistribution::Values { values, random } => {
                        if *random {
                            write!(f, "pick([{}], seed={})", list(values), seed)?
                        } else {
                            write!(f, "cycle([{}], over={})", list(values), over)?
                        }
                    }
                    ValueDistribution::Weighted {
                        values,
                        weights,
                        random,
                    } => {
                        let pairs: Vec<String> = values
                            .iter()
                            .zip(weights.weights())
                            .map(|(v, w)| format!("{}:{}", v.to_literal(), w))
                            .collect();
                        if *random {
                            write!(f, "weighted([{}], seed={})", pairs.join(", "), seed)?
                        } else {
                            write!(f, "spread([{}], over={})", pairs.join(", "), over)?
                        }
                    }
                    ValueDistribution::BaseDerived { offset: base } => {
                        write!(f, "{} + {}", over, base.as_f64())?
                    }
                }
            }
            ValueSource::Template { template, .. } => write!(f, "expr(\"{}\")", template)?,
        }

        if let Some(shaping) = &self.shaping {
            write!(f, " shaped({})", shaping)?;
        } else if !matches!(self.source, ValueSource::Template { .. }) {
            write!(f, " as {}", self.data_type)?;
        }
        if let Some(nulls) = &self.nulls {
            write!(f, " nulls({})", nulls.probability)?;
        }
        Ok(())
    }
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnExpr::Scalar(expr) => write!(f, "{}", expr),
            ColumnExpr::Siblings(exprs) | ColumnExpr::Array(exprs) => {
                let label = if matches!(self, ColumnExpr::Array(_)) {
                    "array"
                } else {
                    "siblings"
                };
                write!(f, "{}[", label)?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", expr)?;
                }
                write!(f, "]")
            }
        }
    }
}
