//! # Value Distributions
//!
//! Deterministic per-row sampling rules. A distribution is a description,
//! never a materialized sample: it is compiled once when a plan is
//! synthesized and evaluated lazily for each row, as a pure function of the
//! row's draw. Nothing here keeps state between rows.

pub mod range;
pub mod seed;
pub mod template;
pub mod weighted;

use serde::{Deserialize, Serialize};

use self::range::{NumericRange, TemporalRange};
use self::seed::{SeedKey, Stream};
use self::weighted::CumulativeWeights;
use crate::spec::options::Number;
use crate::value::Value;

/// Which family of rule a column declaration selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    /// Stepped numeric or temporal range.
    Range,
    /// Discrete value list, optionally weighted.
    Values,
    /// Engine expression template.
    Expression,
    /// Base column value offset by `min`.
    BaseDerived,
}

impl std::fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistributionKind::Range => write!(f, "range"),
            DistributionKind::Values => write!(f, "values"),
            DistributionKind::Expression => write!(f, "expression"),
            DistributionKind::BaseDerived => write!(f, "base-derived"),
        }
    }
}

/// Inputs to one sample.
#[derive(Debug, Clone, Copy)]
pub struct Draw {
    /// Uniform draw in `[0, 1)` from the column's value stream.
    pub uniform: f64,
    /// Ordinal derived from the row id or base column values.
    pub ordinal: i64,
    /// Number of rows in the plan; spreads deterministic weighted picks.
    pub modulus: u64,
}

/// A compiled sampling rule. Expression templates are not sampled here; the
/// synthesizer binds them and the execution engine evaluates them.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueDistribution {
    Range {
        range: NumericRange,
        random: bool,
        continuous: bool,
    },
    Temporal {
        range: TemporalRange,
        random: bool,
    },
    Values {
        values: Vec<Value>,
        random: bool,
    },
    Weighted {
        values: Vec<Value>,
        weights: CumulativeWeights,
        random: bool,
    },
    BaseDerived {
        offset: Number,
    },
}

impl ValueDistribution {
    pub fn is_random(&self) -> bool {
        match self {
            ValueDistribution::Range { random, .. }
            | ValueDistribution::Temporal { random, .. }
            | ValueDistribution::Values { random, .. }
            | ValueDistribution::Weighted { random, .. } => *random,
            ValueDistribution::BaseDerived { .. } => false,
        }
    }

    /// Produce one value. Pure: equal draws always give equal values.
    pub fn sample(&self, draw: &Draw) -> Value {
        match self {
            ValueDistribution::Range {
                range,
                random,
                continuous,
            } => {
                let n = match (random, continuous) {
                    (true, true) => range.sample_continuous(draw.uniform),
                    (true, false) => range.sample_uniform(draw.uniform),
                    (false, _) => range.sample_ordinal(draw.ordinal),
                };
                number_value(n)
            }
            ValueDistribution::Temporal { range, random } => {
                let offset = if *random {
                    range.offsets.sample_uniform(draw.uniform)
                } else {
                    range.offsets.sample_ordinal(draw.ordinal)
                };
                range.value_at(offset)
            }
            ValueDistribution::Values { values, random } => {
                let len = values.len();
                let idx = if *random {
                    ((draw.uniform * len as f64).floor() as usize).min(len.saturating_sub(1))
                } else {
                    draw.ordinal.rem_euclid(len.max(1) as i64) as usize
                };
                values.get(idx).cloned().unwrap_or(Value::Null)
            }
            ValueDistribution::Weighted {
                values,
                weights,
                random,
            } => {
                let fraction = if *random {
                    draw.uniform
                } else {
                    // Stratified position of the ordinal within the row set, so
                    // a deterministic column still honours the weights exactly.
                    let m = draw.modulus.max(1);
                    (draw.ordinal.rem_euclid(m as i64) as f64 + 0.5) / m as f64
                };
                values
                    .get(weights.pick(fraction))
                    .cloned()
                    .unwrap_or(Value::Null)
            }
            ValueDistribution::BaseDerived { offset } => match *offset {
                Number::Int(o) => Value::Int(draw.ordinal.wrapping_add(o)),
                Number::Float(o) => Value::Float(draw.ordinal as f64 + o),
            },
        }
    }
}

fn number_value(n: Number) -> Value {
    match n {
        Number::Int(i) => Value::Int(i),
        Number::Float(f) => Value::Float(f),
    }
}

/// Replaces a value with null when an independent draw falls below
/// `probability`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullInjection {
    pub probability: f64,
    pub seed: SeedKey,
}

impl NullInjection {
    pub fn is_null(&self, row_id: i64) -> bool {
        self.probability > 0.0 && self.seed.uniform(row_id, Stream::Null) < self.probability
    }
}
