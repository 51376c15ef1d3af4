//! # Column Specifications
//!
//! A [`ColumnSpec`] is the validated, immutable form of one column
//! declaration. Construction performs every check that can be made without
//! looking at other columns, so a malformed declaration fails at the call
//! that introduced it. Cross-column checks (unknown references, cycles) are
//! made when the plan is built.

pub mod options;
pub mod types;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use self::options::{ColumnOptions, ComputeMethod, Literal, Number, RandomDistribution, SeedMethod};
use self::types::DataType;
use crate::distribution::range::{parse_datetime, NumericRange, TemporalRange};
use crate::distribution::template::Template;
use crate::distribution::weighted::CumulativeWeights;
use crate::distribution::{DistributionKind, ValueDistribution};
use crate::error::{PlanError, Result};
use crate::synth::shape::{Format, Shaping};
use crate::value::Value;

/// Separator placed between prefix/suffix and the value when none is given.
pub const DEFAULT_TEXT_SEPARATOR: &str = "_";

/// One declaration as it appears in a plan file: name, type and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawColumnDeclaration")]
pub struct ColumnDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(flatten)]
    pub options: ColumnOptions,
}

/// Flattened structs cannot deny unknown fields, so options are collected
/// into a map first and parsed strictly afterwards.
#[derive(Deserialize)]
struct RawColumnDeclaration {
    name: String,
    #[serde(rename = "type")]
    data_type: String,
    #[serde(flatten)]
    options: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawColumnDeclaration> for ColumnDeclaration {
    type Error = PlanError;

    fn try_from(raw: RawColumnDeclaration) -> Result<Self> {
        let data_type = DataType::from_raw(&raw.data_type).ok_or_else(|| {
            PlanError::invalid(&raw.name, format!("unknown column type '{}'", raw.data_type))
        })?;
        let options = ColumnOptions::from_json(&raw.name, serde_json::Value::Object(raw.options))?;
        Ok(Self {
            name: raw.name,
            data_type,
            options,
        })
    }
}

/// A validated column declaration.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    name: String,
    data_type: DataType,
    options: ColumnOptions,
    kind: DistributionKind,
    distribution: Option<Arc<ValueDistribution>>,
    template: Option<Arc<Template>>,
    base_columns: Vec<String>,
    compute: ComputeMethod,
    shaping: Option<Arc<Shaping>>,
    random_distribution: RandomDistribution,
    replicas: usize,
}

impl ColumnSpec {
    /// Validate a declaration.
    pub fn new(name: &str, data_type: DataType, options: ColumnOptions) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(PlanError::invalid(name, "column name must not be empty"));
        }

        let replicas = match options.num_columns {
            Some(0) => {
                return Err(PlanError::invalid(name, "num_columns must be at least 1"));
            }
            Some(n) => n,
            None => 1,
        };

        if let Some(p) = options.null_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(PlanError::invalid(
                    name,
                    format!("null_probability must be between 0 and 1, got {}", p),
                ));
            }
        }

        if options.random_seed_method == Some(SeedMethod::Fixed) && options.random_seed.is_none() {
            return Err(PlanError::invalid(
                name,
                "random_seed_method 'fixed' requires random_seed",
            ));
        }

        if options.unique_values == Some(0) {
            return Err(PlanError::invalid(name, "unique_values must be at least 1"));
        }
        if options.distribution.is_some() && options.weights.is_some() {
            return Err(PlanError::invalid(
                name,
                "distribution and weights cannot be combined",
            ));
        }

        let base_columns = base_columns(name, &options)?;
        let compute = compute_method(name, &options, &base_columns);

        let (kind, distribution, template) = if let Some(expr) = &options.expr {
            if options.values.is_some() || options.max.is_some() || options.min.is_some() {
                warn!(column = name, "expr is set; values and range options are ignored");
            }
            let template = Template::parse(expr).map_err(|e| PlanError::invalid(name, e))?;
            if template.placeholders().iter().any(|p| p == name) {
                return Err(self_reference(name));
            }
            (DistributionKind::Expression, None, Some(Arc::new(template)))
        } else if let Some(values) = &options.values {
            if options.max.is_some() || options.begin.is_some() {
                warn!(column = name, "values are set; range options are ignored");
            }
            let dist = values_distribution(name, data_type, values, &options)?;
            (DistributionKind::Values, Some(Arc::new(dist)), None)
        } else if options.weights.is_some() {
            return Err(PlanError::invalid(name, "weights require values"));
        } else if data_type.is_temporal() {
            let dist = temporal_distribution(name, data_type, &options)?;
            (DistributionKind::Range, Some(Arc::new(dist)), None)
        } else if options.max.is_some()
            || options.unique_values.is_some()
            || data_type == DataType::Boolean
        {
            let dist = numeric_distribution(name, data_type, &options)?;
            (DistributionKind::Range, Some(Arc::new(dist)), None)
        } else {
            if options.step.is_some() {
                warn!(column = name, "step without max is ignored");
            }
            if options.random {
                warn!(column = name, "random has no effect on a column derived from its base value");
            }
            let offset = options.min.unwrap_or(Number::Int(0));
            if data_type.is_integral() && offset.as_i64().is_none() {
                return Err(PlanError::invalid(
                    name,
                    format!("min ({}) must be a whole number for a {} column", offset.as_f64(), data_type),
                ));
            }
            let offset = match offset {
                Number::Float(f) if !data_type.is_real() && f.fract() == 0.0 => Number::Int(f as i64),
                other => other,
            };
            (
                DistributionKind::BaseDerived,
                Some(Arc::new(ValueDistribution::BaseDerived { offset })),
                None,
            )
        };

        if !data_type.is_temporal()
            && (options.begin.is_some() || options.end.is_some() || options.interval.is_some())
        {
            warn!(column = name, data_type = %data_type, "begin/end/interval only apply to date and timestamp columns");
        }

        if options.unique_values.is_some()
            && !matches!(distribution.as_deref(), Some(ValueDistribution::Range { .. }))
        {
            warn!(column = name, kind = %kind, "unique_values only applies to numeric ranges; ignored");
        }

        let random = distribution.as_deref().is_some_and(ValueDistribution::is_random);
        let random_distribution = match options.distribution {
            Some(d) if d != RandomDistribution::Uniform && !random => {
                warn!(column = name, distribution = %d, "distribution only applies to random columns; ignored");
                RandomDistribution::Uniform
            }
            Some(d) => d,
            None => RandomDistribution::Uniform,
        };

        let shaping = shaping(name, data_type, kind, &options)?;

        Ok(Self {
            name: name.to_string(),
            data_type,
            options,
            kind,
            distribution,
            template,
            base_columns,
            compute,
            shaping,
            random_distribution,
            replicas,
        })
    }

    pub fn from_declaration(declaration: ColumnDeclaration) -> Result<Self> {
        Self::new(&declaration.name, declaration.data_type, declaration.options)
    }

    /// Recover the declaration this spec was built from.
    pub fn declaration(&self) -> ColumnDeclaration {
        ColumnDeclaration {
            name: self.name.clone(),
            data_type: self.data_type,
            options: self.options.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn options(&self) -> &ColumnOptions {
        &self.options
    }

    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    /// Sampling rule; `None` for expression columns.
    pub fn distribution(&self) -> Option<&Arc<ValueDistribution>> {
        self.distribution.as_ref()
    }

    pub fn template(&self) -> Option<&Arc<Template>> {
        self.template.as_ref()
    }

    pub fn base_columns(&self) -> &[String] {
        &self.base_columns
    }

    /// Effective compute method; never `Auto`.
    pub fn compute_method(&self) -> ComputeMethod {
        self.compute
    }

    pub fn shaping(&self) -> Option<&Arc<Shaping>> {
        self.shaping.as_ref()
    }

    /// Shape of the random draw; always uniform for non-random columns.
    pub fn random_distribution(&self) -> RandomDistribution {
        self.random_distribution
    }

    /// Number of values produced per row (siblings or array elements).
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn is_array(&self) -> bool {
        self.options.is_array()
    }

    pub fn is_random(&self) -> bool {
        self.distribution.as_ref().is_some_and(|d| d.is_random())
    }

    pub fn null_probability(&self) -> f64 {
        self.options.null_probability.unwrap_or(0.0)
    }

    pub fn is_omitted(&self) -> bool {
        self.options.omit
    }

    pub fn is_implicit(&self) -> bool {
        self.options.implicit
    }

    /// Every column name this one reads: base columns first, then template
    /// placeholders, without repeats.
    pub fn references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self.base_columns.iter().map(String::as_str).collect();
        if let Some(template) = &self.template {
            for name in template.placeholders() {
                if !refs.contains(&name.as_str()) {
                    refs.push(name);
                }
            }
        }
        refs
    }
}

fn self_reference(name: &str) -> PlanError {
    PlanError::CyclicDependency {
        cycle: format!("{} -> {}", name, name),
    }
}

fn base_columns(name: &str, options: &ColumnOptions) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for base in options.base_column_names() {
        if base.trim().is_empty() {
            return Err(PlanError::invalid(name, "base_column names must not be empty"));
        }
        if base == name {
            return Err(self_reference(name));
        }
        if out.iter().any(|b| b == base) {
            return Err(PlanError::invalid(
                name,
                format!("base column '{}' is listed more than once", base),
            ));
        }
        out.push(base.to_string());
    }
    Ok(out)
}

fn compute_method(name: &str, options: &ColumnOptions, bases: &[String]) -> ComputeMethod {
    let declared = options.base_column_type.unwrap_or_default();
    if bases.is_empty() {
        if options.base_column_type.is_some() {
            warn!(column = name, "base_column_type without base_column is ignored");
        }
        return ComputeMethod::Values;
    }
    match declared {
        ComputeMethod::Auto if bases.len() == 1 => ComputeMethod::Values,
        ComputeMethod::Auto => ComputeMethod::Hash,
        ComputeMethod::Values if bases.len() > 1 => {
            warn!(
                column = name,
                bases = bases.len(),
                "base_column_type 'values' needs a single base column; hashing instead"
            );
            ComputeMethod::Hash
        }
        other => other,
    }
}

fn values_distribution(
    name: &str,
    data_type: DataType,
    values: &[Literal],
    options: &ColumnOptions,
) -> Result<ValueDistribution> {
    if values.is_empty() {
        return Err(PlanError::invalid(name, "values must not be empty"));
    }
    let values = values
        .iter()
        .map(|lit| literal_value(lit, data_type))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| PlanError::invalid(name, e))?;

    match &options.weights {
        Some(weights) => {
            if weights.len() != values.len() {
                return Err(PlanError::MismatchedLength {
                    column: name.to_string(),
                    values: values.len(),
                    weights: weights.len(),
                });
            }
            let weights = CumulativeWeights::new(weights).map_err(|e| PlanError::invalid(name, e))?;
            Ok(ValueDistribution::Weighted {
                values,
                weights,
                random: options.random,
            })
        }
        None => Ok(ValueDistribution::Values {
            values,
            random: options.random,
        }),
    }
}

/// Convert a declared literal to a value of the column's type.
fn literal_value(lit: &Literal, data_type: DataType) -> std::result::Result<Value, String> {
    let mismatch = || format!("value {:?} does not fit a {} column", lit, data_type);
    let value = match data_type {
        DataType::Byte | DataType::Short | DataType::Int | DataType::Long => {
            let i = match lit {
                Literal::Int(i) => *i,
                Literal::Float(f) if f.fract() == 0.0 && f.is_finite() => *f as i64,
                Literal::String(s) => s.trim().parse().map_err(|_| mismatch())?,
                _ => return Err(mismatch()),
            };
            if let Some((lo, hi)) = data_type.integral_bounds() {
                if i < lo || i > hi {
                    return Err(format!("value {} is outside the {} range {}..={}", i, data_type, lo, hi));
                }
            }
            Value::Int(i)
        }
        DataType::Float | DataType::Double | DataType::Decimal { .. } => {
            let f = match lit {
                Literal::Int(i) => *i as f64,
                Literal::Float(f) => *f,
                Literal::String(s) => s.trim().parse().map_err(|_| mismatch())?,
                Literal::Bool(_) => return Err(mismatch()),
            };
            crate::synth::shape::cast(Value::Float(f), data_type)
        }
        DataType::String => match lit {
            Literal::String(s) => Value::string(s.as_str()),
            Literal::Int(i) => Value::string(i.to_string()),
            Literal::Float(f) => Value::string(f.to_string()),
            Literal::Bool(b) => Value::string(b.to_string()),
        },
        DataType::Boolean => match lit {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(0) => Value::Bool(false),
            Literal::Int(1) => Value::Bool(true),
            Literal::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(mismatch()),
            },
            _ => return Err(mismatch()),
        },
        DataType::Date | DataType::Timestamp => match lit {
            Literal::String(s) => {
                let ts = parse_datetime(s)?;
                if data_type == DataType::Date {
                    Value::Date(ts.date())
                } else {
                    Value::Timestamp(ts)
                }
            }
            _ => return Err(mismatch()),
        },
    };
    Ok(value)
}

fn temporal_distribution(
    name: &str,
    data_type: DataType,
    options: &ColumnOptions,
) -> Result<ValueDistribution> {
    if options.min.is_some() || options.max.is_some() || options.step.is_some() {
        warn!(column = name, "min/max/step are ignored for date and timestamp columns; use begin/end/interval");
    }
    let range = TemporalRange::new(
        options.begin.as_deref(),
        options.end.as_deref(),
        options.interval.as_deref(),
        data_type == DataType::Date,
    )
    .map_err(|e| PlanError::invalid(name, e))?;
    Ok(ValueDistribution::Temporal {
        range,
        random: options.random,
    })
}

fn numeric_distribution(
    name: &str,
    data_type: DataType,
    options: &ColumnOptions,
) -> Result<ValueDistribution> {
    let (min, max, step) = match options.unique_values {
        Some(n) => {
            let min = options.min.unwrap_or(Number::Int(1));
            let step = options.step.unwrap_or(Number::Int(1));
            let max = unique_max(name, min, step, n)?;
            if let Some(declared) = options.max {
                if max.as_f64() > declared.as_f64() {
                    warn!(
                        column = name,
                        unique_values = n,
                        "max from unique_values ({}) is greater than the declared max ({})",
                        max.as_f64(),
                        declared.as_f64()
                    );
                }
            }
            (min, max, step)
        }
        None => (
            options.min.unwrap_or(Number::Int(0)),
            options.max.unwrap_or(Number::Int(1)),
            options.step.unwrap_or(Number::Int(1)),
        ),
    };

    let real = data_type.is_real()
        || (!data_type.is_integral()
            && [min, max, step].iter().any(|n| matches!(n, Number::Float(_))));

    let range = if real {
        NumericRange::float(min.as_f64(), max.as_f64(), step.as_f64())
    } else {
        match (min.as_i64(), max.as_i64(), step.as_i64()) {
            (Some(lo), Some(hi), Some(st)) => NumericRange::int(lo, hi, st),
            _ => Err(format!(
                "min, max and step must be whole numbers for a {} column",
                data_type
            )),
        }
    }
    .map_err(|e| PlanError::invalid(name, e))?;

    if let (NumericRange::Int { min, max, .. }, Some((lo, hi))) = (range, data_type.integral_bounds()) {
        if min < lo || max > hi {
            return Err(PlanError::invalid(
                name,
                format!("range {}..={} exceeds the {} bounds {}..={}", min, max, data_type, lo, hi),
            ));
        }
    }

    let continuous = options.continuous && real && options.random;
    if options.continuous && !continuous {
        warn!(column = name, "continuous only applies to random real-valued ranges; ignored");
    }

    Ok(ValueDistribution::Range {
        range,
        random: options.random,
        continuous,
    })
}

/// `min + (n - 1) * step`, exact for integers and rounded to nine decimals
/// otherwise.
fn unique_max(name: &str, min: Number, step: Number, n: u64) -> Result<Number> {
    let span = n - 1;
    match (min, step) {
        (Number::Int(lo), Number::Int(st)) => i64::try_from(span)
            .ok()
            .and_then(|span| st.checked_mul(span))
            .and_then(|offset| lo.checked_add(offset))
            .map(Number::Int)
            .ok_or_else(|| {
                PlanError::invalid(
                    name,
                    format!("unique_values {} with min {} and step {} overflows", n, lo, st),
                )
            }),
        _ => {
            let max = min.as_f64() + span as f64 * step.as_f64();
            Ok(Number::Float((max * 1e9).round() / 1e9))
        }
    }
}

fn shaping(
    name: &str,
    data_type: DataType,
    kind: DistributionKind,
    options: &ColumnOptions,
) -> Result<Option<Arc<Shaping>>> {
    let requested = options.prefix.is_some()
        || options.suffix.is_some()
        || options.format.is_some()
        || options.text_separator.is_some();
    if !requested {
        return Ok(None);
    }
    if !data_type.is_string() {
        return Err(PlanError::invalid(
            name,
            format!("prefix, suffix, text_separator and format only apply to string columns, not {}", data_type),
        ));
    }
    if matches!(kind, DistributionKind::Values | DistributionKind::Expression) {
        warn!(column = name, kind = %kind, "text shaping is ignored for value-list and expression columns");
        return Ok(None);
    }
    let format = options
        .format
        .as_deref()
        .map(Format::parse)
        .transpose()
        .map_err(|e| PlanError::invalid(name, e))?;
    Ok(Some(Arc::new(Shaping {
        prefix: options.prefix.clone(),
        suffix: options.suffix.clone(),
        separator: options
            .text_separator
            .clone()
            .unwrap_or_else(|| DEFAULT_TEXT_SEPARATOR.to_string()),
        format,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, dt: DataType, opts: ColumnOptions) -> Result<ColumnSpec> {
        ColumnSpec::new(name, dt, opts)
    }

    #[test]
    fn test_range_column() {
        let s = spec("code", DataType::Int, ColumnOptions::new().range(1, 100, 1)).unwrap();
        assert_eq!(s.kind(), DistributionKind::Range);
        assert_eq!(s.replicas(), 1);
        assert!(s.references().is_empty());
    }

    #[test]
    fn test_invalid_range_rejected() {
        let err = spec("c", DataType::Int, ColumnOptions::new().range(10, 1, 1)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { .. }));
        let err = spec("c", DataType::Int, ColumnOptions::new().range(1, 10, 0)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { .. }));
        let err = spec("c", DataType::Int, ColumnOptions::new().range(1.5, 10, 1)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { .. }));
    }

    #[test]
    fn test_byte_range_bounds_checked() {
        let err = spec("b", DataType::Byte, ColumnOptions::new().range(0, 300, 1)).unwrap_err();
        assert!(err.to_string().contains("byte"), "{}", err);
        assert!(spec("b", DataType::Byte, ColumnOptions::new().range(-128, 127, 1)).is_ok());
    }

    #[test]
    fn test_mismatched_weights() {
        let err = spec(
            "s",
            DataType::String,
            ColumnOptions::new().values(["a", "b", "c"]).weights([9.0, 1.0]),
        )
        .unwrap_err();
        match err {
            PlanError::MismatchedLength {
                column,
                values,
                weights,
            } => {
                assert_eq!(column, "s");
                assert_eq!(values, 3);
                assert_eq!(weights, 2);
            }
            other => panic!("expected MismatchedLength, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_weights_and_values() {
        let negative = ColumnOptions::new().values(["a", "b"]).weights([1.0, -1.0]);
        assert!(matches!(
            spec("s", DataType::String, negative).unwrap_err(),
            PlanError::InvalidParameter { .. }
        ));
        let empty = ColumnOptions::new().values(Vec::<&str>::new());
        assert!(matches!(
            spec("s", DataType::String, empty).unwrap_err(),
            PlanError::InvalidParameter { .. }
        ));
        let orphan = ColumnOptions::new().weights([1.0]);
        assert!(spec("s", DataType::String, orphan).is_err());
    }

    #[test]
    fn test_num_columns_zero_rejected() {
        let err = spec("r", DataType::Int, ColumnOptions::new().num_columns(0)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { .. }));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let err = spec("a", DataType::Int, ColumnOptions::new().base_column("a")).unwrap_err();
        assert!(matches!(err, PlanError::CyclicDependency { .. }));
        let err = spec("a", DataType::Int, ColumnOptions::new().expr("${a} + 1")).unwrap_err();
        assert!(matches!(err, PlanError::CyclicDependency { .. }));
    }

    #[test]
    fn test_references_combine_bases_and_placeholders() {
        let s = spec(
            "total",
            DataType::Double,
            ColumnOptions::new()
                .base_columns(["price", "qty"])
                .expr("${price} * ${qty} + ${tax}"),
        )
        .unwrap();
        assert_eq!(s.kind(), DistributionKind::Expression);
        assert_eq!(s.references(), vec!["price", "qty", "tax"]);
    }

    #[test]
    fn test_literals_cast_to_column_type() {
        let s = spec("n", DataType::Double, ColumnOptions::new().values([1, 2])).unwrap();
        match s.distribution().map(|d| d.as_ref()) {
            Some(ValueDistribution::Values { values, .. }) => {
                assert_eq!(values, &vec![Value::Float(1.0), Value::Float(2.0)]);
            }
            other => panic!("unexpected distribution {:?}", other),
        }
        assert!(spec("n", DataType::Int, ColumnOptions::new().values(["x"])).is_err());
        assert!(spec("n", DataType::Byte, ColumnOptions::new().values([500])).is_err());
    }

    #[test]
    fn test_min_alone_is_base_derived() {
        let s = spec("x", DataType::Long, ColumnOptions::new().min(1000)).unwrap();
        assert_eq!(s.kind(), DistributionKind::BaseDerived);
        let s = spec("x", DataType::Int, ColumnOptions::new()).unwrap();
        assert_eq!(s.kind(), DistributionKind::BaseDerived);
    }

    #[test]
    fn test_boolean_defaults_to_zero_one_range() {
        let s = spec("flag", DataType::Boolean, ColumnOptions::new().random(true)).unwrap();
        assert_eq!(s.kind(), DistributionKind::Range);
    }

    #[test]
    fn test_prefix_requires_string_column() {
        let err = spec("p", DataType::Int, ColumnOptions::new().range(1, 9, 1).prefix("x")).unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { .. }));
        let ok = spec(
            "p",
            DataType::String,
            ColumnOptions::new().range(1, 9, 1).prefix("item").format("%03d"),
        )
        .unwrap();
        assert!(ok.shaping().is_some());
    }

    #[test]
    fn test_fixed_seed_requires_value() {
        let mut opts = ColumnOptions::new().range(1, 9, 1);
        opts.random_seed_method = Some(SeedMethod::Fixed);
        assert!(spec("s", DataType::Int, opts).is_err());
    }

    #[test]
    fn test_unique_values_sets_max() {
        let s = spec("u", DataType::Int, ColumnOptions::new().unique_values(5).random(true)).unwrap();
        assert_eq!(s.kind(), DistributionKind::Range);
        match s.distribution().map(|d| d.as_ref()) {
            Some(ValueDistribution::Range { range, .. }) => {
                assert_eq!(*range, NumericRange::int(1, 5, 1).unwrap());
            }
            other => panic!("unexpected distribution {:?}", other),
        }

        let s = spec("u", DataType::Long, ColumnOptions::new().min(10).step(5).unique_values(3)).unwrap();
        match s.distribution().map(|d| d.as_ref()) {
            Some(ValueDistribution::Range { range, .. }) => {
                assert_eq!(*range, NumericRange::int(10, 20, 5).unwrap());
            }
            other => panic!("unexpected distribution {:?}", other),
        }

        let s = spec("u", DataType::Double, ColumnOptions::new().min(0.1).step(0.1).unique_values(3)).unwrap();
        match s.distribution().map(|d| d.as_ref()) {
            Some(ValueDistribution::Range { range, .. }) => {
                assert_eq!(*range, NumericRange::float(0.1, 0.3, 0.1).unwrap());
                assert_eq!(range.count(), 3);
            }
            other => panic!("unexpected distribution {:?}", other),
        }
    }

    #[test]
    fn test_unique_values_rejects_zero_and_overflow() {
        let err = spec("u", DataType::Int, ColumnOptions::new().unique_values(0)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { .. }));
        let err = spec(
            "u",
            DataType::Long,
            ColumnOptions::new().min(i64::MAX - 1).unique_values(10),
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { .. }));
    }

    #[test]
    fn test_distribution_option() {
        let s = spec(
            "n",
            DataType::Double,
            ColumnOptions::new()
                .range(0.0, 10.0, 0.5)
                .random(true)
                .distribution(RandomDistribution::Normal),
        )
        .unwrap();
        assert_eq!(s.random_distribution(), RandomDistribution::Normal);

        let cycling = spec(
            "n",
            DataType::Int,
            ColumnOptions::new().range(0, 10, 1).distribution(RandomDistribution::Normal),
        )
        .unwrap();
        assert_eq!(cycling.random_distribution(), RandomDistribution::Uniform);

        let err = spec(
            "n",
            DataType::String,
            ColumnOptions::new()
                .values(["a", "b"])
                .weights([1.0, 2.0])
                .random(true)
                .distribution(RandomDistribution::Normal),
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::InvalidParameter { .. }), "{:?}", err);
    }

    #[test]
    fn test_compute_method_resolution() {
        let one = spec("a", DataType::Int, ColumnOptions::new().base_column("x")).unwrap();
        assert_eq!(one.compute_method(), ComputeMethod::Values);
        let many = spec("a", DataType::Int, ColumnOptions::new().base_columns(["x", "y"])).unwrap();
        assert_eq!(many.compute_method(), ComputeMethod::Hash);
        let forced = spec(
            "a",
            DataType::Int,
            ColumnOptions::new()
                .base_columns(["x", "y"])
                .base_column_type(ComputeMethod::Values),
        )
        .unwrap();
        assert_eq!(forced.compute_method(), ComputeMethod::Hash);
    }

    #[test]
    fn test_declaration_parses_from_toml_strictly() {
        let decl: ColumnDeclaration = toml::from_str(
            r#"
name = "status"
type = "varchar"
values = ["open", "closed"]
weights = [3, 1]
"#,
        )
        .unwrap();
        assert_eq!(decl.data_type, DataType::String);
        assert_eq!(decl.options.weights, Some(vec![3.0, 1.0]));

        let bad = toml::from_str::<ColumnDeclaration>(
            r#"
name = "status"
type = "string"
valuez = ["open"]
"#,
        );
        let msg = bad.unwrap_err().to_string();
        assert!(msg.contains("valuez"), "{}", msg);
    }

    #[test]
    fn test_declaration_round_trip() {
        let opts = ColumnOptions::new().values(["a", "b"]).weights([9.0, 1.0]).random(true);
        let s = spec("s", DataType::String, opts.clone()).unwrap();
        let decl = s.declaration();
        assert_eq!(decl.options, opts);
        let json = serde_json::to_value(&decl).unwrap();
        let back: ColumnDeclaration = serde_json::from_value(json).unwrap();
        assert_eq!(back, decl);
    }
}
