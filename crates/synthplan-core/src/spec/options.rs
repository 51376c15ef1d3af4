//! # Column Options
//!
//! The closed set of options a column declaration accepts. Every recognized
//! key is a field of [`ColumnOptions`]; plan files and JSON option objects are
//! deserialized with `deny_unknown_fields`, so a misspelled key is reported
//! against its column instead of being silently ignored.
//!
//! ```toml
//! [[columns]]
//! name = "status"
//! type = "string"
//! values = ["open", "closed"]
//! weights = [9, 1]
//! random = true
//! null_probability = 0.05
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// A numeric range bound or step. Integers stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// The value as an integer, if it has no fractional part.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(i),
            Number::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
            Number::Float(_) => None,
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Number::Int(i64::from(v))
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

/// A literal in a column's `values` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(i64::from(v))
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

/// One base column name or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BaseColumn {
    One(String),
    Many(Vec<String>),
}

impl BaseColumn {
    pub fn names(&self) -> Vec<&str> {
        match self {
            BaseColumn::One(name) => vec![name.as_str()],
            BaseColumn::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// How several produced values of one declaration are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructType {
    /// One column holding an ordered list of `num_columns` values.
    Array,
}

/// Shape of the draw behind a random column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomDistribution {
    #[default]
    Uniform,
    /// Standard normal, centred on the middle of the column's range.
    Normal,
}

impl std::fmt::Display for RandomDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RandomDistribution::Uniform => write!(f, "uniform"),
            RandomDistribution::Normal => write!(f, "normal"),
        }
    }
}

/// How the random stream of a column is keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedMethod {
    /// Use `random_seed` as the stream key, shared by every column using it.
    Fixed,
    /// Key the stream by the plan seed and the column name.
    #[default]
    HashFieldname,
}

/// How a non-random column turns its base column values into an ordinal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeMethod {
    /// `values` for a single base column, `hash` for several.
    #[default]
    Auto,
    /// Use the base value itself.
    Values,
    /// Use a stable hash of the base value(s).
    Hash,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Recognized options for one column declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Number>,
    /// Number of distinct values; sets `max` to `min + (n - 1) * step`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_values: Option<u64>,

    /// Start of a date/timestamp range (`YYYY-MM-DD[ HH:MM:SS]`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<String>,
    /// End of a date/timestamp range, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Spacing of date/timestamp values, e.g. `"1 day"` or `"15 minutes"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Literal>>,
    /// Relative weights, parallel to `values`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,

    /// Draw values at random instead of cycling deterministically.
    #[serde(skip_serializing_if = "is_false")]
    pub random: bool,
    /// Draw real-valued random ranges without snapping to `step`.
    #[serde(skip_serializing_if = "is_false")]
    pub continuous: bool,
    /// Shape of the random draw; uniform when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<RandomDistribution>,

    #[serde(alias = "num_features", skip_serializing_if = "Option::is_none")]
    pub num_columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub struct_type: Option<StructType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_column: Option<BaseColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_column_type: Option<ComputeMethod>,

    /// Expression template handed to the execution engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_probability: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_separator: Option<String>,
    /// printf-style format applied to the produced value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Compute the column but leave it out of the output.
    #[serde(skip_serializing_if = "is_false")]
    pub omit: bool,
    /// Allow a later declaration with the same name to replace this one.
    #[serde(skip_serializing_if = "is_false")]
    pub implicit: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed_method: Option<SeedMethod>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object, rejecting unknown keys.
    pub fn from_json(column: &str, value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PlanError::InvalidOptions {
            column: column.to_string(),
            message: e.to_string(),
        })
    }

    pub fn range(
        mut self,
        min: impl Into<Number>,
        max: impl Into<Number>,
        step: impl Into<Number>,
    ) -> Self {
        self.min = Some(min.into());
        self.max = Some(max.into());
        self.step = Some(step.into());
        self
    }

    pub fn min(mut self, min: impl Into<Number>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<Number>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn step(mut self, step: impl Into<Number>) -> Self {
        self.step = Some(step.into());
        self
    }

    pub fn dates(mut self, begin: &str, end: &str, interval: &str) -> Self {
        self.begin = Some(begin.to_string());
        self.end = Some(end.to_string());
        self.interval = Some(interval.to_string());
        self
    }

    pub fn values<L: Into<Literal>>(mut self, values: impl IntoIterator<Item = L>) -> Self {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn weights(mut self, weights: impl IntoIterator<Item = f64>) -> Self {
        self.weights = Some(weights.into_iter().collect());
        self
    }

    pub fn random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    pub fn continuous(mut self) -> Self {
        self.continuous = true;
        self
    }

    pub fn unique_values(mut self, n: u64) -> Self {
        self.unique_values = Some(n);
        self
    }

    pub fn distribution(mut self, distribution: RandomDistribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    pub fn num_columns(mut self, n: usize) -> Self {
        self.num_columns = Some(n);
        self
    }

    /// Produce `n` values as a single array column.
    pub fn array(mut self, n: usize) -> Self {
        self.num_columns = Some(n);
        self.struct_type = Some(StructType::Array);
        self
    }

    pub fn base_column(mut self, name: &str) -> Self {
        self.base_column = Some(BaseColumn::One(name.to_string()));
        self
    }

    pub fn base_columns<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.base_column = Some(BaseColumn::Many(names.into_iter().map(Into::into).collect()));
        self
    }

    pub fn base_column_type(mut self, method: ComputeMethod) -> Self {
        self.base_column_type = Some(method);
        self
    }

    pub fn expr(mut self, template: &str) -> Self {
        self.expr = Some(template.to_string());
        self
    }

    pub fn null_probability(mut self, p: f64) -> Self {
        self.null_probability = Some(p);
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.to_string());
        self
    }

    pub fn text_separator(mut self, sep: &str) -> Self {
        self.text_separator = Some(sep.to_string());
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn omit(mut self) -> Self {
        self.omit = true;
        self
    }

    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    pub fn random_seed(mut self, seed: u64, method: SeedMethod) -> Self {
        self.random_seed = Some(seed);
        self.random_seed_method = Some(method);
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// Names listed in `base_column`, in declaration order.
    pub fn base_column_names(&self) -> Vec<&str> {
        self.base_column
            .as_ref()
            .map(BaseColumn::names)
            .unwrap_or_default()
    }

    pub fn is_array(&self) -> bool {
        self.struct_type == Some(StructType::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_options() {
        let toml = r#"
min = 1
max = 9.5
values = ["a", 2, 3.5, true]
weights = [1.0, 2.0, 3.0, 4.0]
random = true
num_features = 3
base_column = ["x", "y"]
base_column_type = "hash"
random_seed_method = "fixed"
unique_values = 12
distribution = "normal"
"#;
        let opts: ColumnOptions = toml::from_str(toml).unwrap();
        assert_eq!(opts.min, Some(Number::Int(1)));
        assert_eq!(opts.max, Some(Number::Float(9.5)));
        assert_eq!(
            opts.values,
            Some(vec![
                Literal::String("a".into()),
                Literal::Int(2),
                Literal::Float(3.5),
                Literal::Bool(true),
            ])
        );
        assert!(opts.random);
        assert_eq!(opts.num_columns, Some(3));
        assert_eq!(opts.base_column_names(), vec!["x", "y"]);
        assert_eq!(opts.base_column_type, Some(ComputeMethod::Hash));
        assert_eq!(opts.random_seed_method, Some(SeedMethod::Fixed));
        assert_eq!(opts.unique_values, Some(12));
        assert_eq!(opts.distribution, Some(RandomDistribution::Normal));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = ColumnOptions::from_json("price", serde_json::json!({ "minn": 1 })).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("price"), "should name the column: {}", msg);
        assert!(msg.contains("minn"), "should name the key: {}", msg);
    }

    #[test]
    fn test_fluent_setters() {
        let opts = ColumnOptions::new()
            .range(0, 100, 5)
            .random(true)
            .base_column("a")
            .null_probability(0.1);
        assert_eq!(opts.min, Some(Number::Int(0)));
        assert_eq!(opts.step, Some(Number::Int(5)));
        assert_eq!(opts.base_column_names(), vec!["a"]);
        assert_eq!(opts.null_probability, Some(0.1));
        assert!(!opts.is_array());
        assert!(ColumnOptions::new().array(4).is_array());
    }

    #[test]
    fn test_defaults_are_not_serialized() {
        let opts = ColumnOptions::new().min(1);
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json, serde_json::json!({ "min": 1 }));
    }
}
