use indexmap::IndexMap;

use synthplan_core::spec::options::ComputeMethod;
use synthplan_core::{ColumnOptions, DataType, ExpressionEvaluator, PlanBuilder, Table, Value};

/// A plan file exercising every distribution kind.
pub const ORDERS_PLAN_TOML: &str = r#"
[plan]
name = "orders"
rows = 1000
partitions = 4
seed = 42
id_output = true

[[columns]]
name = "customer_id"
type = "long"
min = 1000
max = 1999
random = true

[[columns]]
name = "status"
type = "string"
values = ["pending", "shipped", "delivered", "returned"]
weights = [2, 3, 4, 1]
random = true

[[columns]]
name = "price"
type = "decimal(10,2)"
min = 1.0
max = 500.0
step = 0.01
random = true
null_probability = 0.05

[[columns]]
name = "quantity"
type = "int"
min = 1
max = 10
base_column = "customer_id"

[[columns]]
name = "total"
type = "double"
expr = "${price} * ${quantity}"

[[columns]]
name = "sku"
type = "string"
min = 1
max = 99999
prefix = "SKU"
format = "%05d"
text_separator = "-"
random = true

[[columns]]
name = "order_date"
type = "date"
begin = "2024-01-01"
end = "2024-12-31"
interval = "1 day"
random = true
"#;

/// Builder for an order-like plan with dependent, expanded and omitted
/// columns.
pub fn orders_builder(rows: u64, partitions: usize) -> PlanBuilder {
    PlanBuilder::new(rows, partitions, "orders")
        .with_id_output()
        .with_column(
            "customer_id",
            DataType::Long,
            ColumnOptions::new().range(1000, 1999, 1).random(true),
        )
        .and_then(|b| {
            b.with_column(
                "status",
                DataType::String,
                ColumnOptions::new()
                    .values(["pending", "shipped", "delivered", "returned"])
                    .weights([2.0, 3.0, 4.0, 1.0])
                    .random(true),
            )
        })
        .and_then(|b| {
            b.with_column(
                "price",
                DataType::Double,
                ColumnOptions::new()
                    .range(1.0, 500.0, 0.01)
                    .random(true)
                    .null_probability(0.05),
            )
        })
        .and_then(|b| {
            b.with_column(
                "region",
                DataType::Int,
                ColumnOptions::new()
                    .range(1, 8, 1)
                    .base_columns(["customer_id", "status"])
                    .base_column_type(ComputeMethod::Hash),
            )
        })
        .and_then(|b| {
            b.with_column(
                "total",
                DataType::Double,
                ColumnOptions::new().expr("${price} * ${quantity}"),
            )
        })
        .and_then(|b| {
            b.with_column(
                "quantity",
                DataType::Int,
                ColumnOptions::new().range(1, 10, 1).base_column("customer_id"),
            )
        })
        .and_then(|b| {
            b.with_column(
                "score",
                DataType::Double,
                ColumnOptions::new()
                    .range(0.0, 1.0, 0.001)
                    .random(true)
                    .num_columns(3),
            )
        })
        .and_then(|b| {
            b.with_column(
                "embedding",
                DataType::Float,
                ColumnOptions::new()
                    .range(-1.0, 1.0, 0.5)
                    .random(true)
                    .array(4),
            )
        })
        .and_then(|b| {
            b.with_column(
                "internal_key",
                DataType::Long,
                ColumnOptions::new().min(1_000_000).omit(),
            )
        })
        .unwrap_or_else(|e| panic!("orders fixture is invalid: {}", e))
}

/// Count occurrences of each rendered value in one column.
pub fn value_counts(table: &Table, column: &str) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for value in table.column_values(column).unwrap_or_default() {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Evaluates `<number> <op> <number>` for `+`, `-` and `*`; anything else
/// is an error. `NULL` operands give null.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticEvaluator;

impl ExpressionEvaluator for ArithmeticEvaluator {
    fn evaluate(&self, expression: &str, _data_type: DataType) -> Result<Value, String> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        let [lhs, op, rhs] = parts.as_slice() else {
            return Err(format!("expected '<a> <op> <b>', got '{}'", expression));
        };
        if *lhs == "NULL" || *rhs == "NULL" {
            return Ok(Value::Null);
        }
        let a: f64 = lhs.parse().map_err(|_| format!("bad operand '{}'", lhs))?;
        let b: f64 = rhs.parse().map_err(|_| format!("bad operand '{}'", rhs))?;
        let v = match *op {
            "+" => a + b,
            "-" => a - b,
            "*" => a * b,
            other => return Err(format!("unsupported operator '{}'", other)),
        };
        Ok(Value::Float(v))
    }
}
