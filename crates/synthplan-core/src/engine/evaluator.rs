use crate::spec::types::DataType;
use crate::value::Value;

/// Evaluates a rendered expression template for one row.
///
/// The plan never interprets expression text itself. Placeholders are
/// replaced with literals and the resulting string is handed to an
/// implementation of this trait, which speaks the expression language of
/// whatever engine runs the plan. Results are used as returned, without
/// casting.
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, expression: &str, data_type: DataType) -> Result<Value, String>;
}

/// Returns the rendered expression text unchanged.
///
/// Useful for previews and for checking placeholder substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderedText;

impl ExpressionEvaluator for RenderedText {
    fn evaluate(&self, expression: &str, _data_type: DataType) -> Result<Value, String> {
        Ok(Value::string(expression))
    }
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, DataType) -> Result<Value, String> + Send + Sync,
{
    fn evaluate(&self, expression: &str, data_type: DataType) -> Result<Value, String> {
        self(expression, data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_text_passes_through() {
        let v = RenderedText.evaluate("1 + 2", DataType::Int).unwrap();
        assert_eq!(v, Value::string("1 + 2"));
    }

    #[test]
    fn test_closure_evaluator() {
        let eval = |expr: &str, _: DataType| -> Result<Value, String> {
            expr.trim().parse::<i64>().map(Value::Int).map_err(|e| e.to_string())
        };
        assert_eq!(eval.evaluate(" 42 ", DataType::Long).unwrap(), Value::Int(42));
        assert!(eval.evaluate("x", DataType::Long).is_err());
    }
}
