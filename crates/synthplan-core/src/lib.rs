pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod graph;
pub mod plan;
pub mod spec;
pub mod synth;
pub mod value;

// Re-export key types for convenience
pub use engine::evaluator::{ExpressionEvaluator, RenderedText};
pub use engine::local::LocalEngine;
pub use engine::{ExecutionEngine, RowIdBase, Table};
pub use error::{PlanError, Result};
pub use plan::{GenerationPlan, PlanBuilder};
pub use spec::options::{ColumnOptions, RandomDistribution};
pub use spec::types::DataType;
pub use value::Value;
