//! # Error Types
//!
//! Defines `PlanError`, the unified error enum for every failure mode of plan
//! compilation. All declaration problems surface synchronously from the
//! builder call that triggered them, or from `build()`, never while a plan is
//! being evaluated. Every variant names the column involved so a malformed
//! declaration can be fixed without digging through logs.

use thiserror::Error;

/// All errors that can occur while declaring, compiling or evaluating a plan.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid parameter for column '{column}': {message}")]
    InvalidParameter { column: String, message: String },

    #[error("Column '{column}': weights has {weights} entries but values has {values} entries. They must be the same length.")]
    MismatchedLength {
        column: String,
        values: usize,
        weights: usize,
    },

    #[error("Column '{column}' is declared more than once\n  Mark the earlier declaration `implicit = true` if it is meant to be replaced")]
    DuplicateColumn { column: String },

    #[error("Column '{column}' references '{reference}', which is not a declared column")]
    UnknownReference { column: String, reference: String },

    #[error("Circular dependency detected between columns: {cycle}")]
    CyclicDependency { cycle: String },

    #[error("Plan '{plan}' requests {rows} rows\n  Use a positive row count, or allow empty plans explicitly")]
    ZeroRows { plan: String, rows: u64 },

    #[error("Plan '{plan}' is invalid: {message}")]
    InvalidPlan { plan: String, message: String },

    #[error("Invalid options for column '{column}': {message}")]
    InvalidOptions { column: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output error: {message}: {source}")]
    Output {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Evaluation of column '{column}' failed: {message}")]
    Evaluation { column: String, message: String },
}

impl PlanError {
    pub(crate) fn invalid(column: &str, message: impl Into<String>) -> Self {
        PlanError::InvalidParameter {
            column: column.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
