//! # Dependency Resolution
//!
//! Columns may read other columns' produced values through `base_column`
//! or expression placeholders. The graph records those reads, and the
//! resolver turns it into an evaluation order in which every column comes
//! after everything it reads.

pub mod dag;
pub mod topo;
pub mod visualize;
