pub mod compile;
pub mod graph;
pub mod preview;

use std::path::Path;

use anyhow::{Context, Result};
use synthplan_core::config::{read_plan_file, PlanFile};
use tracing::debug;

/// Load a plan file, applying a seed override when given.
pub fn load_plan_file(path: &Path, seed: Option<u64>) -> Result<PlanFile> {
    let mut file = read_plan_file(path)
        .with_context(|| format!("Failed to load plan file {}", path.display()))?;
    if let Some(seed) = seed {
        debug!(seed, "overriding plan seed");
        file.plan.seed = seed;
    }
    debug!(
        path = %path.display(),
        columns = file.columns.len(),
        "loaded plan file"
    );
    Ok(file)
}
