use anyhow::{Context, Result};

use synthplan_core::graph::visualize::GraphFormat as VizFormat;

use crate::args::GraphArgs;
use crate::commands::load_plan_file;

pub fn run(args: &GraphArgs) -> Result<()> {
    let plan = load_plan_file(&args.plan, None)?
        .build()
        .with_context(|| format!("Failed to compile {}", args.plan.display()))?;

    let format = match args.format {
        crate::args::GraphFormat::Mermaid => VizFormat::Mermaid,
        crate::args::GraphFormat::Dot => VizFormat::Dot,
    };

    println!("{}", plan.visualize(format));

    Ok(())
}
