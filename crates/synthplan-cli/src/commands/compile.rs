use anyhow::{Context, Result};

use synthplan_core::config::write_plan_file;

use crate::args::CompileArgs;
use crate::commands::load_plan_file;

pub fn run(args: &CompileArgs) -> Result<()> {
    let file = load_plan_file(&args.plan, args.seed)?;
    let plan = file
        .build()
        .with_context(|| format!("Failed to compile {}", args.plan.display()))?;

    print!("{}", plan.explain());

    if let Some(output) = &args.output {
        write_plan_file(&plan.to_plan_file(), output)?;
        eprintln!("Wrote {}", output.display());
    }

    Ok(())
}
