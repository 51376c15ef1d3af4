use anyhow::{Context, Result};
use comfy_table::Table as ComfyTable;

use synthplan_core::LocalEngine;

use crate::args::PreviewArgs;
use crate::commands::load_plan_file;

const MAX_CELL_WIDTH: usize = 40;

pub fn run(args: &PreviewArgs) -> Result<()> {
    let plan = load_plan_file(&args.plan, args.seed)?
        .build()
        .with_context(|| format!("Failed to compile {}", args.plan.display()))?;

    let mut engine = LocalEngine::new();
    if let Some(partitions) = args.partitions {
        engine = engine.with_partitions(partitions);
    }
    let table = engine
        .preview(&plan, args.rows)
        .with_context(|| format!("Failed to evaluate plan '{}'", plan.name()))?;

    println!(
        "━━━ {} ({} of {} rows) ━━━",
        plan.name(),
        table.num_rows(),
        plan.rows()
    );

    let mut t = ComfyTable::new();
    t.set_header(table.columns.iter().map(String::as_str).collect::<Vec<_>>());

    for row in &table.rows {
        let values: Vec<String> = row.iter().map(|v| truncate(&v.to_string())).collect();
        t.add_row(values);
    }

    println!("{}\n", t);

    Ok(())
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_CELL_WIDTH {
        let head: String = s.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
