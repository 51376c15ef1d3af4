use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "synthplan",
    about = "Compile declarative column specs into deterministic synthetic-data generation plans",
    version,
    after_help = "Examples:\n  synthplan compile orders.toml\n  synthplan compile orders.toml --output normalized.toml\n  synthplan graph orders.toml --format dot\n  synthplan preview orders.toml --rows 20"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a plan file and print its build plan
    Compile(CompileArgs),

    /// Visualize the column dependency graph
    Graph(GraphArgs),

    /// Evaluate the first rows of a plan and print them as a table
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Plan file (.toml or .json)
    pub plan: PathBuf,

    /// Override the plan seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the normalized plan file here (.toml or .json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Plan file (.toml or .json)
    pub plan: PathBuf,

    /// Output format
    #[arg(long, default_value = "mermaid")]
    pub format: GraphFormat,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Plan file (.toml or .json)
    pub plan: PathBuf,

    /// Number of rows to show
    #[arg(long, default_value = "10")]
    pub rows: u64,

    /// Override the plan seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the plan's partition count
    #[arg(long)]
    pub partitions: Option<usize>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}
