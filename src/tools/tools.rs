mod dump_callgraph;
use dump_callgraph::dump_callgraph;
mod dump_funcs;
use dump_funcs::dump_funcs;
mod dump_types;
use dump_types::dump_types;
mod dump_disasm;
use dump_disasm::dump_disasm;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Decode Go runtime metadata from a Mach-O binary.
#[derive(Clone, Debug, Parser)]
struct Args {
    /// input Mach-O binary to parse
    input: PathBuf,
    #[command(subcommand)]
    operation: Operation,
}

#[derive(Clone, Debug, Subcommand)]
enum Operation {
    /// Dump all runtime types found in `__typelink`
    DumpTypes,
    /// Dump all functions found in the PC/line-number table
    DumpFuncs,
    /// Disassemble every function and list its direct callees
    DumpDisasm,
    /// Dump the static call graph rooted at `main.main`
    DumpCallgraph,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let data = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let image = gomacho::Image::open(&data)?;

    match args.operation {
        Operation::DumpTypes => dump_types(&image),
        Operation::DumpFuncs => dump_funcs(&image),
        Operation::DumpDisasm => dump_disasm(&image),
        Operation::DumpCallgraph => dump_callgraph(&image),
    }
}
