#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the tumor–immune simulation and writes plot-ready files.

mod output;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tumor_immune_system_engine::{query, SimulationEngine};

use crate::output::FileSink;

/// Runs the tumor–immune simulation and records its metrics.
#[derive(Debug, Parser)]
#[command(name = "tumor-immune", about = "Tumor growth under immune surveillance")]
struct Cli {
    /// TOML file overriding the default parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of steps to simulate.
    #[arg(long)]
    steps: Option<u64>,
    /// Seed for the random source.
    #[arg(long)]
    seed: Option<u64>,
    /// Directory receiving the metric files.
    #[arg(long, default_value = "results")]
    output: PathBuf,
    /// Steps between grid snapshots; zero disables them.
    #[arg(long)]
    snapshot_interval: Option<u64>,
    /// Prints the effective configuration as TOML and exits.
    #[arg(long)]
    print_config: bool,
}

/// Entry point for the tumor–immune command-line interface.
fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();
    let config = settings::resolve(&cli)?;
    if cli.print_config {
        print!("{}", settings::render(&config)?);
        return Ok(());
    }
    config
        .validate()
        .context("invalid simulation configuration")?;

    let mut sink = FileSink::create(&cli.output)?;
    let mut engine = SimulationEngine::new(&config);
    let last = engine.run(&mut sink);
    let files = sink.finish()?;

    let world = engine.world();
    info!(
        steps = last.get(),
        cells = query::cells(world).len(),
        immune_agents = query::immune_agents(world).len(),
        files,
        output = %cli.output.display(),
        "run complete"
    );
    Ok(())
}
