//! Resolution of the effective configuration from file and flags.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tumor_immune_core::SimulationConfig;

use crate::Cli;

/// Loads the configuration named on the command line and applies flag overrides.
pub(crate) fn resolve(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(steps) = cli.steps {
        config.run.max_steps = steps;
    }
    if let Some(seed) = cli.seed {
        config.run.rng_seed = Some(seed);
    }
    if let Some(interval) = cli.snapshot_interval {
        config.run.snapshot_interval = interval;
    }
    Ok(config)
}

/// Reads and parses a TOML configuration file.
pub(crate) fn load(path: &Path) -> Result<SimulationConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read simulation config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid simulation config at {}", path.display()))
}

fn parse(contents: &str) -> Result<SimulationConfig> {
    toml::from_str(contents).context("failed to parse simulation config toml contents")
}

/// Renders the configuration as TOML.
pub(crate) fn render(config: &SimulationConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to render simulation config as toml")
}
