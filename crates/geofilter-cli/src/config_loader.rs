//! Configuration loading utilities for CLI commands

use crate::cli::Cli;
use anyhow::{bail, Context, Result};
use geofilter_core::config::{CliConfigOverrides, LayeredConfig};

/// Load layered configuration: defaults, file, environment, then CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = &cli.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides(cli)?);
    Ok(config)
}

fn overrides(cli: &Cli) -> Result<CliConfigOverrides> {
    if cli.cache_capacity == Some(0) {
        bail!("--cache-capacity must be at least 1");
    }

    Ok(CliConfigOverrides {
        cache_capacity: cli.cache_capacity,
        catalog_path: cli.catalog.clone(),
        projector: cli.projector,
        ..Default::default()
    })
}
