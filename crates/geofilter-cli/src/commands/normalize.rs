//! Normalize command implementation

use super::spatial_reference_arg;
use crate::cli::{Cli, NormalizeArgs};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use geofilter_normalize::{FilterNormalizer, NormalizeRequest};

pub fn execute(cli: &Cli, args: &NormalizeArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(cli)?;
    let normalizer = FilterNormalizer::from_config(&config).context("Failed to set up normalizer")?;

    let mut request = NormalizeRequest::new(args.geometry.as_str());
    if let Some(in_sr) = &args.in_sr {
        request = request.with_input_spatial_reference(spatial_reference_arg(in_sr));
    }
    if let Some(out_sr) = &args.out_sr {
        request = request.with_reprojection(spatial_reference_arg(out_sr));
    }
    if let Some(relation) = &args.relation {
        request = request.with_relation(relation.as_str());
    }
    if args.clip {
        request = request.with_clip(true);
    }

    tracing::debug!(geometry = %args.geometry, "Normalizing geometry filter");
    let filter = normalizer.normalize(&request)?;
    output.result(&filter)
}
