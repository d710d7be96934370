//! Resolve command implementation

use super::spatial_reference_arg;
use crate::cli::{Cli, ResolveArgs};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use geofilter_core::models::Extent;
use geofilter_normalize::FilterNormalizer;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ResolveOutput {
    wkid: Option<u32>,
    wkt: Option<String>,
    extent: Option<Extent>,
}

pub fn execute(cli: &Cli, args: &ResolveArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(cli)?;
    let normalizer = FilterNormalizer::from_config(&config).context("Failed to set up resolver")?;

    let input = spatial_reference_arg(&args.spatial_reference);
    let resolved = normalizer
        .resolver()
        .resolve(Some(&input))?
        .context("Spatial reference resolved to nothing")?;

    let result = ResolveOutput { wkid: resolved.wkid, wkt: resolved.wkt, extent: resolved.extent };

    if output.is_json() {
        return output.result(result);
    }

    output.section("Spatial Reference");
    output.kv("WKID", result.wkid.map(|wkid| wkid.to_string()).unwrap_or_else(|| "-".to_string()));
    output.kv("WKT", result.wkt.as_deref().unwrap_or("-"));
    match result.extent {
        Some(extent) => output.kv(
            "Extent",
            format!("x {} to {}, y {} to {}", extent.xmin, extent.xmax, extent.ymin, extent.ymax),
        ),
        None => output.kv("Extent", "-"),
    }
    Ok(())
}
