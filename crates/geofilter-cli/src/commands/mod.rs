//! Command implementations

mod config;
mod normalize;
mod resolve;
mod where_clause;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;
use geofilter_core::models::SpatialReferenceInput;
use serde_json::Value;

/// Execute a CLI command
pub fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    match &cli.command {
        Commands::Normalize(args) => normalize::execute(&cli, args, output),
        Commands::Resolve(args) => resolve::execute(&cli, args, output),
        Commands::Where(args) => where_clause::execute(args, output),
        Commands::Config => config::execute(&cli, output),
    }
}

/// Interpret a spatial reference argument: JSON objects and numbers are
/// structured, anything else is text (a numeric string or WKT)
fn spatial_reference_arg(raw: &str) -> SpatialReferenceInput {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Object(_) | Value::Number(_))) => SpatialReferenceInput::from_value(value),
        _ => SpatialReferenceInput::Text(raw.to_string()),
    }
}
