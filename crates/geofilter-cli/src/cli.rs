use clap::{Parser, Subcommand};
use geofilter_core::config::{parse_projector_kind, ProjectorKind};
use std::path::PathBuf;

/// Geofilter - Normalize geometry filters into canonical GeoJSON
#[derive(Parser, Debug)]
#[command(name = "geofilter")]
#[command(about = "Normalize geometry filters into canonical GeoJSON", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of spatial references kept in the lookup cache
    #[arg(long, global = true)]
    pub cache_capacity: Option<usize>,

    /// Additional spatial reference catalog (TOML)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Projection backend (builtin or proj)
    #[arg(long, global = true, value_parser = parse_projector)]
    pub projector: Option<ProjectorKind>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize a geometry filter
    Normalize(NormalizeArgs),

    /// Resolve a spatial reference to its WKT and extent
    Resolve(ResolveArgs),

    /// Build the SQL where clause for an object-id list and a filter
    Where(WhereArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// Geometry: delimited numbers, or an ArcGIS geometry as JSON
    #[arg(long, allow_hyphen_values = true)]
    pub geometry: String,

    /// Spatial reference of the input (WKID, WKT or JSON object)
    #[arg(long = "in-sr")]
    pub in_sr: Option<String>,

    /// Spatial reference to reproject into
    #[arg(long = "out-sr")]
    pub out_sr: Option<String>,

    /// Spatial relation to report
    #[arg(long)]
    pub relation: Option<String>,

    /// Clamp coordinates to the valid bounds of the input reference
    #[arg(long)]
    pub clip: bool,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// WKID, WKT or JSON object
    pub spatial_reference: String,
}

#[derive(Parser, Debug)]
pub struct WhereArgs {
    /// Comma-separated object ids
    #[arg(long = "object-ids", allow_hyphen_values = true)]
    pub object_ids: Option<String>,

    /// Free-form SQL filter
    #[arg(long = "where", allow_hyphen_values = true)]
    pub where_clause: Option<String>,

    /// Field the object ids are matched against
    #[arg(long = "id-field")]
    pub id_field: Option<String>,
}

fn parse_projector(s: &str) -> Result<ProjectorKind, String> {
    parse_projector_kind(s).map_err(|e| e.to_string())
}
