//! Geofilter Normalize - Geometry filter normalization pipeline
//!
//! This crate turns loosely shaped geometry filter requests into canonical
//! [`GeometryFilter`](geofilter_core::models::GeometryFilter)s, orchestrating
//! shape recognition, spatial reference resolution, clipping and reprojection.
//! It also builds the SQL `where` clause that accompanies a geometry filter in
//! feature queries.

pub mod models;
pub mod parse;
pub mod pipeline;
pub mod where_clause;

pub use models::{GeometryInput, NormalizeRequest};
pub use parse::parse_geometry_input;
pub use pipeline::FilterNormalizer;
pub use where_clause::{combine_object_ids_and_where, ObjectIds, WhereClauseParams};
