//! Geofilter Geo - Coordinate traversal, spatial references, reprojection and clipping
//!
//! This crate holds every geospatial operation behind filter normalization:
//! walking coordinate trees, resolving and caching spatial references,
//! projecting coordinates, clamping them to valid bounds, and turning ArcGIS
//! shapes into GeoJSON geometries.

pub mod arcgis;
pub mod cache;
pub mod catalog;
pub mod clip;
#[cfg(feature = "proj")]
pub mod proj_backend;
pub mod projection;
pub mod resolver;
pub mod transform;
pub mod traverse;
pub mod wkt;

pub use cache::WkidCache;
pub use catalog::StaticCatalog;
pub use clip::BoundsClipper;
pub use projection::{FrameDefinitions, Proj4rsProjector};
pub use resolver::SpatialReferenceResolver;
pub use transform::Reprojector;
pub use wkt::{ProjectionWktValidator, WktSyntaxChecker};
