pub mod coordinates;
pub mod geometry;
pub mod spatial_reference;

pub use coordinates::{CoordinateTree, Position};
pub use geometry::{Geometry, GeometryFilter, GeometryType, DEFAULT_SPATIAL_RELATION};
pub use spatial_reference::{
    CatalogEntry, Extent, SpatialReference, SpatialReferenceInput, SpatialReferenceObject,
};
