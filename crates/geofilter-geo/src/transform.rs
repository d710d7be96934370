//! Coordinate reprojection between WKT-described frames.

use crate::catalog::{wgs84_wkt, WGS84_EXTENT, WGS84_WKID};
use crate::projection::Proj4rsProjector;
use crate::traverse::try_map_coordinates;
use geofilter_core::error::Result;
use geofilter_core::models::{CatalogEntry, CoordinateTree, Geometry, Position, SpatialReference};
use geofilter_core::ports::Projector;
use std::sync::Arc;

/// Inward nudge applied to latitudes sitting exactly on a geographic pole
pub const POLE_EPSILON: f64 = 1e-8;

/// Check if two frames are the same
pub fn frames_match(from_wkt: &str, to_wkt: &str) -> bool {
    from_wkt == to_wkt
}

/// Applies a [`Projector`] pointwise over coordinate trees
#[derive(Clone)]
pub struct Reprojector {
    projector: Arc<dyn Projector>,
    geographic: SpatialReference,
}

impl Reprojector {
    /// `geographic` is the degrees frame whose latitude bounds trigger the pole guard
    pub fn new(projector: Arc<dyn Projector>, geographic: SpatialReference) -> Self {
        Self { projector, geographic }
    }

    /// `proj4rs` projector over the EPSG database and catalog WGS 84
    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(Proj4rsProjector::default()),
            SpatialReference::from_catalog(
                WGS84_WKID,
                CatalogEntry { wkt: wgs84_wkt().to_string(), extent: Some(WGS84_EXTENT) },
            ),
        )
    }

    pub fn geographic(&self) -> &SpatialReference {
        &self.geographic
    }

    /// Reproject every leaf of `tree`; a no-op when `to_wkt` is empty or equals `from_wkt`
    pub fn reproject(&self, tree: &CoordinateTree, from_wkt: &str, to_wkt: &str) -> Result<CoordinateTree> {
        if to_wkt.is_empty() || frames_match(from_wkt, to_wkt) {
            return Ok(tree.clone());
        }
        try_map_coordinates(tree, &|position: &Position| {
            self.project_position(position, from_wkt, to_wkt)
        })
    }

    /// Reproject a geometry, keeping its type
    pub fn reproject_geometry(&self, geometry: &Geometry, from_wkt: &str, to_wkt: &str) -> Result<Geometry> {
        let coordinates = self.reproject(&geometry.coordinates, from_wkt, to_wkt)?;
        Ok(geometry.with_coordinates(coordinates))
    }

    /// Reproject a single position. Positions missing a component pass
    /// through unchanged.
    pub fn project_position(&self, position: &Position, from_wkt: &str, to_wkt: &str) -> Result<Position> {
        if to_wkt.is_empty() || frames_match(from_wkt, to_wkt) {
            return Ok(position.clone());
        }
        let Some((x, y)) = position.xy() else {
            return Ok(position.clone());
        };
        let y = self.constrain_pole(from_wkt, y);
        let (x, y) = self.projector.project(from_wkt, to_wkt, (x, y))?;
        Ok(position.with_xy(x, y))
    }

    // Projections are undefined exactly at the poles of a geographic source.
    fn constrain_pole(&self, from_wkt: &str, y: f64) -> f64 {
        if self.geographic.wkt.as_deref() != Some(from_wkt) {
            return y;
        }
        let Some(extent) = self.geographic.extent else {
            return y;
        };
        if y == extent.ymax {
            extent.ymax - POLE_EPSILON
        } else if y == extent.ymin {
            extent.ymin + POLE_EPSILON
        } else {
            y
        }
    }
}
