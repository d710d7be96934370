//! GeoJSON-style geometry and the normalized geometry filter.

use serde::{Deserialize, Serialize};

use super::coordinates::CoordinateTree;
use super::spatial_reference::SpatialReference;

/// Relation used when a request does not name one
pub const DEFAULT_SPATIAL_RELATION: &str = "esriSpatialRelIntersects";

/// Geometry type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeometryType {
    #[default]
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

/// GeoJSON-compatible geometry whose coordinates are an arbitrarily nested tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: GeometryType,
    pub coordinates: CoordinateTree,
}

impl Geometry {
    pub fn new(geometry_type: GeometryType, coordinates: impl Into<CoordinateTree>) -> Self {
        Self { geometry_type, coordinates: coordinates.into() }
    }

    /// Create a Point geometry
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(GeometryType::Point, CoordinateTree::point(x, y))
    }

    /// Create a LineString geometry
    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        Self::new(GeometryType::LineString, coords)
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Self::new(GeometryType::Polygon, rings)
    }

    /// Same geometry type with replaced coordinates
    pub fn with_coordinates(&self, coordinates: CoordinateTree) -> Self {
        Self { geometry_type: self.geometry_type, coordinates }
    }

    /// Convert to serde_json::Value (GeoJSON)
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl TryFrom<&Geometry> for geojson::Geometry {
    type Error = crate::error::GeofilterError;

    /// Fails when a leaf holds null components or the nesting does not fit the type
    fn try_from(geometry: &Geometry) -> Result<Self, Self::Error> {
        let coords = &geometry.coordinates;
        let value = match geometry.geometry_type {
            GeometryType::Point => coords.as_position().map(geojson::Value::Point),
            GeometryType::MultiPoint => coords.as_positions().map(geojson::Value::MultiPoint),
            GeometryType::LineString => coords.as_positions().map(geojson::Value::LineString),
            GeometryType::MultiLineString => coords.as_rings().map(geojson::Value::MultiLineString),
            GeometryType::Polygon => coords.as_rings().map(geojson::Value::Polygon),
            GeometryType::MultiPolygon => coords.as_polygons().map(geojson::Value::MultiPolygon),
        };

        value.map(geojson::Geometry::new).ok_or_else(|| {
            crate::error::GeofilterError::Serialization(format!(
                "{:?} coordinates are not representable as GeoJSON",
                geometry.geometry_type
            ))
        })
    }
}

/// The normalized output of a filter-normalization call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryFilter {
    pub geometry: Geometry,
    #[serde(rename = "spatialReference", default, skip_serializing_if = "Option::is_none")]
    pub spatial_reference: Option<SpatialReference>,
    pub relation: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::coordinates::Position;
    use serde_json::json;

    #[test]
    fn test_geometry_serialization() {
        let point = Geometry::point(-123.0, 48.0);
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json, json!({"type": "Point", "coordinates": [-123.0, 48.0]}));

        let parsed: Geometry = serde_json::from_value(json).unwrap();
        assert_eq!(point, parsed);
    }

    #[test]
    fn test_polygon_to_geojson() {
        let polygon = Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]);
        let geojson = geojson::Geometry::try_from(&polygon).unwrap();
        match geojson.value {
            geojson::Value::Polygon(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 4);
            }
            other => panic!("Expected Polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_null_leaf_is_not_geojson() {
        let geometry = Geometry::new(GeometryType::Point, Position(vec![None, Some(1.0)]));
        assert!(geojson::Geometry::try_from(&geometry).is_err());
    }

    #[test]
    fn test_filter_omits_absent_spatial_reference() {
        let filter = GeometryFilter {
            geometry: Geometry::point(1.0, 2.0),
            spatial_reference: None,
            relation: DEFAULT_SPATIAL_RELATION.to_string(),
        };
        let json = serde_json::to_value(&filter).unwrap();
        assert!(json.get("spatialReference").is_none());
        assert_eq!(json["relation"], "esriSpatialRelIntersects");
    }
}
