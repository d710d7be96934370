//! ArcGIS geometry shapes: recognition and conversion to GeoJSON geometries.
//!
//! Recognized shapes, tried in this order:
//! - envelope object `{xmin, ymin, xmax, ymax}`
//! - bbox array `[minx, miny, maxx, maxy]`
//! - point array `[x, y]`
//! - point object `{x, y}`
//! - multipoint object `{points}`
//! - polyline object `{paths}`
//! - polygon object `{rings}`
//!
//! Objects may carry an embedded `spatialReference` and any other fields,
//! which are ignored.

use geo::algorithm::contains::Contains;
use geo::algorithm::intersects::Intersects;
use geo::algorithm::winding_order::Winding;
use geo::{LineString, Point, Polygon};
use geofilter_core::models::{Geometry, GeometryType, SpatialReferenceInput};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

type Ring = Vec<[f64; 2]>;

/// Names of the recognized shape variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Envelope,
    EnvelopeArray,
    PointArray,
    Point,
    MultiPoint,
    Polyline,
    Polygon,
}

impl ShapeKind {
    /// Every variant, in recognition order
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Envelope,
        ShapeKind::EnvelopeArray,
        ShapeKind::PointArray,
        ShapeKind::Point,
        ShapeKind::MultiPoint,
        ShapeKind::Polyline,
        ShapeKind::Polygon,
    ];

    /// Whether `value` is a well-formed instance of this variant
    pub fn matches(self, value: &Value) -> bool {
        ArcgisShape::parse_as(self, value).is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Envelope => "envelope",
            ShapeKind::EnvelopeArray => "envelope array",
            ShapeKind::PointArray => "point array",
            ShapeKind::Point => "point",
            ShapeKind::MultiPoint => "multipoint",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Polygon => "polygon",
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvelopeShape {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    #[serde(rename = "spatialReference", default)]
    pub spatial_reference: Option<SpatialReferenceInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PointShape {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "spatialReference", default)]
    pub spatial_reference: Option<SpatialReferenceInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiPointShape {
    pub points: Vec<[f64; 2]>,
    #[serde(rename = "spatialReference", default)]
    pub spatial_reference: Option<SpatialReferenceInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PolylineShape {
    pub paths: Vec<Vec<[f64; 2]>>,
    #[serde(rename = "spatialReference", default)]
    pub spatial_reference: Option<SpatialReferenceInput>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PolygonShape {
    pub rings: Vec<Ring>,
    #[serde(rename = "spatialReference", default)]
    pub spatial_reference: Option<SpatialReferenceInput>,
}

/// A recognized geometry filter shape
#[derive(Debug, Clone, PartialEq)]
pub enum ArcgisShape {
    Envelope(EnvelopeShape),
    EnvelopeArray([f64; 4]),
    PointArray([f64; 2]),
    Point(PointShape),
    MultiPoint(MultiPointShape),
    Polyline(PolylineShape),
    Polygon(PolygonShape),
}

fn parse<T: DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

fn non_empty<T>(items: &[Vec<T>]) -> bool {
    !items.is_empty() && items.iter().all(|item| !item.is_empty())
}

impl ArcgisShape {
    /// First variant `value` matches, if any
    pub fn classify(value: &Value) -> Option<ArcgisShape> {
        ShapeKind::ALL.iter().find_map(|kind| Self::parse_as(*kind, value))
    }

    fn parse_as(kind: ShapeKind, value: &Value) -> Option<ArcgisShape> {
        match kind {
            ShapeKind::Envelope if value.is_object() => parse(value).map(ArcgisShape::Envelope),
            ShapeKind::EnvelopeArray => parse(value).map(ArcgisShape::EnvelopeArray),
            ShapeKind::PointArray => parse(value).map(ArcgisShape::PointArray),
            ShapeKind::Point if value.is_object() => parse(value).map(ArcgisShape::Point),
            ShapeKind::MultiPoint if value.is_object() => parse::<MultiPointShape>(value)
                .filter(|shape| !shape.points.is_empty())
                .map(ArcgisShape::MultiPoint),
            ShapeKind::Polyline if value.is_object() => parse::<PolylineShape>(value)
                .filter(|shape| non_empty(&shape.paths))
                .map(ArcgisShape::Polyline),
            ShapeKind::Polygon if value.is_object() => parse::<PolygonShape>(value)
                .filter(|shape| non_empty(&shape.rings) && shape.rings.iter().any(|ring| encloses_area(ring)))
                .map(ArcgisShape::Polygon),
            _ => None,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ArcgisShape::Envelope(_) => ShapeKind::Envelope,
            ArcgisShape::EnvelopeArray(_) => ShapeKind::EnvelopeArray,
            ArcgisShape::PointArray(_) => ShapeKind::PointArray,
            ArcgisShape::Point(_) => ShapeKind::Point,
            ArcgisShape::MultiPoint(_) => ShapeKind::MultiPoint,
            ArcgisShape::Polyline(_) => ShapeKind::Polyline,
            ArcgisShape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Spatial reference carried on the shape itself
    pub fn embedded_spatial_reference(&self) -> Option<&SpatialReferenceInput> {
        match self {
            ArcgisShape::Envelope(shape) => shape.spatial_reference.as_ref(),
            ArcgisShape::Point(shape) => shape.spatial_reference.as_ref(),
            ArcgisShape::MultiPoint(shape) => shape.spatial_reference.as_ref(),
            ArcgisShape::Polyline(shape) => shape.spatial_reference.as_ref(),
            ArcgisShape::Polygon(shape) => shape.spatial_reference.as_ref(),
            ArcgisShape::EnvelopeArray(_) | ArcgisShape::PointArray(_) => None,
        }
    }

    /// Convert to a GeoJSON geometry
    pub fn to_geometry(&self) -> Geometry {
        match self {
            ArcgisShape::PointArray([x, y]) => Geometry::point(*x, *y),
            ArcgisShape::Point(point) => Geometry::point(point.x, point.y),
            ArcgisShape::EnvelopeArray([minx, miny, maxx, maxy]) => Geometry::polygon(vec![vec![
                [*minx, *miny],
                [*maxx, *miny],
                [*maxx, *maxy],
                [*minx, *maxy],
                [*minx, *miny],
            ]]),
            ArcgisShape::Envelope(envelope) => {
                let EnvelopeShape { xmin, ymin, xmax, ymax, .. } = *envelope;
                Geometry::polygon(vec![vec![
                    [xmax, ymax],
                    [xmin, ymax],
                    [xmin, ymin],
                    [xmax, ymin],
                    [xmax, ymax],
                ]])
            }
            ArcgisShape::MultiPoint(multipoint) => {
                Geometry::new(GeometryType::MultiPoint, multipoint.points.clone())
            }
            ArcgisShape::Polyline(polyline) => match polyline.paths.as_slice() {
                [path] => Geometry::line_string(path.clone()),
                paths => Geometry::new(GeometryType::MultiLineString, paths.to_vec()),
            },
            ArcgisShape::Polygon(polygon) => rings_to_geometry(&polygon.rings),
        }
    }
}

// A ring needs three distinct corners plus the closing point
fn encloses_area(ring: &[[f64; 2]]) -> bool {
    close_ring(ring).len() >= 4
}

fn close_ring(ring: &[[f64; 2]]) -> Ring {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            closed.push(*first);
        }
    }
    closed
}

fn is_clockwise(ring: &[[f64; 2]]) -> bool {
    LineString::from(ring.to_vec()).is_cw()
}

fn edges_intersect(outer: &[[f64; 2]], inner: &[[f64; 2]]) -> bool {
    LineString::from(outer.to_vec()).intersects(&LineString::from(inner.to_vec()))
}

fn contains_first_point(outer: &[[f64; 2]], inner: &[[f64; 2]]) -> bool {
    let Some([x, y]) = inner.first() else {
        return false;
    };
    Polygon::new(LineString::from(outer.to_vec()), vec![]).contains(&Point::new(*x, *y))
}

fn reversed(ring: &[[f64; 2]]) -> Ring {
    ring.iter().rev().copied().collect()
}

// ArcGIS winds outer rings clockwise and holes counter-clockwise; GeoJSON
// wants the opposite, so every ring is reversed.
fn rings_to_geometry(rings: &[Ring]) -> Geometry {
    let mut polygons: Vec<Vec<Ring>> = Vec::new();
    let mut holes: Vec<Ring> = Vec::new();

    for ring in rings {
        if !encloses_area(ring) {
            continue;
        }
        let ring = close_ring(ring);
        if is_clockwise(&ring) {
            polygons.push(vec![reversed(&ring)]);
        } else {
            holes.push(reversed(&ring));
        }
    }

    // A hole belongs to the last outer ring that fully contains it; failing
    // that, to the last one it crosses. Anything left is an outer ring.
    let mut uncontained = Vec::new();
    while let Some(hole) = holes.pop() {
        let owner = polygons.iter_mut().rev().find(|polygon| {
            !edges_intersect(&polygon[0], &hole) && contains_first_point(&polygon[0], &hole)
        });
        match owner {
            Some(polygon) => polygon.push(hole),
            None => uncontained.push(hole),
        }
    }

    while let Some(hole) = uncontained.pop() {
        let owner = polygons.iter_mut().rev().find(|polygon| edges_intersect(&polygon[0], &hole));
        match owner {
            Some(polygon) => polygon.push(hole),
            None => polygons.push(vec![reversed(&hole)]),
        }
    }

    if polygons.len() == 1 {
        let polygon = polygons.remove(0);
        Geometry::polygon(polygon)
    } else {
        Geometry::new(GeometryType::MultiPolygon, polygons)
    }
}
