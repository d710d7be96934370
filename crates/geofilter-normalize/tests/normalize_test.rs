//! End-to-end normalization with the built-in catalog and projector

use geofilter_core::error::{GeofilterError, PreconditionFailure};
use geofilter_core::models::{CoordinateTree, Geometry, GeometryFilter, GeometryType};
use geofilter_geo::catalog::{epsg_wkt, web_mercator_wkt, wgs84_wkt};
use geofilter_normalize::{FilterNormalizer, NormalizeRequest};
use proptest::prelude::*;
use serde_json::json;

fn normalize(request: NormalizeRequest) -> GeometryFilter {
    FilterNormalizer::with_defaults().normalize(&request).unwrap()
}

/// Compare trees leaf by leaf with a relative tolerance
fn assert_close(actual: &CoordinateTree, expected: &CoordinateTree) {
    match (actual, expected) {
        (CoordinateTree::Leaf(a), CoordinateTree::Leaf(e)) => {
            assert_eq!(a.len(), e.len());
            for (a, e) in a.0.iter().zip(e.0.iter()) {
                let (a, e) = (a.unwrap(), e.unwrap());
                let tolerance = 1e-5 * e.abs().max(1.0);
                assert!((a - e).abs() <= tolerance, "{} != {}", a, e);
            }
        }
        (CoordinateTree::Branch(a), CoordinateTree::Branch(e)) => {
            assert_eq!(a.len(), e.len());
            for (a, e) in a.iter().zip(e.iter()) {
                assert_close(a, e);
            }
        }
        _ => panic!("tree shapes differ: {:?} vs {:?}", actual, expected),
    }
}

fn envelope_ring(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Geometry {
    Geometry::polygon(vec![vec![[xmax, ymax], [xmin, ymax], [xmin, ymin], [xmax, ymin], [xmax, ymax]]])
}

#[test]
fn test_delimited_point() {
    let filter = normalize(NormalizeRequest::new("-123, 48"));
    assert_eq!(filter.geometry, Geometry::point(-123.0, 48.0));
    assert_eq!(filter.relation, "esriSpatialRelIntersects");
    assert!(filter.spatial_reference.is_none());
}

#[test]
fn test_delimited_point_with_options() {
    let filter = normalize(
        NormalizeRequest::new("-123, 48")
            .with_input_spatial_reference(4326u32)
            .with_reprojection(3857u32)
            .with_relation("esriSpatialRelIntersects"),
    );

    assert_eq!(filter.geometry.geometry_type, GeometryType::Point);
    assert_close(&filter.geometry.coordinates, &CoordinateTree::point(-13692297.36757265, 6106854.834885075));

    let spatial_reference = filter.spatial_reference.unwrap();
    assert_eq!(spatial_reference.wkid, Some(3857));
    assert_eq!(spatial_reference.wkt.as_deref(), Some(web_mercator_wkt()));
}

#[test]
fn test_delimited_bbox() {
    let filter = normalize(NormalizeRequest::new("-123, 48, -122, 49"));
    assert_eq!(
        filter.geometry,
        Geometry::polygon(vec![vec![
            [-123.0, 48.0],
            [-122.0, 48.0],
            [-122.0, 49.0],
            [-123.0, 49.0],
            [-123.0, 48.0],
        ]])
    );
}

#[test]
fn test_point_object() {
    let filter = normalize(NormalizeRequest::new(json!({"x": -123, "y": 48})));
    assert_eq!(filter.geometry, Geometry::point(-123.0, 48.0));
}

#[test]
fn test_envelope_with_spatial_reference_and_reproject() {
    let filter = normalize(
        NormalizeRequest::new(json!({
            "xmin": -123, "xmax": -122, "ymin": 48, "ymax": 49,
            "spatialReference": {"wkid": 4326, "latestWkid": 9999}
        }))
        .with_reprojection(3857u32),
    );

    let expected: CoordinateTree = vec![vec![
        [-13580977.876779376, 6274861.394006576],
        [-13692297.36757265, 6274861.394006576],
        [-13692297.36757265, 6106854.834885075],
        [-13580977.876779376, 6106854.834885075],
        [-13580977.876779376, 6274861.394006576],
    ]]
    .into();
    assert_close(&filter.geometry.coordinates, &expected);
    assert_eq!(filter.spatial_reference.unwrap().wkid, Some(3857));
}

#[test]
fn test_envelope_with_unknown_spatial_reference() {
    let filter = normalize(NormalizeRequest::new(json!({
        "xmin": -123, "xmax": -122, "ymin": 48, "ymax": 49,
        "spatialReference": {"wkid": 99999}
    })));
    assert_eq!(filter.geometry, envelope_ring(-123.0, 48.0, -122.0, 49.0));
    assert!(filter.spatial_reference.is_none());
}

#[test]
fn test_envelope_with_spatial_reference_and_clip() {
    let filter = normalize(
        NormalizeRequest::new(json!({
            "xmin": -123, "xmax": -122, "ymin": -95, "ymax": 95,
            "spatialReference": {"wkid": 4326}
        }))
        .with_clip(true),
    );

    assert_eq!(filter.geometry, envelope_ring(-123.0, -90.0, -122.0, 90.0));
    let spatial_reference = filter.spatial_reference.unwrap();
    assert_eq!(spatial_reference.wkid, Some(4326));
    assert_eq!(spatial_reference.wkt.as_deref(), Some(wgs84_wkt()));
}

#[test]
fn test_envelope_without_spatial_reference_and_clip() {
    let filter = normalize(
        NormalizeRequest::new(json!({"xmin": -123, "xmax": -122, "ymin": 48, "ymax": 49})).with_clip(true),
    );
    assert_eq!(filter.geometry, envelope_ring(-123.0, 48.0, -122.0, 49.0));
    assert!(filter.spatial_reference.is_none());
}

#[test]
fn test_reprojection_through_the_pole() {
    let filter = normalize(
        NormalizeRequest::new(json!({
            "xmin": -123, "xmax": -122, "ymin": 45, "ymax": 90,
            "spatialReference": {"wkid": 4326}
        }))
        .with_reprojection(3857u32),
    );

    let expected: CoordinateTree = vec![vec![
        [-13580977.876779376, 147730758.19456753],
        [-13692297.36757265, 147730758.19456753],
        [-13692297.36757265, 5621521.486192066],
        [-13580977.876779376, 5621521.486192066],
        [-13580977.876779376, 147730758.19456753],
    ]]
    .into();
    assert_close(&filter.geometry.coordinates, &expected);
}

#[test]
fn test_envelope_with_wkt_and_clip() {
    let filter = normalize(
        NormalizeRequest::new(json!({
            "xmin": -123, "xmax": -122, "ymin": 43, "ymax": 44,
            "spatialReference": {"wkt": wgs84_wkt()}
        }))
        .with_clip(true),
    );

    assert_eq!(filter.geometry, envelope_ring(-123.0, 43.0, -122.0, 44.0));
    let spatial_reference = filter.spatial_reference.unwrap();
    assert_eq!(spatial_reference.wkid, None);
    assert_eq!(spatial_reference.wkt.as_deref(), Some(wgs84_wkt()));
}

#[test]
fn test_envelope_with_unknown_spatial_reference_and_clip() {
    let filter = normalize(
        NormalizeRequest::new(json!({
            "xmin": -123, "xmax": -122, "ymin": 48, "ymax": 49,
            "spatialReference": {"wkid": 99999}
        }))
        .with_clip(true),
    );
    assert_eq!(filter.geometry, envelope_ring(-123.0, 48.0, -122.0, 49.0));
    assert!(filter.spatial_reference.is_none());
}

#[test]
fn test_projected_clip_frame_is_tested_in_degrees() {
    let filter = normalize(
        NormalizeRequest::new("1000000, 1000000")
            .with_input_spatial_reference(3857u32)
            .with_clip_spatial_reference(3857u32)
            .with_clip(true),
    );
    assert_eq!(filter.geometry, Geometry::point(1000000.0, 1000000.0));
    assert_eq!(filter.spatial_reference.unwrap().wkid, Some(3857));
}

#[test]
fn test_clip_web_mercator_to_its_valid_latitudes() {
    // Roughly 89 degrees north, beyond the 85.06 web mercator limit
    let filter = normalize(
        NormalizeRequest::new(json!({"x": 0, "y": 30000000, "spatialReference": {"wkid": 3857}}))
            .with_clip_spatial_reference(3857u32)
            .with_clip(true),
    );
    let CoordinateTree::Leaf(position) = &filter.geometry.coordinates else {
        panic!("expected a point");
    };
    let (x, y) = position.xy().unwrap();
    assert!(x.abs() < 1e-6, "x = {}", x);
    assert!(y > 20000000.0 && y < 20100000.0, "y = {}", y);
}

#[test]
fn test_reproject_into_state_plane() {
    let filter = normalize(
        NormalizeRequest::new("-123, 45")
            .with_input_spatial_reference(4326u32)
            .with_reprojection(2991u32),
    );

    let spatial_reference = filter.spatial_reference.unwrap();
    assert_eq!(spatial_reference.wkid, Some(2991));
    assert_eq!(spatial_reference.wkt.as_deref(), epsg_wkt(2991));

    let CoordinateTree::Leaf(position) = &filter.geometry.coordinates else {
        panic!("expected a point");
    };
    let (x, y) = position.xy().unwrap();
    assert!(x > 0.0 && x < 400000.0, "x = {}", x);
    assert!(y > 300000.0 && y < 500000.0, "y = {}", y);
}

#[test]
fn test_epsg_database_references_resolve() {
    let normalizer = FilterNormalizer::with_defaults();
    for wkid in [32633u32, 2154] {
        let reference = normalizer.resolver().resolve_wkid(wkid).unwrap();
        assert_eq!(reference.wkt.as_deref(), epsg_wkt(wkid));
    }

    let filter = normalize(
        NormalizeRequest::new("2.35, 48.85")
            .with_input_spatial_reference(4326u32)
            .with_reprojection(2154u32),
    );
    let CoordinateTree::Leaf(position) = &filter.geometry.coordinates else {
        panic!("expected a point");
    };
    // Lambert-93 puts Paris near 652 km east, 6862 km north
    let (x, y) = position.xy().unwrap();
    assert!((x - 652000.0).abs() < 5000.0, "x = {}", x);
    assert!((y - 6862000.0).abs() < 5000.0, "y = {}", y);
}

#[test]
fn test_stringified_json_geometry() {
    let text = json!({
        "xmin": -123, "xmax": -122, "ymin": 48, "ymax": 49,
        "spatialReference": {"wkid": 4326, "latestWkid": 9999}
    })
    .to_string();

    let filter = normalize(NormalizeRequest::new(text));
    assert_eq!(filter.geometry, envelope_ring(-123.0, 48.0, -122.0, 49.0));
    assert_eq!(filter.spatial_reference.unwrap().wkid, Some(4326));
}

#[test]
fn test_polyline() {
    let filter = normalize(NormalizeRequest::new(json!({
        "paths": [[[1, 4], [-2, 4], [2, 3], [3, 10], [0, 10]]]
    })));
    assert_eq!(
        filter.geometry,
        Geometry::line_string(vec![[1.0, 4.0], [-2.0, 4.0], [2.0, 3.0], [3.0, 10.0], [0.0, 10.0]])
    );
}

#[test]
fn test_multi_polyline() {
    let filter = normalize(NormalizeRequest::new(json!({
        "paths": [[[1, 4], [-2, 4], [2, 3]], [[3, 10], [0, 10]]]
    })));
    assert_eq!(filter.geometry.geometry_type, GeometryType::MultiLineString);
    let expected: CoordinateTree =
        vec![vec![[1.0, 4.0], [-2.0, 4.0], [2.0, 3.0]], vec![[3.0, 10.0], [0.0, 10.0]]].into();
    assert_eq!(filter.geometry.coordinates, expected);
}

#[test]
fn test_polygon() {
    let filter = normalize(NormalizeRequest::new(json!({
        "rings": [[[-134, 610], [-134, 594], [-135, 594], [-135, 610], [-134, 610]]]
    })));
    assert_eq!(
        filter.geometry,
        Geometry::polygon(vec![vec![
            [-134.0, 610.0],
            [-135.0, 610.0],
            [-135.0, 594.0],
            [-134.0, 594.0],
            [-134.0, 610.0],
        ]])
    );
}

#[test]
fn test_unsupported_geometry() {
    let err = FilterNormalizer::with_defaults()
        .normalize(&NormalizeRequest::new(json!({"hello": "world"})))
        .unwrap_err();
    assert_eq!(err.to_string(), r#"Unsupported geometry filter format: {"hello":"world"}"#);
}

#[test]
fn test_polygon_without_usable_rings_is_unsupported() {
    let err = FilterNormalizer::with_defaults()
        .normalize(&NormalizeRequest::new(json!({"rings": [[[1, 2]]]})))
        .unwrap_err();
    assert!(matches!(err, GeofilterError::UnsupportedGeometryFilterFormat { .. }));
}

#[test]
fn test_three_numbers_echo_as_typed() {
    let err = FilterNormalizer::with_defaults()
        .normalize(&NormalizeRequest::new("-123, 48, -122"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported geometry filter format: [-123,48,-122]");
}

#[test]
fn test_unsupported_spatial_reference_format() {
    let err = FilterNormalizer::with_defaults()
        .normalize(&NormalizeRequest::new("-123, 48").with_input_spatial_reference(json_input(json!([1, 2]))))
        .unwrap_err();
    assert!(matches!(err, GeofilterError::UnsupportedSpatialReferenceFormat { .. }));
}

#[test]
fn test_unparseable_wkt() {
    let err = FilterNormalizer::with_defaults()
        .normalize(&NormalizeRequest::new("-123, 48").with_input_spatial_reference("test"))
        .unwrap_err();
    assert_eq!(err.to_string(), r#"Spatial reference WKT is unparseable: "test""#);
}

#[test]
fn test_unknown_reprojection_target() {
    let err = FilterNormalizer::with_defaults()
        .normalize(
            &NormalizeRequest::new("-123, 48")
                .with_input_spatial_reference(4326u32)
                .with_reprojection(99999u32),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        GeofilterError::ReprojectionPreconditionFailed { reason: PreconditionFailure::UnresolvedTarget(_) }
    ));
}

#[test]
fn test_request_from_wire_json() {
    let request: NormalizeRequest = serde_json::from_value(json!({
        "geometry": "-123, 48",
        "inSR": 4326,
        "reprojectionSR": 3857,
        "spatialRel": "esriSpatialRelContains"
    }))
    .unwrap();

    let filter = normalize(request);
    assert_eq!(filter.relation, "esriSpatialRelContains");
    assert_eq!(filter.spatial_reference.unwrap().wkid, Some(3857));
}

#[test]
fn test_output_serializes_like_geojson() {
    let filter = normalize(NormalizeRequest::new("-123, 48").with_input_spatial_reference(4326u32));
    let value = serde_json::to_value(&filter).unwrap();
    assert_eq!(value["geometry"], json!({"type": "Point", "coordinates": [-123.0, 48.0]}));
    assert_eq!(value["spatialReference"]["wkid"], json!(4326));
    assert_eq!(value["relation"], json!("esriSpatialRelIntersects"));
}

fn json_input(value: serde_json::Value) -> geofilter_core::models::SpatialReferenceInput {
    geofilter_core::models::SpatialReferenceInput::from_value(value)
}

proptest! {
    #[test]
    fn prop_delimited_points_survive_without_references(x in -1.0e6..1.0e6f64, y in -1.0e6..1.0e6f64) {
        let filter = normalize(NormalizeRequest::new(format!("{}, {}", x, y)));
        prop_assert_eq!(filter.geometry, Geometry::point(x, y));
    }

    #[test]
    fn prop_clipped_geographic_points_are_in_bounds(x in -500.0..500.0f64, y in -500.0..500.0f64) {
        let filter = normalize(
            NormalizeRequest::new(format!("{}, {}", x, y))
                .with_input_spatial_reference(4326u32)
                .with_clip(true),
        );
        let CoordinateTree::Leaf(position) = &filter.geometry.coordinates else {
            panic!("expected a point");
        };
        let (cx, cy) = position.xy().unwrap();
        prop_assert!((-180.0..=180.0).contains(&cx));
        prop_assert!((-90.0..=90.0).contains(&cy));
    }
}
