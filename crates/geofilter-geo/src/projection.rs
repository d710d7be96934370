//! Pure-Rust projection backend on `proj4rs`.
//!
//! Frames are named by WKT. A WKT is turned into a PROJ.4 definition through
//! definitions registered alongside catalog entries, then through the EPSG
//! database bundled by `crs-definitions`.

use geofilter_core::error::{GeofilterError, Result};
use geofilter_core::ports::Projector;
use once_cell::sync::Lazy;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

static EPSG_DEFINITIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    (0..=u16::MAX)
        .filter_map(crs_definitions::from_code)
        .map(|def| (def.wkt, def.proj4))
        .collect()
});

thread_local! {
    // Parsed frames, keyed by PROJ.4 definition
    static FRAMES: RefCell<HashMap<String, Rc<Proj>>> = RefCell::new(HashMap::new());
}

/// WKT to PROJ.4 definitions for frames outside the EPSG database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameDefinitions {
    by_wkt: HashMap<String, String>,
}

impl FrameDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, wkt: impl Into<String>, proj4: impl Into<String>) {
        self.by_wkt.insert(wkt.into(), proj4.into());
    }

    pub fn with_definition(mut self, wkt: impl Into<String>, proj4: impl Into<String>) -> Self {
        self.insert(wkt, proj4);
        self
    }

    /// PROJ.4 definition of a frame; registered definitions win over the
    /// EPSG database
    pub fn lookup<'a>(&'a self, wkt: &str) -> Option<&'a str> {
        self.by_wkt
            .get(wkt)
            .map(String::as_str)
            .or_else(|| EPSG_DEFINITIONS.get(wkt).copied())
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.by_wkt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_wkt.is_empty()
    }
}

fn parse_frame(proj4: &str) -> Result<Rc<Proj>> {
    FRAMES.with(|frames| {
        if let Some(frame) = frames.borrow().get(proj4) {
            return Ok(Rc::clone(frame));
        }

        let frame = Proj::from_proj_string(proj4).map_err(|e| GeofilterError::Projection {
            reason: format!("invalid projection definition {}: {:?}", proj4, e),
        })?;
        let frame = Rc::new(frame);
        frames.borrow_mut().insert(proj4.to_string(), Rc::clone(&frame));
        Ok(frame)
    })
}

// proj4rs expects radians on geographic frames
fn is_geographic(proj4: &str) -> bool {
    proj4.contains("+proj=longlat") || proj4.contains("+proj=latlong")
}

/// Default [`Projector`], backed by `proj4rs`
#[derive(Debug, Clone, Default)]
pub struct Proj4rsProjector {
    definitions: FrameDefinitions,
}

impl Proj4rsProjector {
    pub fn new(definitions: FrameDefinitions) -> Self {
        Self { definitions }
    }

    fn definition<'a>(&'a self, wkt: &str) -> Result<&'a str> {
        self.definitions.lookup(wkt).ok_or_else(|| GeofilterError::Projection {
            reason: format!("no projection definition for {}", wkt),
        })
    }
}

impl Projector for Proj4rsProjector {
    fn project(&self, from_wkt: &str, to_wkt: &str, (x, y): (f64, f64)) -> Result<(f64, f64)> {
        let from = self.definition(from_wkt)?;
        let to = self.definition(to_wkt)?;
        let source = parse_frame(from)?;
        let target = parse_frame(to)?;

        let mut point = if is_geographic(from) {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&source, &target, &mut point).map_err(|e| GeofilterError::Projection {
            reason: format!("cannot project ({}, {}): {:?}", x, y, e),
        })?;

        let projected = if is_geographic(to) {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };
        if !projected.0.is_finite() || !projected.1.is_finite() {
            return Err(GeofilterError::Projection {
                reason: format!("({}, {}) has no finite image", x, y),
            });
        }
        Ok(projected)
    }

    fn check_frame(&self, wkt: &str) -> Result<()> {
        parse_frame(self.definition(wkt)?).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{epsg_wkt, web_mercator_wkt, wgs84_wkt};

    fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
        (actual - expected).abs() <= tolerance
    }

    #[test]
    fn test_web_mercator_forward() {
        let (x, y) = Proj4rsProjector::default().project(wgs84_wkt(), web_mercator_wkt(), (-123.0, 48.0)).unwrap();
        assert!(close(x, -13692297.36757265, 1e-2), "x = {}", x);
        assert!(close(y, 6106854.834885075, 1e-2), "y = {}", y);
    }

    #[test]
    fn test_web_mercator_inverse() {
        let (lon, lat) = Proj4rsProjector::default()
            .project(web_mercator_wkt(), wgs84_wkt(), (-13692297.36757265, 6106854.834885075))
            .unwrap();
        assert!(close(lon, -123.0, 1e-6));
        assert!(close(lat, 48.0, 1e-6));
    }

    #[test]
    fn test_oregon_lambert_round_trip() {
        let projector = Proj4rsProjector::default();
        let oregon = epsg_wkt(2991).unwrap();

        let (x, y) = projector.project(wgs84_wkt(), oregon, (-123.0, 45.0)).unwrap();
        // Central meridian -120.5 with a 400 km false easting
        assert!(x > 0.0 && x < 400000.0, "x = {}", x);
        assert!(y > 300000.0 && y < 500000.0, "y = {}", y);

        let (lon, lat) = projector.project(oregon, wgs84_wkt(), (x, y)).unwrap();
        assert!(close(lon, -123.0, 1e-5));
        assert!(close(lat, 45.0, 1e-5));
    }

    #[test]
    fn test_utm_zone() {
        let (x, y) = Proj4rsProjector::default()
            .project(wgs84_wkt(), epsg_wkt(32633).unwrap(), (15.0, 52.0))
            .unwrap();
        assert!(x > 400000.0 && x < 600000.0, "easting {}", x);
        assert!(y > 5000000.0 && y < 6000000.0, "northing {}", y);
    }

    #[test]
    fn test_unknown_frame_is_projection_error() {
        let err = Proj4rsProjector::default()
            .project(wgs84_wkt(), r#"PROJCS["Unknown"]"#, (1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, GeofilterError::Projection { .. }));
    }

    #[test]
    fn test_registered_definition() {
        let custom = r#"PROJCS["Custom_Mercator"]"#;
        let projector = Proj4rsProjector::new(
            FrameDefinitions::new().with_definition(custom, "+proj=merc +a=6378137 +b=6378137 +units=m +no_defs"),
        );
        let (x, _) = projector.project(wgs84_wkt(), custom, (-123.0, 48.0)).unwrap();
        assert!(close(x, -13692297.36757265, 1e-2), "x = {}", x);
        assert!(projector.check_frame(custom).is_ok());
    }

    #[test]
    fn test_check_frame() {
        let projector = Proj4rsProjector::default();
        assert!(projector.check_frame(wgs84_wkt()).is_ok());
        assert!(projector.check_frame(r#"GEOGCS["WGS 84"]"#).is_err());

        let broken = Proj4rsProjector::new(FrameDefinitions::new().with_definition("X", "+proj=no_such_projection"));
        assert!(broken.check_frame("X").is_err());
    }
}
