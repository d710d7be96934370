//! libproj-backed [`Projector`], available with the `proj` feature.

use geofilter_core::error::{GeofilterError, Result};
use geofilter_core::ports::Projector;
use parking_lot::Mutex;
use proj::Proj;
use std::collections::HashMap;

/// Projects between arbitrary WKT frames through PROJ.
///
/// Building a transformation is expensive, so one is kept per
/// (source, target) pair for the lifetime of the projector.
#[derive(Default)]
pub struct ProjProjector {
    transformations: Mutex<HashMap<(String, String), Proj>>,
}

impl ProjProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached transformations
    pub fn cached(&self) -> usize {
        self.transformations.lock().len()
    }
}

impl Projector for ProjProjector {
    fn project(&self, from_wkt: &str, to_wkt: &str, coordinate: (f64, f64)) -> Result<(f64, f64)> {
        let key = (from_wkt.to_string(), to_wkt.to_string());
        let mut transformations = self.transformations.lock();

        if !transformations.contains_key(&key) {
            tracing::debug!("Building PROJ transformation");
            let transformation = Proj::new_known_crs(from_wkt, to_wkt, None).map_err(|e| {
                GeofilterError::Projection { reason: format!("cannot build transformation: {}", e) }
            })?;
            transformations.insert(key.clone(), transformation);
        }

        let transformation = transformations.get(&key).ok_or_else(|| GeofilterError::Projection {
            reason: "transformation cache lost an entry".to_string(),
        })?;

        transformation.convert(coordinate).map_err(|e| GeofilterError::Projection {
            reason: format!("cannot project ({}, {}): {}", coordinate.0, coordinate.1, e),
        })
    }

    fn check_frame(&self, wkt: &str) -> Result<()> {
        Proj::new(wkt).map(|_| ()).map_err(|e| GeofilterError::Projection {
            reason: format!("cannot build frame: {}", e),
        })
    }
}
