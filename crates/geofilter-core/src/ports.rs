//! Ports through which external collaborators are plugged in.

use crate::error::Result;
use crate::models::CatalogEntry;

/// Port for looking up a WKID in a spatial reference catalog
pub trait SpatialReferenceCatalog: Send + Sync {
    /// Canonical WKT and valid extent for a WKID, or `None` if unknown
    fn lookup(&self, wkid: u32) -> Option<CatalogEntry>;
}

/// Port for syntactic validation of WKT descriptors
pub trait WktValidator: Send + Sync {
    /// Returns a human-readable reason when the text is not well-formed
    fn check(&self, wkt: &str) -> std::result::Result<(), String>;
}

/// Port for the cartographic projection primitive
pub trait Projector: Send + Sync {
    /// Transform one planar coordinate between two WKT-described frames
    fn project(&self, from_wkt: &str, to_wkt: &str, coordinate: (f64, f64)) -> Result<(f64, f64)>;

    /// Fails when the backend cannot build a frame from the WKT
    fn check_frame(&self, _wkt: &str) -> Result<()> {
        Ok(())
    }
}
