//! Spatial reference catalog.
//!
//! WKIDs resolve against the EPSG database bundled by `crs-definitions`,
//! overlaid with Esri aliases, known valid extents and entries loaded from
//! TOML files.
//!
//! Extents are expressed in geographic degrees regardless of the frame they
//! describe, which is why clipping tests bounds in the geographic frame.

use crate::projection::FrameDefinitions;
use geofilter_core::error::{GeofilterError, Result};
use geofilter_core::models::{CatalogEntry, Extent};
use geofilter_core::ports::SpatialReferenceCatalog;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// WKID of geographic WGS 84
pub const WGS84_WKID: u32 = 4326;

/// WKID of WGS 84 web mercator
pub const WEB_MERCATOR_WKID: u32 = 3857;

/// Valid extent of geographic WGS 84
pub const WGS84_EXTENT: Extent = Extent { xmin: -180.0, xmax: 180.0, ymin: -90.0, ymax: 90.0 };

const WEB_MERCATOR_EXTENT: Extent =
    Extent { xmin: -180.0, xmax: 180.0, ymin: -85.06, ymax: 85.06 };

// Esri codes for frames the EPSG database knows under another code
const ESRI_ALIASES: &[(u32, u32)] = &[(102100, WEB_MERCATOR_WKID), (102113, WEB_MERCATOR_WKID)];

const KNOWN_EXTENTS: &[(u32, Extent)] = &[
    (WGS84_WKID, WGS84_EXTENT),
    (4269, Extent { xmin: -172.54, xmax: -47.74, ymin: 23.81, ymax: 86.46 }),
    (WEB_MERCATOR_WKID, WEB_MERCATOR_EXTENT),
    (2991, Extent { xmin: -124.6, xmax: -116.47, ymin: 41.98, ymax: 46.26 }),
];

/// WKT of an EPSG code in the bundled database
pub fn epsg_wkt(code: u32) -> Option<&'static str> {
    u16::try_from(code).ok().and_then(crs_definitions::from_code).map(|def| def.wkt)
}

/// Canonical WKT of geographic WGS 84
pub fn wgs84_wkt() -> &'static str {
    epsg_wkt(WGS84_WKID).unwrap_or_default()
}

/// Canonical WKT of WGS 84 web mercator
pub fn web_mercator_wkt() -> &'static str {
    epsg_wkt(WEB_MERCATOR_WKID).unwrap_or_default()
}

/// Catalog keyed by WKID
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<u32, CatalogEntry>,
    aliases: HashMap<u32, u32>,
    extents: HashMap<u32, Extent>,
    definitions: FrameDefinitions,
    epsg: bool,
}

impl StaticCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The EPSG database with Esri aliases and known extents
    pub fn builtin() -> Self {
        let mut catalog = Self::new().with_epsg_database();
        catalog.aliases.extend(ESRI_ALIASES.iter().copied());
        catalog.extents.extend(KNOWN_EXTENTS.iter().copied());
        catalog
    }

    /// Fall back to the bundled EPSG database for WKIDs without an entry
    pub fn with_epsg_database(mut self) -> Self {
        self.epsg = true;
        self
    }

    /// Add or replace an entry
    pub fn with_entry(mut self, wkid: u32, wkt: impl Into<String>, extent: Option<Extent>) -> Self {
        self.entries.insert(wkid, CatalogEntry { wkt: wkt.into(), extent });
        self
    }

    /// Resolve `alias` as if it were `wkid`
    pub fn with_alias(mut self, alias: u32, wkid: u32) -> Self {
        self.aliases.insert(alias, wkid);
        self
    }

    /// Extend the catalog with entries from a TOML file
    ///
    /// ```toml
    /// [[spatial_reference]]
    /// wkid = 900913
    /// wkt = 'PROJCS["Google_Maps_Global_Mercator",...]'
    /// proj4 = "+proj=merc +a=6378137 +b=6378137 +units=m +no_defs"
    /// extent = { xmin = -180.0, xmax = 180.0, ymin = -85.06, ymax = 85.06 }
    /// ```
    ///
    /// `proj4` is only needed for frames the EPSG database does not know.
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                GeofilterError::ConfigMissing { key: "catalog_path".to_string() }
            }
            _ => GeofilterError::ConfigInvalid {
                key: "catalog_path".to_string(),
                reason: format!("Failed to read catalog file: {}", e),
            },
        })?;

        let file: CatalogFile =
            toml::from_str(&content).map_err(|e| GeofilterError::ConfigInvalid {
                key: "catalog_path".to_string(),
                reason: format!("Failed to parse catalog TOML: {}", e),
            })?;

        for record in file.spatial_reference {
            if let Some(extent) = record.extent {
                if !extent.is_valid() {
                    return Err(GeofilterError::ConfigInvalid {
                        key: "catalog_path".to_string(),
                        reason: format!("Extent of WKID {} has min greater than max", record.wkid),
                    });
                }
            }
            tracing::debug!("Loaded catalog entry for WKID {}", record.wkid);
            if let Some(proj4) = record.proj4 {
                self.definitions.insert(record.wkt.clone(), proj4);
            }
            self.entries.insert(record.wkid, CatalogEntry { wkt: record.wkt, extent: record.extent });
        }

        Ok(self)
    }

    /// Projection definitions for WKTs loaded from files
    pub fn definitions(&self) -> &FrameDefinitions {
        &self.definitions
    }

    /// Number of explicit entries, not counting the EPSG database
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn extent_of(&self, wkid: u32, code: u32) -> Option<Extent> {
        self.extents.get(&wkid).or_else(|| self.extents.get(&code)).copied()
    }
}

impl SpatialReferenceCatalog for StaticCatalog {
    fn lookup(&self, wkid: u32) -> Option<CatalogEntry> {
        if let Some(entry) = self.entries.get(&wkid) {
            return Some(entry.clone());
        }

        let code = self.aliases.get(&wkid).copied().unwrap_or(wkid);
        if let Some(entry) = self.entries.get(&code) {
            return Some(entry.clone());
        }

        if !self.epsg {
            return None;
        }
        epsg_wkt(code).map(|wkt| CatalogEntry { wkt: wkt.to_string(), extent: self.extent_of(wkid, code) })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    spatial_reference: Vec<CatalogRecord>,
}

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    wkid: u32,
    wkt: String,
    proj4: Option<String>,
    extent: Option<Extent>,
}
