//! Spatial reference resolution.
//!
//! Turns any supported spatial reference input into a canonical
//! [`SpatialReference`]. WKID lookups go through the LRU cache before the
//! catalog; WKT input is validated and never cached.

use crate::cache::WkidCache;
use crate::catalog::{StaticCatalog, WGS84_WKID};
use crate::projection::Proj4rsProjector;
use crate::wkt::ProjectionWktValidator;
use geofilter_core::error::{GeofilterError, Result};
use geofilter_core::models::{SpatialReference, SpatialReferenceInput, SpatialReferenceObject};
use geofilter_core::ports::{SpatialReferenceCatalog, WktValidator};
use std::sync::Arc;

/// An input reduced to the one thing it names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSpatialReference {
    Wkid(u32),
    Wkt(String),
}

/// Resolves spatial reference inputs against a catalog, with caching
#[derive(Clone)]
pub struct SpatialReferenceResolver {
    catalog: Arc<dyn SpatialReferenceCatalog>,
    validator: Arc<dyn WktValidator>,
    cache: Arc<WkidCache>,
}

impl SpatialReferenceResolver {
    /// Create a resolver from explicit collaborators
    pub fn new(
        catalog: Arc<dyn SpatialReferenceCatalog>,
        validator: Arc<dyn WktValidator>,
        cache: Arc<WkidCache>,
    ) -> Self {
        Self { catalog, validator, cache }
    }

    /// Built-in catalog, WKT validated against the `proj4rs` backend and the
    /// process-wide cache of built-in catalog entries
    pub fn with_defaults() -> Self {
        let catalog = StaticCatalog::builtin();
        let projector = Proj4rsProjector::new(catalog.definitions().clone());
        Self::new(
            Arc::new(catalog),
            Arc::new(ProjectionWktValidator::new(Arc::new(projector))),
            WkidCache::shared(),
        )
    }

    pub fn cache(&self) -> &Arc<WkidCache> {
        &self.cache
    }

    /// Resolve an optional input; an absent input resolves to `None`
    pub fn resolve(&self, input: Option<&SpatialReferenceInput>) -> Result<Option<SpatialReference>> {
        let Some(input) = input else {
            return Ok(None);
        };

        match parse_input(input)? {
            ParsedSpatialReference::Wkid(wkid) => self.resolve_wkid(wkid).map(Some),
            ParsedSpatialReference::Wkt(wkt) => self.resolve_wkt(&wkt).map(Some),
        }
    }

    /// Resolve a WKID through the cache, consulting the catalog on a miss
    pub fn resolve_wkid(&self, wkid: u32) -> Result<SpatialReference> {
        if let Some(entry) = self.cache.get(wkid) {
            tracing::debug!("Spatial reference cache hit for WKID {}", wkid);
            return Ok(SpatialReference::from_catalog(wkid, entry));
        }

        tracing::debug!("Spatial reference cache miss for WKID {}", wkid);
        let entry = self
            .catalog
            .lookup(wkid)
            .ok_or(GeofilterError::UnknownSpatialReference { wkid })?;

        self.cache.insert(wkid, entry.clone());
        Ok(SpatialReference::from_catalog(wkid, entry))
    }

    /// Accept a WKT descriptor the validator approves
    pub fn resolve_wkt(&self, wkt: &str) -> Result<SpatialReference> {
        self.validator.check(wkt).map_err(|reason| {
            tracing::debug!("Rejected WKT descriptor: {}", reason);
            GeofilterError::UnparseableSpatialReferenceText { wkt: wkt.to_string() }
        })?;
        Ok(SpatialReference::from_wkt(wkt))
    }

    /// The canonical geographic (degrees) reference
    pub fn geographic(&self) -> Result<SpatialReference> {
        self.resolve_wkid(WGS84_WKID)
    }
}

/// Reduce an input to a WKID or a WKT, rejecting unrecognized shapes
pub fn parse_input(input: &SpatialReferenceInput) -> Result<ParsedSpatialReference> {
    let unsupported = || GeofilterError::UnsupportedSpatialReferenceFormat {
        input: input.to_raw_string(),
    };

    match input {
        SpatialReferenceInput::Wkid(wkid) => {
            u32::try_from(*wkid).map(ParsedSpatialReference::Wkid).map_err(|_| unsupported())
        }
        SpatialReferenceInput::Text(text) => match text.trim().parse::<u32>() {
            Ok(wkid) => Ok(ParsedSpatialReference::Wkid(wkid)),
            Err(_) => Ok(ParsedSpatialReference::Wkt(text.clone())),
        },
        SpatialReferenceInput::Object(object) => parse_object(object).ok_or_else(unsupported)?,
        SpatialReferenceInput::Other(_) => Err(unsupported()),
    }
}

// wkid > latestWkid > wkt
fn parse_object(object: &SpatialReferenceObject) -> Option<Result<ParsedSpatialReference>> {
    let code = object.wkid.or(object.latest_wkid);
    if let Some(code) = code {
        return Some(
            u32::try_from(code).map(ParsedSpatialReference::Wkid).map_err(|_| {
                GeofilterError::UnsupportedSpatialReferenceFormat {
                    input: SpatialReferenceInput::Object(object.clone()).to_raw_string(),
                }
            }),
        );
    }
    object.wkt.clone().map(|wkt| Ok(ParsedSpatialReference::Wkt(wkt)))
}
