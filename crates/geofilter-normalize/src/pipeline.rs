use geofilter_core::config::{LayeredConfig, ProjectorKind};
use geofilter_core::error::{GeofilterError, PreconditionFailure, Result};
use geofilter_core::models::{
    Extent, Geometry, GeometryFilter, SpatialReference, SpatialReferenceInput,
    DEFAULT_SPATIAL_RELATION,
};
use geofilter_core::ports::Projector;
use geofilter_geo::arcgis::ArcgisShape;
use geofilter_geo::{
    BoundsClipper, Proj4rsProjector, ProjectionWktValidator, Reprojector, SpatialReferenceResolver,
    StaticCatalog, WkidCache,
};
use serde_json::Value;
use std::sync::Arc;

use crate::models::NormalizeRequest;
use crate::parse::parse_geometry_input;

/// Parsed input that matched a known shape
#[derive(Debug, Clone)]
struct ValidatedFilter {
    shape: ArcgisShape,
}

/// Outcome of resolving the reprojection target
#[derive(Debug, Clone)]
enum TargetReference {
    NotRequested,
    Resolved(SpatialReference),
    Unresolved(String),
}

impl TargetReference {
    /// The target, if reprojection was asked for; an unresolved target is
    /// a failed precondition
    fn requested(&self) -> Result<Option<&SpatialReference>> {
        match self {
            TargetReference::NotRequested => Ok(None),
            TargetReference::Resolved(target) => Ok(Some(target)),
            TargetReference::Unresolved(detail) => Err(GeofilterError::precondition(
                PreconditionFailure::UnresolvedTarget(detail.clone()),
            )),
        }
    }
}

/// Validated filter with its references resolved
#[derive(Debug, Clone)]
struct ResolvedFilter {
    shape: ArcgisShape,
    input: Option<SpatialReference>,
    target: TargetReference,
}

/// State threaded through the geometry stages
#[derive(Debug, Clone)]
struct NormalizationContext<'a> {
    request: &'a NormalizeRequest,
    geometry: Geometry,
    input: Option<SpatialReference>,
    target: TargetReference,
    reprojected: bool,
}

/// Normalizes geometry filter requests.
///
/// Stages run in a fixed order: parse, validate shape, resolve input
/// reference, resolve target reference, convert geometry, clip, reproject
/// and package. Each stage takes the previous stage's output by value.
#[derive(Clone)]
pub struct FilterNormalizer {
    resolver: SpatialReferenceResolver,
    clipper: BoundsClipper,
    default_relation: String,
    clip_by_default: bool,
}

impl FilterNormalizer {
    /// Create a normalizer from explicit collaborators
    pub fn new(resolver: SpatialReferenceResolver, reprojector: Reprojector) -> Self {
        Self {
            resolver,
            clipper: BoundsClipper::new(reprojector),
            default_relation: DEFAULT_SPATIAL_RELATION.to_string(),
            clip_by_default: false,
        }
    }

    /// Built-in catalog and projector with the process-wide cache
    pub fn with_defaults() -> Self {
        Self::new(SpatialReferenceResolver::with_defaults(), Reprojector::with_defaults())
    }

    /// Build a normalizer from layered configuration
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        let mut catalog = StaticCatalog::builtin();
        if let Some(path) = &config.catalog_path.value {
            catalog = catalog.load_from_file(path)?;
            tracing::info!(path = %path.display(), entries = catalog.len(), "Loaded spatial reference catalog");
        }

        let projector = projector_for(config.projector.value, &catalog)?;
        let resolver = SpatialReferenceResolver::new(
            Arc::new(catalog),
            Arc::new(ProjectionWktValidator::new(Arc::clone(&projector))),
            Arc::new(WkidCache::new(config.cache_capacity.value)),
        );
        let reprojector = Reprojector::new(projector, resolver.geographic()?);

        Ok(Self::new(resolver, reprojector)
            .with_default_relation(config.default_relation.value.clone())
            .with_clip_by_default(config.clip_to_valid_bounds.value))
    }

    /// Relation used when a request names none
    pub fn with_default_relation(mut self, relation: impl Into<String>) -> Self {
        self.default_relation = relation.into();
        self
    }

    /// Clip requests that do not say otherwise
    pub fn with_clip_by_default(mut self, clip: bool) -> Self {
        self.clip_by_default = clip;
        self
    }

    pub fn resolver(&self) -> &SpatialReferenceResolver {
        &self.resolver
    }

    /// Normalize a request into a geometry filter
    pub fn normalize(&self, request: &NormalizeRequest) -> Result<GeometryFilter> {
        let parsed = parse_geometry_input(&request.geometry);
        let validated = self.validate_shape(parsed)?;
        let input = self.resolve_input_sr(&validated, request)?;
        let resolved = ResolvedFilter {
            target: self.resolve_target_sr(request),
            shape: validated.shape,
            input,
        };

        let context = self.convert_geometry(request, resolved);
        let context = self.maybe_clip(context)?;
        let context = self.maybe_reproject(context)?;
        Ok(self.package(context))
    }

    fn validate_shape(&self, parsed: Value) -> Result<ValidatedFilter> {
        match ArcgisShape::classify(&parsed) {
            Some(shape) => {
                tracing::debug!(kind = %shape.kind(), "Recognized geometry filter");
                Ok(ValidatedFilter { shape })
            }
            None => Err(GeofilterError::UnsupportedGeometryFilterFormat {
                input: serde_json::to_string(&parsed).unwrap_or_else(|_| parsed.to_string()),
            }),
        }
    }

    /// The embedded reference wins over the request's. An unknown WKID
    /// degrades to no reference; malformed input is an error.
    fn resolve_input_sr(
        &self,
        validated: &ValidatedFilter,
        request: &NormalizeRequest,
    ) -> Result<Option<SpatialReference>> {
        let input = validated
            .shape
            .embedded_spatial_reference()
            .or(request.input_spatial_reference.as_ref());
        self.resolve_optional(input, "input")
    }

    fn resolve_target_sr(&self, request: &NormalizeRequest) -> TargetReference {
        let Some(target) = request.reprojection_spatial_reference.as_ref() else {
            return TargetReference::NotRequested;
        };

        match self.resolver.resolve(Some(target)) {
            Ok(Some(reference)) => TargetReference::Resolved(reference),
            Ok(None) => TargetReference::NotRequested,
            Err(e) => {
                tracing::debug!(error = %e, "Reprojection target did not resolve");
                TargetReference::Unresolved(e.to_string())
            }
        }
    }

    fn convert_geometry<'a>(
        &self,
        request: &'a NormalizeRequest,
        resolved: ResolvedFilter,
    ) -> NormalizationContext<'a> {
        NormalizationContext {
            request,
            geometry: resolved.shape.to_geometry(),
            input: resolved.input,
            target: resolved.target,
            reprojected: false,
        }
    }

    fn maybe_clip<'a>(&self, context: NormalizationContext<'a>) -> Result<NormalizationContext<'a>> {
        let request = context.request;
        let requested = request.clip_to_valid_bounds.unwrap_or(self.clip_by_default)
            || request.clip_extent.is_some();
        if !requested {
            return Ok(context);
        }

        let Some(input_wkt) = context.input.as_ref().and_then(|sr| sr.wkt.clone()) else {
            tracing::debug!("No input spatial reference, skipping clip");
            return Ok(context);
        };

        // A supplied extent is expressed in the named frame. Catalog extents
        // are in geographic degrees, so they are tested there.
        let geographic = self.clipper.reprojector().geographic();
        let named = self.resolve_optional(request.clip_spatial_reference.as_ref(), "clip")?;
        let (frame_wkt, extent) = match request.clip_extent {
            Some(extent) => {
                let frame = named.as_ref().unwrap_or(geographic);
                (frame.wkt.as_deref(), Some(extent))
            }
            None => {
                let extent = named.as_ref().and_then(|frame| frame.extent).or(geographic.extent);
                (geographic.wkt.as_deref(), extent)
            }
        };
        let Some(frame_wkt) = frame_wkt else {
            tracing::warn!("Clip frame has no WKT, skipping clip");
            return Ok(context);
        };
        let Some(extent) = extent else {
            tracing::warn!("No extent to clip against, skipping clip");
            return Ok(context);
        };
        if !extent.is_valid() {
            tracing::warn!(?extent, "Clip extent is inverted, skipping clip");
            return Ok(context);
        }

        let coordinates = &context.geometry.coordinates;
        let out_of_bounds = match self.clipper.has_out_of_bounds(coordinates, &extent, &input_wkt, frame_wkt) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "Frames are not comparable, skipping clip");
                return Ok(context);
            }
        };
        if !out_of_bounds {
            tracing::debug!("Geometry is within valid bounds");
            return Ok(context);
        }

        let clipped = self.clip(&context.geometry, &extent, &input_wkt, frame_wkt)?;
        tracing::debug!("Clipped geometry to valid bounds");
        Ok(NormalizationContext { geometry: clipped, ..context })
    }

    fn clip(&self, geometry: &Geometry, extent: &Extent, geometry_wkt: &str, extent_wkt: &str) -> Result<Geometry> {
        let coordinates = self.clipper.clip(&geometry.coordinates, extent, geometry_wkt, extent_wkt)?;
        Ok(geometry.with_coordinates(coordinates))
    }

    fn maybe_reproject<'a>(&self, context: NormalizationContext<'a>) -> Result<NormalizationContext<'a>> {
        let Some(target) = context.target.requested()? else {
            return Ok(context);
        };

        let input = context
            .input
            .as_ref()
            .ok_or_else(|| GeofilterError::precondition(PreconditionFailure::UnknownSource))?;
        let from_wkt = input
            .wkt
            .as_deref()
            .ok_or_else(|| GeofilterError::precondition(PreconditionFailure::MissingSourceText))?;
        let to_wkt = target
            .wkt
            .as_deref()
            .ok_or_else(|| GeofilterError::precondition(PreconditionFailure::MissingTargetText))?;

        if input.same_frame(target) {
            tracing::debug!("Input and target frames match, skipping reprojection");
            return Ok(context);
        }

        let geometry = self.clipper.reprojector().reproject_geometry(&context.geometry, from_wkt, to_wkt)?;
        tracing::debug!(wkid = ?target.wkid, "Reprojected geometry");
        Ok(NormalizationContext { geometry, reprojected: true, ..context })
    }

    fn package(&self, context: NormalizationContext<'_>) -> GeometryFilter {
        let spatial_reference = match context.target {
            TargetReference::Resolved(target) if context.reprojected => Some(target),
            _ => context.input,
        };
        let relation = context
            .request
            .spatial_relation
            .as_deref()
            .filter(|relation| !relation.is_empty())
            .unwrap_or(&self.default_relation)
            .to_string();

        GeometryFilter { geometry: context.geometry, spatial_reference, relation }
    }

    fn resolve_optional(
        &self,
        input: Option<&SpatialReferenceInput>,
        role: &str,
    ) -> Result<Option<SpatialReference>> {
        match self.resolver.resolve(input) {
            Err(GeofilterError::UnknownSpatialReference { wkid }) => {
                tracing::warn!(wkid, role, "Unknown spatial reference, treating as absent");
                Ok(None)
            }
            other => other,
        }
    }
}

fn projector_for(kind: ProjectorKind, catalog: &StaticCatalog) -> Result<Arc<dyn Projector>> {
    match kind {
        ProjectorKind::Builtin => Ok(Arc::new(Proj4rsProjector::new(catalog.definitions().clone()))),
        #[cfg(feature = "proj")]
        ProjectorKind::Proj => Ok(Arc::new(geofilter_geo::proj_backend::ProjProjector::new())),
        #[cfg(not(feature = "proj"))]
        ProjectorKind::Proj => Err(GeofilterError::ConfigInvalid {
            key: "projector".to_string(),
            reason: "built without the proj feature".to_string(),
        }),
    }
}
