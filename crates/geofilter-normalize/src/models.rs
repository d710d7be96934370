//! Request types for the normalization pipeline

use geofilter_core::models::{Extent, SpatialReferenceInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Geometry as supplied by the caller: either text to be parsed, or an
/// already structured shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeometryInput {
    Text(String),
    Shape(Value),
}

impl From<&str> for GeometryInput {
    fn from(text: &str) -> Self {
        GeometryInput::Text(text.to_string())
    }
}

impl From<String> for GeometryInput {
    fn from(text: String) -> Self {
        GeometryInput::Text(text)
    }
}

impl From<Value> for GeometryInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => GeometryInput::Text(text),
            other => GeometryInput::Shape(other),
        }
    }
}

/// A geometry filter to normalize.
///
/// Field names follow the ArcGIS REST wire names, which are also accepted
/// as aliases (`inSR`, `reprojectionSR`, `spatialRel`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeRequest {
    pub geometry: GeometryInput,

    #[serde(default, alias = "inSR", skip_serializing_if = "Option::is_none")]
    pub input_spatial_reference: Option<SpatialReferenceInput>,

    #[serde(default, alias = "reprojectionSR", skip_serializing_if = "Option::is_none")]
    pub reprojection_spatial_reference: Option<SpatialReferenceInput>,

    #[serde(default, alias = "spatialRel", skip_serializing_if = "Option::is_none")]
    pub spatial_relation: Option<String>,

    /// Clamp to valid bounds; `None` defers to configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_to_valid_bounds: Option<bool>,

    /// Explicit clip extent; supplying one enables clipping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_extent: Option<Extent>,

    /// Frame `clip_extent` is expressed in, geographic WGS 84 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_spatial_reference: Option<SpatialReferenceInput>,
}

impl NormalizeRequest {
    pub fn new(geometry: impl Into<GeometryInput>) -> Self {
        Self {
            geometry: geometry.into(),
            input_spatial_reference: None,
            reprojection_spatial_reference: None,
            spatial_relation: None,
            clip_to_valid_bounds: None,
            clip_extent: None,
            clip_spatial_reference: None,
        }
    }

    pub fn with_input_spatial_reference(mut self, input: impl Into<SpatialReferenceInput>) -> Self {
        self.input_spatial_reference = Some(input.into());
        self
    }

    pub fn with_reprojection(mut self, target: impl Into<SpatialReferenceInput>) -> Self {
        self.reprojection_spatial_reference = Some(target.into());
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.spatial_relation = Some(relation.into());
        self
    }

    pub fn with_clip(mut self, clip: bool) -> Self {
        self.clip_to_valid_bounds = Some(clip);
        self
    }

    pub fn with_clip_extent(mut self, extent: Extent) -> Self {
        self.clip_extent = Some(extent);
        self
    }

    pub fn with_clip_spatial_reference(mut self, input: impl Into<SpatialReferenceInput>) -> Self {
        self.clip_spatial_reference = Some(input.into());
        self
    }
}
