//! Spatial reference inputs and their resolved, canonical form.

use serde::{Deserialize, Deserializer, Serialize};

/// Axis-aligned valid coordinate domain of a reference frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self { xmin, xmax, ymin, ymax }
    }

    /// Inclusive containment test
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Pull each axis independently into the extent
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (self.clamp_x(x), self.clamp_y(y))
    }

    pub fn clamp_x(&self, x: f64) -> f64 {
        clamp_axis(x, self.xmin, self.xmax)
    }

    pub fn clamp_y(&self, y: f64) -> f64 {
        clamp_axis(y, self.ymin, self.ymax)
    }

    pub fn is_valid(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }
}

fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// What a catalog knows about a WKID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub wkt: String,
    #[serde(default)]
    pub extent: Option<Extent>,
}

/// A resolved spatial reference.
///
/// Two values describe the same frame iff their WKT matches; the WKID is a
/// convenience, since several WKIDs may map to one WKT.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkt: Option<String>,
    #[serde(skip)]
    pub extent: Option<Extent>,
}

impl SpatialReference {
    pub fn from_catalog(wkid: u32, entry: CatalogEntry) -> Self {
        Self { wkid: Some(wkid), wkt: Some(entry.wkt), extent: entry.extent }
    }

    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self { wkid: None, wkt: Some(wkt.into()), extent: None }
    }

    /// At least one of WKID or WKT is known
    pub fn is_resolved(&self) -> bool {
        self.wkid.is_some() || self.wkt.is_some()
    }

    /// Both references carry a WKT and the texts match
    pub fn same_frame(&self, other: &SpatialReference) -> bool {
        matches!((&self.wkt, &other.wkt), (Some(a), Some(b)) if a == b)
    }
}

impl PartialEq for SpatialReference {
    fn eq(&self, other: &Self) -> bool {
        self.wkt == other.wkt
    }
}

/// Object form of a spatial reference, as carried by ArcGIS geometries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialReferenceObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkid: Option<i64>,
    #[serde(rename = "latestWkid", default, skip_serializing_if = "Option::is_none")]
    pub latest_wkid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkt: Option<String>,
}

/// Any supported way of naming a spatial reference.
///
/// `Other` captures values of no recognized shape so the resolver can report
/// them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpatialReferenceInput {
    Wkid(i64),
    Text(String),
    Object(SpatialReferenceObject),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for SpatialReferenceInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl SpatialReferenceInput {
    /// Classify a raw JSON value; never fails
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(ref number) => match number.as_i64() {
                Some(wkid) => SpatialReferenceInput::Wkid(wkid),
                None => SpatialReferenceInput::Other(value),
            },
            serde_json::Value::String(text) => SpatialReferenceInput::Text(text),
            serde_json::Value::Object(_) => {
                match serde_json::from_value::<SpatialReferenceObject>(value.clone()) {
                    Ok(object) => SpatialReferenceInput::Object(object),
                    Err(_) => SpatialReferenceInput::Other(value),
                }
            }
            other => SpatialReferenceInput::Other(other),
        }
    }

    /// Compact JSON of the input, used in error messages
    pub fn to_raw_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

impl From<u32> for SpatialReferenceInput {
    fn from(wkid: u32) -> Self {
        SpatialReferenceInput::Wkid(wkid.into())
    }
}

impl From<&str> for SpatialReferenceInput {
    fn from(text: &str) -> Self {
        SpatialReferenceInput::Text(text.to_string())
    }
}

impl From<String> for SpatialReferenceInput {
    fn from(text: String) -> Self {
        SpatialReferenceInput::Text(text)
    }
}

impl From<SpatialReferenceObject> for SpatialReferenceInput {
    fn from(object: SpatialReferenceObject) -> Self {
        SpatialReferenceInput::Object(object)
    }
}
