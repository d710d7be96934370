//! Error types for geofilter

use thiserror::Error;

/// Why a requested reprojection could not be carried out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionFailure {
    #[error("the input spatial reference is unknown")]
    UnknownSource,

    #[error("the reprojection spatial reference could not be resolved ({0})")]
    UnresolvedTarget(String),

    #[error("the input spatial reference has no WKT to project from")]
    MissingSourceText,

    #[error("the reprojection spatial reference has no WKT to project to")]
    MissingTargetText,
}

#[derive(Debug, Error)]
pub enum GeofilterError {
    // Filter errors
    #[error("Unsupported geometry filter format: {input}")]
    UnsupportedGeometryFilterFormat { input: String },

    // Spatial reference errors
    #[error("Unsupported spatial reference format: \"{input}\"")]
    UnsupportedSpatialReferenceFormat { input: String },

    #[error("\"{wkid}\" is an unknown spatial reference")]
    UnknownSpatialReference { wkid: u32 },

    #[error("Spatial reference WKT is unparseable: \"{wkt}\"")]
    UnparseableSpatialReferenceText { wkt: String },

    // Reprojection errors
    #[error("Cannot reproject geometry filter: {reason}")]
    ReprojectionPreconditionFailed { reason: PreconditionFailure },

    #[error("Projection failed: {reason}")]
    Projection { reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeofilterError {
    /// Shorthand for a reprojection precondition failure
    pub fn precondition(reason: PreconditionFailure) -> Self {
        GeofilterError::ReprojectionPreconditionFailed { reason }
    }
}

pub type Result<T> = std::result::Result<T, GeofilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_wire_texts() {
        let err = GeofilterError::UnsupportedGeometryFilterFormat {
            input: r#"{"hello":"world"}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"Unsupported geometry filter format: {"hello":"world"}"#);

        let err = GeofilterError::UnknownSpatialReference { wkid: 99999 };
        assert_eq!(err.to_string(), r#""99999" is an unknown spatial reference"#);

        let err = GeofilterError::UnparseableSpatialReferenceText { wkt: "test".to_string() };
        assert_eq!(err.to_string(), r#"Spatial reference WKT is unparseable: "test""#);

        let err = GeofilterError::UnsupportedSpatialReferenceFormat { input: "null".to_string() };
        assert_eq!(err.to_string(), r#"Unsupported spatial reference format: "null""#);
    }

    #[test]
    fn test_precondition_reason_is_rendered() {
        let err = GeofilterError::precondition(PreconditionFailure::UnknownSource);
        assert!(err.to_string().contains("input spatial reference is unknown"));
    }
}
