use crate::error::{GeofilterError, Result};
use crate::models::DEFAULT_SPATIAL_RELATION;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of WKIDs held by the spatial reference cache
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Which projection primitive backs reprojection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectorKind {
    /// Pure-Rust `proj4rs` over the EPSG database
    #[default]
    Builtin,
    /// libproj through the `proj` crate
    Proj,
}

/// Layered configuration for geofilter
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub cache_capacity: ConfigValue<usize>,
    pub default_relation: ConfigValue<String>,
    pub clip_to_valid_bounds: ConfigValue<bool>,
    pub catalog_path: ConfigValue<Option<PathBuf>>,
    pub projector: ConfigValue<ProjectorKind>,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            cache_capacity: ConfigValue::new(DEFAULT_CACHE_CAPACITY, ConfigSource::Default),
            default_relation: ConfigValue::new(
                DEFAULT_SPATIAL_RELATION.to_string(),
                ConfigSource::Default,
            ),
            clip_to_valid_bounds: ConfigValue::new(false, ConfigSource::Default),
            catalog_path: ConfigValue::new(None, ConfigSource::Default),
            projector: ConfigValue::new(ProjectorKind::Builtin, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeofilterError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeofilterError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(capacity) = file_config.cache_capacity {
            self.cache_capacity.update(validate_capacity(capacity)?, ConfigSource::File);
        }

        if let Some(relation) = file_config.default_relation {
            self.default_relation.update(relation, ConfigSource::File);
        }

        if let Some(clip) = file_config.clip_to_valid_bounds {
            self.clip_to_valid_bounds.update(clip, ConfigSource::File);
        }

        if let Some(catalog_path) = file_config.catalog_path {
            self.catalog_path.update(Some(catalog_path), ConfigSource::File);
        }

        if let Some(projector) = file_config.projector {
            self.projector.update(projector, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOFILTER_CACHE_CAPACITY
        if let Ok(capacity_str) = env::var("GEOFILTER_CACHE_CAPACITY") {
            match capacity_str.parse::<usize>().map_err(|e| e.to_string()).and_then(|capacity| {
                validate_capacity(capacity).map_err(|e| e.to_string())
            }) {
                Ok(capacity) => self.cache_capacity.update(capacity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOFILTER_CACHE_CAPACITY value '{}': expected a positive integer",
                    capacity_str
                ),
            }
        }

        // GEOFILTER_RELATION
        if let Ok(relation) = env::var("GEOFILTER_RELATION") {
            if relation.trim().is_empty() {
                tracing::warn!("Ignoring empty GEOFILTER_RELATION");
            } else {
                self.default_relation.update(relation, ConfigSource::Environment);
            }
        }

        // GEOFILTER_CLIP_TO_VALID_BOUNDS
        if let Ok(clip_str) = env::var("GEOFILTER_CLIP_TO_VALID_BOUNDS") {
            match parse_bool(&clip_str) {
                Ok(clip) => self.clip_to_valid_bounds.update(clip, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOFILTER_CLIP_TO_VALID_BOUNDS value '{}': expected true or false",
                    clip_str
                ),
            }
        }

        // GEOFILTER_CATALOG
        if let Ok(catalog) = env::var("GEOFILTER_CATALOG") {
            self.catalog_path.update(Some(PathBuf::from(catalog)), ConfigSource::Environment);
        }

        // GEOFILTER_PROJECTOR
        if let Ok(projector_str) = env::var("GEOFILTER_PROJECTOR") {
            match parse_projector_kind(&projector_str) {
                Ok(projector) => self.projector.update(projector, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOFILTER_PROJECTOR value '{}': expected builtin or proj",
                    projector_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(capacity) = overrides.cache_capacity {
            self.cache_capacity.update(capacity, ConfigSource::Cli);
        }

        if let Some(relation) = overrides.default_relation {
            self.default_relation.update(relation, ConfigSource::Cli);
        }

        if let Some(clip) = overrides.clip_to_valid_bounds {
            self.clip_to_valid_bounds.update(clip, ConfigSource::Cli);
        }

        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog_path.update(Some(catalog_path), ConfigSource::Cli);
        }

        if let Some(projector) = overrides.projector {
            self.projector.update(projector, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "cache_capacity".to_string(),
            (self.cache_capacity.value.to_string(), self.cache_capacity.source),
        );

        map.insert(
            "default_relation".to_string(),
            (self.default_relation.value.clone(), self.default_relation.source),
        );

        map.insert(
            "clip_to_valid_bounds".to_string(),
            (self.clip_to_valid_bounds.value.to_string(), self.clip_to_valid_bounds.source),
        );

        map.insert(
            "catalog_path".to_string(),
            (
                self.catalog_path
                    .value
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(built-in)".to_string()),
                self.catalog_path.source,
            ),
        );

        map.insert(
            "projector".to_string(),
            (format!("{:?}", self.projector.value), self.projector.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    cache_capacity: Option<usize>,
    default_relation: Option<String>,
    clip_to_valid_bounds: Option<bool>,
    catalog_path: Option<PathBuf>,
    projector: Option<ProjectorKind>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub cache_capacity: Option<usize>,
    pub default_relation: Option<String>,
    pub clip_to_valid_bounds: Option<bool>,
    pub catalog_path: Option<PathBuf>,
    pub projector: Option<ProjectorKind>,
}

fn validate_capacity(capacity: usize) -> Result<usize> {
    if capacity == 0 {
        return Err(GeofilterError::ConfigInvalid {
            key: "cache_capacity".to_string(),
            reason: "Cache capacity must be at least 1".to_string(),
        });
    }
    Ok(capacity)
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(GeofilterError::ConfigInvalid {
            key: "clip_to_valid_bounds".to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}

/// Parse projector kind from string
pub fn parse_projector_kind(s: &str) -> Result<ProjectorKind> {
    match s.trim().to_lowercase().as_str() {
        "builtin" => Ok(ProjectorKind::Builtin),
        "proj" => Ok(ProjectorKind::Proj),
        _ => Err(GeofilterError::ConfigInvalid {
            key: "projector".to_string(),
            reason: format!("Invalid projector: {}. Use builtin or proj", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.cache_capacity.value, 10);
        assert_eq!(config.cache_capacity.source, ConfigSource::Default);
        assert_eq!(config.default_relation.value, "esriSpatialRelIntersects");
        assert!(!config.clip_to_valid_bounds.value);
        assert_eq!(config.projector.value, ProjectorKind::Builtin);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
cache_capacity = 64
default_relation = "esriSpatialRelContains"
clip_to_valid_bounds = true
catalog_path = "/etc/geofilter/catalog.toml"
projector = "proj"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.cache_capacity.value, 64);
        assert_eq!(config.cache_capacity.source, ConfigSource::File);
        assert_eq!(config.default_relation.value, "esriSpatialRelContains");
        assert!(config.clip_to_valid_bounds.value);
        assert_eq!(
            config.catalog_path.value.as_deref(),
            Some(Path::new("/etc/geofilter/catalog.toml"))
        );
        assert_eq!(config.projector.value, ProjectorKind::Proj);
    }

    #[test]
    fn test_zero_capacity_in_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cache_capacity = 0").unwrap();

        let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, GeofilterError::ConfigInvalid { ref key, .. } if key == "cache_capacity"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/geofilter.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            cache_capacity: Some(3),
            clip_to_valid_bounds: Some(true),
            ..Default::default()
        };

        config.update_from_cli(overrides);

        assert_eq!(config.cache_capacity.value, 3);
        assert_eq!(config.cache_capacity.source, ConfigSource::Cli);
        assert!(config.clip_to_valid_bounds.value);
        // These should still be defaults
        assert_eq!(config.default_relation.source, ConfigSource::Default);
        assert_eq!(config.projector.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("YES").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_parse_projector_kind() {
        assert_eq!(parse_projector_kind("builtin").unwrap(), ProjectorKind::Builtin);
        assert_eq!(parse_projector_kind("PROJ").unwrap(), ProjectorKind::Proj);
        assert!(parse_projector_kind("gdal").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("cache_capacity"));
        assert!(map.contains_key("default_relation"));
        assert!(map.contains_key("clip_to_valid_bounds"));
        assert!(map.contains_key("catalog_path"));
        assert!(map.contains_key("projector"));

        let (catalog, source) = &map["catalog_path"];
        assert_eq!(catalog, "(built-in)");
        assert_eq!(*source, ConfigSource::Default);
    }
}
