use crate::error::{GeruestError, Result};
use crate::models::{ScaffoldSystem, WidthClass};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Default backend base URL
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Drawing generation is the only call with a timeout
pub const DEFAULT_DRAWING_TIMEOUT_SECS: u64 = 120;

/// Default number of cached drawings
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

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

/// Layered configuration for the planner client
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub backend_url: ConfigValue<String>,
    pub drawing_timeout_secs: ConfigValue<u64>,
    pub cache_capacity: ConfigValue<usize>,
    pub cache_ttl_secs: ConfigValue<Option<u64>>,
    pub scaffold_system: ConfigValue<ScaffoldSystem>,
    pub width_class: ConfigValue<WidthClass>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            backend_url: ConfigValue::new(DEFAULT_BACKEND_URL.to_string(), ConfigSource::Default),
            drawing_timeout_secs: ConfigValue::new(
                DEFAULT_DRAWING_TIMEOUT_SECS,
                ConfigSource::Default,
            ),
            cache_capacity: ConfigValue::new(DEFAULT_CACHE_CAPACITY, ConfigSource::Default),
            cache_ttl_secs: ConfigValue::new(None, ConfigSource::Default),
            scaffold_system: ConfigValue::new(ScaffoldSystem::Blitz70, ConfigSource::Default),
            width_class: ConfigValue::new(WidthClass::W09, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeruestError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeruestError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(backend_url) = file_config.backend_url {
            self.backend_url.update(normalize_url(&backend_url)?, ConfigSource::File);
        }

        if let Some(timeout) = file_config.drawing_timeout_secs {
            self.drawing_timeout_secs.update(timeout, ConfigSource::File);
        }

        if let Some(capacity) = file_config.cache_capacity {
            self.cache_capacity.update(capacity, ConfigSource::File);
        }

        if let Some(ttl) = file_config.cache_ttl_secs {
            self.cache_ttl_secs.update(Some(ttl), ConfigSource::File);
        }

        if let Some(system) = file_config.scaffold_system {
            self.scaffold_system.update(system.parse()?, ConfigSource::File);
        }

        if let Some(width_class) = file_config.width_class {
            self.width_class.update(width_class.parse()?, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from a TOML file if it exists
    pub fn load_from_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().exists() {
            self.load_from_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GERUEST_BACKEND_URL
        if let Ok(url) = env::var("GERUEST_BACKEND_URL") {
            match normalize_url(&url) {
                Ok(url) => self.backend_url.update(url, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GERUEST_BACKEND_URL value '{}': expected http:// or https:// URL",
                    url
                ),
            }
        }

        // GERUEST_DRAWING_TIMEOUT
        if let Ok(timeout_str) = env::var("GERUEST_DRAWING_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.drawing_timeout_secs.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GERUEST_DRAWING_TIMEOUT value '{}': expected seconds",
                    timeout_str
                ),
            }
        }

        // GERUEST_CACHE_CAPACITY
        if let Ok(capacity_str) = env::var("GERUEST_CACHE_CAPACITY") {
            match capacity_str.parse::<usize>() {
                Ok(capacity) => self.cache_capacity.update(capacity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GERUEST_CACHE_CAPACITY value '{}': expected integer",
                    capacity_str
                ),
            }
        }

        // GERUEST_CACHE_TTL
        if let Ok(ttl_str) = env::var("GERUEST_CACHE_TTL") {
            match ttl_str.parse::<u64>() {
                Ok(ttl) => self.cache_ttl_secs.update(Some(ttl), ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GERUEST_CACHE_TTL value '{}': expected seconds",
                    ttl_str
                ),
            }
        }

        // GERUEST_SYSTEM
        if let Ok(system_str) = env::var("GERUEST_SYSTEM") {
            match system_str.parse::<ScaffoldSystem>() {
                Ok(system) => self.scaffold_system.update(system, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GERUEST_SYSTEM value '{}': expected blitz70 or allround",
                    system_str
                ),
            }
        }

        // GERUEST_WIDTH_CLASS
        if let Ok(width_str) = env::var("GERUEST_WIDTH_CLASS") {
            match width_str.parse::<WidthClass>() {
                Ok(width_class) => self.width_class.update(width_class, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GERUEST_WIDTH_CLASS value '{}': expected W06, W09, or W12",
                    width_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) -> Result<()> {
        if let Some(backend_url) = overrides.backend_url {
            self.backend_url.update(normalize_url(&backend_url)?, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.drawing_timeout_secs {
            self.drawing_timeout_secs.update(timeout, ConfigSource::Cli);
        }

        if let Some(system) = overrides.scaffold_system {
            self.scaffold_system.update(system, ConfigSource::Cli);
        }

        if let Some(width_class) = overrides.width_class {
            self.width_class.update(width_class, ConfigSource::Cli);
        }

        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "backend_url".to_string(),
            (self.backend_url.value.clone(), self.backend_url.source),
        );

        map.insert(
            "drawing_timeout_secs".to_string(),
            (self.drawing_timeout_secs.value.to_string(), self.drawing_timeout_secs.source),
        );

        map.insert(
            "cache_capacity".to_string(),
            (self.cache_capacity.value.to_string(), self.cache_capacity.source),
        );

        map.insert(
            "cache_ttl_secs".to_string(),
            (
                self.cache_ttl_secs
                    .value
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "none".to_string()),
                self.cache_ttl_secs.source,
            ),
        );

        map.insert(
            "scaffold_system".to_string(),
            (self.scaffold_system.value.id().to_string(), self.scaffold_system.source),
        );

        map.insert(
            "width_class".to_string(),
            (self.width_class.value.to_string(), self.width_class.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    backend_url: Option<String>,
    drawing_timeout_secs: Option<u64>,
    cache_capacity: Option<usize>,
    cache_ttl_secs: Option<u64>,
    scaffold_system: Option<String>,
    width_class: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub backend_url: Option<String>,
    pub drawing_timeout_secs: Option<u64>,
    pub scaffold_system: Option<ScaffoldSystem>,
    pub width_class: Option<WidthClass>,
}

/// Validate a backend URL and strip trailing slashes
pub fn normalize_url(s: &str) -> Result<String> {
    let trimmed = s.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(GeruestError::ConfigInvalid {
            key: "backend_url".to_string(),
            reason: format!("Invalid backend URL: {}. Use http:// or https://", s),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.backend_url.value, "http://localhost:8000");
        assert_eq!(config.backend_url.source, ConfigSource::Default);
        assert_eq!(config.drawing_timeout_secs.value, 120);
        assert_eq!(config.cache_ttl_secs.value, None);
        assert_eq!(config.width_class.value, WidthClass::W09);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
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
backend_url = "https://geruest.example.ch/"
drawing_timeout_secs = 60
cache_capacity = 16
cache_ttl_secs = 900
scaffold_system = "allround"
width_class = "W12"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.backend_url.value, "https://geruest.example.ch");
        assert_eq!(config.backend_url.source, ConfigSource::File);
        assert_eq!(config.drawing_timeout_secs.value, 60);
        assert_eq!(config.cache_capacity.value, 16);
        assert_eq!(config.cache_ttl_secs.value, Some(900));
        assert_eq!(config.scaffold_system.value, ScaffoldSystem::Allround);
        assert_eq!(config.width_class.value, WidthClass::W12);
    }

    #[test]
    fn test_invalid_width_class_in_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"width_class = "W99""#).unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(GeruestError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            backend_url: Some("http://10.0.0.5:9000".to_string()),
            width_class: Some(WidthClass::W06),
            ..Default::default()
        };

        config.update_from_cli(overrides).unwrap();

        assert_eq!(config.backend_url.value, "http://10.0.0.5:9000");
        assert_eq!(config.backend_url.source, ConfigSource::Cli);
        assert_eq!(config.width_class.value, WidthClass::W06);
        // These should still be defaults
        assert_eq!(config.drawing_timeout_secs.source, ConfigSource::Default);
        assert_eq!(config.scaffold_system.source, ConfigSource::Default);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("http://localhost:8000/").unwrap(), "http://localhost:8000");
        assert!(normalize_url("localhost:8000").is_err());
        assert!(normalize_url("ftp://example.ch").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("backend_url"));
        assert!(map.contains_key("cache_capacity"));
        assert!(map.contains_key("width_class"));

        let (ttl_value, ttl_source) = &map["cache_ttl_secs"];
        assert_eq!(ttl_value, "none");
        assert_eq!(*ttl_source, ConfigSource::Default);

        let (system, _) = &map["scaffold_system"];
        assert_eq!(system, "blitz70");
    }
}
