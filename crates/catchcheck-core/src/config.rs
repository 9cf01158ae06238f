use crate::error::{CatchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the oracle API key
pub const ORACLE_API_KEY_ENV: &str = "CATCHCHECK_ORACLE_API_KEY";

/// Upper bound on ground search results; configuration may only lower it
pub const MAX_SEARCH_LIMIT: usize = 20;

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

/// Layered configuration for the submission engine
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub oracle_model: ConfigValue<String>,
    pub oracle_url: ConfigValue<String>,
    pub location_timeout_secs: ConfigValue<u64>,
    pub search_limit: ConfigValue<usize>,
    pub max_image_dimension: ConfigValue<u32>,
    pub jpeg_quality: ConfigValue<u8>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            oracle_model: ConfigValue::new(
                "gemini-3-flash-preview".to_string(),
                ConfigSource::Default,
            ),
            oracle_url: ConfigValue::new(
                "https://generativelanguage.googleapis.com".to_string(),
                ConfigSource::Default,
            ),
            location_timeout_secs: ConfigValue::new(20, ConfigSource::Default),
            search_limit: ConfigValue::new(MAX_SEARCH_LIMIT, ConfigSource::Default),
            max_image_dimension: ConfigValue::new(1024, ConfigSource::Default),
            jpeg_quality: ConfigValue::new(80, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| CatchError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| CatchError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(model) = file_config.oracle_model {
            self.oracle_model.update(model, ConfigSource::File);
        }

        if let Some(url) = file_config.oracle_url {
            self.oracle_url.update(url, ConfigSource::File);
        }

        if let Some(secs) = file_config.location_timeout_secs {
            self.location_timeout_secs.update(parse_timeout(secs)?, ConfigSource::File);
        }

        if let Some(limit) = file_config.search_limit {
            self.search_limit.update(parse_search_limit(limit)?, ConfigSource::File);
        }

        if let Some(dimension) = file_config.max_image_dimension {
            self.max_image_dimension.update(parse_dimension(dimension)?, ConfigSource::File);
        }

        if let Some(quality) = file_config.jpeg_quality {
            self.jpeg_quality.update(parse_quality(quality)?, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // CATCHCHECK_ORACLE_MODEL
        if let Ok(model) = env::var("CATCHCHECK_ORACLE_MODEL") {
            self.oracle_model.update(model, ConfigSource::Environment);
        }

        // CATCHCHECK_ORACLE_URL
        if let Ok(url) = env::var("CATCHCHECK_ORACLE_URL") {
            self.oracle_url.update(url, ConfigSource::Environment);
        }

        // CATCHCHECK_LOCATION_TIMEOUT_SECS
        if let Ok(raw) = env::var("CATCHCHECK_LOCATION_TIMEOUT_SECS") {
            match raw.parse::<u64>().ok().and_then(|v| parse_timeout(v).ok()) {
                Some(secs) => self.location_timeout_secs.update(secs, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid CATCHCHECK_LOCATION_TIMEOUT_SECS value '{}': \
                     expected seconds between 1 and 120",
                    raw
                ),
            }
        }

        // CATCHCHECK_SEARCH_LIMIT
        if let Ok(raw) = env::var("CATCHCHECK_SEARCH_LIMIT") {
            match raw.parse::<usize>().ok().and_then(|v| parse_search_limit(v).ok()) {
                Some(limit) => self.search_limit.update(limit, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid CATCHCHECK_SEARCH_LIMIT value '{}': expected 1 to {}",
                    raw,
                    MAX_SEARCH_LIMIT
                ),
            }
        }

        // CATCHCHECK_MAX_IMAGE_DIMENSION
        if let Ok(raw) = env::var("CATCHCHECK_MAX_IMAGE_DIMENSION") {
            match raw.parse::<u32>().ok().and_then(|v| parse_dimension(v).ok()) {
                Some(dimension) => {
                    self.max_image_dimension.update(dimension, ConfigSource::Environment)
                }
                None => tracing::warn!(
                    "Invalid CATCHCHECK_MAX_IMAGE_DIMENSION value '{}': \
                     expected pixels between 64 and 8192",
                    raw
                ),
            }
        }

        // CATCHCHECK_JPEG_QUALITY
        if let Ok(raw) = env::var("CATCHCHECK_JPEG_QUALITY") {
            match raw.parse::<u8>().ok().and_then(|v| parse_quality(v).ok()) {
                Some(quality) => self.jpeg_quality.update(quality, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid CATCHCHECK_JPEG_QUALITY value '{}': expected 1 to 100",
                    raw
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    ///
    /// Overrides are validated like file values; an invalid one leaves the
    /// configuration unchanged.
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) -> Result<()> {
        let timeout = overrides.location_timeout_secs.map(parse_timeout).transpose()?;
        let limit = overrides.search_limit.map(parse_search_limit).transpose()?;

        if let Some(model) = overrides.oracle_model {
            self.oracle_model.update(model, ConfigSource::Cli);
        }

        if let Some(url) = overrides.oracle_url {
            self.oracle_url.update(url, ConfigSource::Cli);
        }

        if let Some(secs) = timeout {
            self.location_timeout_secs.update(secs, ConfigSource::Cli);
        }

        if let Some(limit) = limit {
            self.search_limit.update(limit, ConfigSource::Cli);
        }

        Ok(())
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs.value)
    }

    /// Read the oracle API key from the environment
    pub fn oracle_api_key(&self) -> Result<String> {
        env::var(ORACLE_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CatchError::ConfigMissing { key: ORACLE_API_KEY_ENV.to_string() })
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "oracle_model".to_string(),
            (self.oracle_model.value.clone(), self.oracle_model.source),
        );

        map.insert(
            "oracle_url".to_string(),
            (self.oracle_url.value.clone(), self.oracle_url.source),
        );

        map.insert(
            "location_timeout".to_string(),
            (format!("{}s", self.location_timeout_secs.value), self.location_timeout_secs.source),
        );

        map.insert(
            "search_limit".to_string(),
            (self.search_limit.value.to_string(), self.search_limit.source),
        );

        map.insert(
            "max_image_dimension".to_string(),
            (format!("{}px", self.max_image_dimension.value), self.max_image_dimension.source),
        );

        map.insert(
            "jpeg_quality".to_string(),
            (self.jpeg_quality.value.to_string(), self.jpeg_quality.source),
        );

        map
    }
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    oracle_model: Option<String>,
    oracle_url: Option<String>,
    location_timeout_secs: Option<u64>,
    search_limit: Option<usize>,
    max_image_dimension: Option<u32>,
    jpeg_quality: Option<u8>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub oracle_model: Option<String>,
    pub oracle_url: Option<String>,
    pub location_timeout_secs: Option<u64>,
    pub search_limit: Option<usize>,
}

/// Validate a geolocation timeout in seconds
pub fn parse_timeout(secs: u64) -> Result<u64> {
    if (1..=120).contains(&secs) {
        Ok(secs)
    } else {
        Err(CatchError::ConfigInvalid {
            key: "location_timeout_secs".to_string(),
            reason: format!("{} is outside 1..=120 seconds", secs),
        })
    }
}

/// Validate the ground search result cap
pub fn parse_search_limit(limit: usize) -> Result<usize> {
    if (1..=MAX_SEARCH_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(CatchError::ConfigInvalid {
            key: "search_limit".to_string(),
            reason: format!("{} is outside 1..={}", limit, MAX_SEARCH_LIMIT),
        })
    }
}

/// Validate the longest allowed image side
pub fn parse_dimension(pixels: u32) -> Result<u32> {
    if (64..=8192).contains(&pixels) {
        Ok(pixels)
    } else {
        Err(CatchError::ConfigInvalid {
            key: "max_image_dimension".to_string(),
            reason: format!("{} is outside 64..=8192 pixels", pixels),
        })
    }
}

/// Validate a JPEG quality percentage
pub fn parse_quality(quality: u8) -> Result<u8> {
    if (1..=100).contains(&quality) {
        Ok(quality)
    } else {
        Err(CatchError::ConfigInvalid {
            key: "jpeg_quality".to_string(),
            reason: format!("{} is outside 1..=100", quality),
        })
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
        assert_eq!(config.oracle_model.value, "gemini-3-flash-preview");
        assert_eq!(config.oracle_model.source, ConfigSource::Default);
        assert_eq!(config.location_timeout(), Duration::from_secs(20));
        assert_eq!(config.search_limit.value, 20);
        assert_eq!(config.max_image_dimension.value, 1024);
        assert_eq!(config.jpeg_quality.value, 80);
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
oracle_model = "gemini-2.5-flash"
location_timeout_secs = 15
search_limit = 10
jpeg_quality = 70
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.oracle_model.value, "gemini-2.5-flash");
        assert_eq!(config.oracle_model.source, ConfigSource::File);
        assert_eq!(config.location_timeout_secs.value, 15);
        assert_eq!(config.search_limit.value, 10);
        assert_eq!(config.jpeg_quality.value, 70);
        assert_eq!(config.max_image_dimension.source, ConfigSource::Default);
    }

    #[test]
    fn test_load_from_file_rejects_out_of_range() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "jpeg_quality = 0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(
            result,
            Err(CatchError::ConfigInvalid { key, .. }) if key == "jpeg_quality"
        ));
    }

    #[test]
    fn test_load_from_file_rejects_search_limit_above_cap() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "search_limit = 50").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(
            result,
            Err(CatchError::ConfigInvalid { key, .. }) if key == "search_limit"
        ));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config
            .update_from_cli(CliConfigOverrides {
                location_timeout_secs: Some(5),
                search_limit: Some(8),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(config.location_timeout_secs.value, 5);
        assert_eq!(config.location_timeout_secs.source, ConfigSource::Cli);
        assert_eq!(config.search_limit.value, 8);
        assert_eq!(config.oracle_model.source, ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_are_validated() {
        let mut config = LayeredConfig::with_defaults();

        let result = config.update_from_cli(CliConfigOverrides {
            oracle_model: Some("gemini-2.5-flash".to_string()),
            location_timeout_secs: Some(0),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(CatchError::ConfigInvalid { key, .. }) if key == "location_timeout_secs"
        ));

        let result = config.update_from_cli(CliConfigOverrides {
            search_limit: Some(50),
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(CatchError::ConfigInvalid { key, .. }) if key == "search_limit"
        ));

        assert_eq!(config.location_timeout(), Duration::from_secs(20));
        assert_eq!(config.search_limit.value, MAX_SEARCH_LIMIT);
        assert_eq!(config.oracle_model.source, ConfigSource::Default);
    }

    #[test]
    fn test_validators() {
        assert!(parse_timeout(0).is_err());
        assert_eq!(parse_timeout(20).unwrap(), 20);
        assert!(parse_search_limit(0).is_err());
        assert_eq!(parse_search_limit(MAX_SEARCH_LIMIT).unwrap(), MAX_SEARCH_LIMIT);
        assert!(parse_search_limit(MAX_SEARCH_LIMIT + 1).is_err());
        assert!(parse_dimension(32).is_err());
        assert_eq!(parse_dimension(1024).unwrap(), 1024);
        assert!(parse_quality(101).is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("oracle_model"));
        assert!(map.contains_key("search_limit"));

        let (timeout, source) = &map["location_timeout"];
        assert_eq!(timeout, "20s");
        assert_eq!(*source, ConfigSource::Default);
    }
}
