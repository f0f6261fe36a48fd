use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".metaarmy";

/// Environment variable prefix; `__` separates nested keys
pub const ENV_PREFIX: &str = "METAARMY_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid timeout for {0}: must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("{0} cannot be empty")]
    EmptyValue(&'static str),

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Protocol address book contains an empty protocol name")]
    EmptyProtocolName,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .metaarmy/config.yaml (project config)
    /// 3. .metaarmy/local.yaml (local overrides, optional)
    /// 4. Environment variables (METAARMY_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same hierarchy rooted at an arbitrary directory.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // AI bridge
        if config.ai.model.trim().is_empty() {
            return Err(ConfigError::EmptyValue("ai.model"));
        }
        Self::check_url("ai.base_url", &config.ai.base_url)?;
        if config.ai.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("ai"));
        }

        // Explorer
        Self::check_url("explorer.base_url", &config.explorer.base_url)?;
        if let Some(fallback) = &config.explorer.fallback_url {
            Self::check_url("explorer.fallback_url", fallback)?;
        }
        if config.explorer.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("explorer"));
        }
        if config.explorer.requests_per_second <= 0.0 {
            return Err(ConfigError::InvalidRateLimit(
                config.explorer.requests_per_second,
            ));
        }

        // Indexer
        Self::check_url("indexer.endpoint", &config.indexer.endpoint)?;
        if config.indexer.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("indexer"));
        }

        if config.contracts.protocols.keys().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::EmptyProtocolName);
        }

        if config.storage.path.trim().is_empty() {
            return Err(ConfigError::EmptyValue("storage.path"));
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }

    fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::EmptyValue(field));
        }
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                field,
                value: value.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::TargetPolicy;
    use std::fs;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.ai.enabled);
        assert_eq!(config.ai.timeout_secs, 30);
        assert!((config.explorer.requests_per_second - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.storage.path, ".metaarmy/storage.json");
        assert_eq!(config.assembly.target_policy, TargetPolicy::Strict);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
ai:
  enabled: false
  model: gemini-pro
explorer:
  base_url: https://api.etherscan.io/api
  fallback_url: null
  requests_per_second: 2.5
contracts:
  protocols:
    yearn: '0x1111111111111111111111111111111111111111'
assembly:
  target_policy: zero_address
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert!(!config.ai.enabled);
        assert_eq!(config.ai.model, "gemini-pro");
        assert!(config.explorer.fallback_url.is_none());
        assert!((config.explorer.requests_per_second - 2.5).abs() < f64::EPSILON);
        assert!(config.contracts.protocol_address("Yearn").is_some());
        assert_eq!(config.assembly.target_policy, TargetPolicy::ZeroAddress);
        assert_eq!(config.logging.level, "debug");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_invalid_address_rejected_at_parse() {
        let yaml = "contracts:\n  protocols:\n    aave: not-an-address\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(_)
        ));
    }

    #[test]
    fn test_validate_zero_rate_limit() {
        let mut config = Config::default();
        config.explorer.requests_per_second = 0.0;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRateLimit(_)
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.indexer.timeout_secs = 0;

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidTimeout("indexer")
        ));
    }

    #[test]
    fn test_validate_bad_urls() {
        let mut config = Config::default();
        config.indexer.endpoint = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyValue("indexer.endpoint")
        ));

        let mut config = Config::default();
        config.explorer.fallback_url = Some("ftp://example.com".to_string());
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidUrl { .. }
        ));
    }

    #[test]
    fn test_validate_empty_storage_path() {
        let mut config = Config::default();
        config.storage.path = "  ".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyValue("storage.path")
        ));
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "ai:\n  timeout_secs: 10\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "ai:\n  timeout_secs: 5\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.ai.timeout_secs, 5, "Override should win");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
        assert_eq!(config.ai.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_env_overrides_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "logging:\n  level: info\nindexer:\n  timeout_secs: 9\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.yaml"), "indexer:\n  timeout_secs: 7\n").unwrap();

        temp_env::with_vars(
            [
                ("METAARMY_LOGGING__LEVEL", Some("debug")),
                ("METAARMY_EXPLORER__API_KEY", Some("explorer-key")),
            ],
            || {
                let config = ConfigLoader::load_from_dir(dir.path()).unwrap();
                assert_eq!(config.logging.level, "debug");
                assert_eq!(config.indexer.timeout_secs, 7);
                assert_eq!(config.explorer.api_key.as_deref(), Some("explorer-key"));
            },
        );
    }

    #[test]
    fn test_load_from_missing_dir_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_from_dir(dir.path().join("absent")).unwrap();
        assert_eq!(config.indexer.endpoint, "http://localhost:8080/v1/graphql");
    }
}
