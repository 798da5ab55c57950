//! Run configuration
//!
//! Loaded from environment variables; command-line flags override individual
//! fields afterwards.
//!
//! - `WEBENTRY_DETECTORS`: comma-separated detector names, default all built-ins
//! - `WEBENTRY_MAX_RESOURCE_SIZE`: largest configuration file read, in bytes, default 8MB
//! - `WEBENTRY_STRICT_CHECK_FILES`: when true, a detector whose check files are
//!   all missing skips its source pass too, default "false"
//!
//! `WEBENTRY_LOG_LEVEL` and `WEBENTRY_LOG_JSON` belong to [`LoggingConfig`](crate::util::LoggingConfig).

use crate::detector::DetectorRegistry;
use crate::error::ContractError;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_MAX_RESOURCE_SIZE: u64 = 8 * 1024 * 1024;
const MAX_RESOURCE_SIZE_LIMIT: u64 = 256 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown detector '{0}'. Available: {1}")]
    UnknownDetector(String, String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebentryConfig {
    /// Detectors to run, in registry order; empty means all
    pub detectors: Vec<String>,

    pub max_resource_size: u64,

    pub strict_check_files: bool,
}

impl Default for WebentryConfig {
    fn default() -> Self {
        Self {
            detectors: Vec::new(),
            max_resource_size: DEFAULT_MAX_RESOURCE_SIZE,
            strict_check_files: false,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl WebentryConfig {
    /// Reads every `WEBENTRY_*` variable; unset ones keep their defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var("WEBENTRY_DETECTORS") {
            config.detectors = split_list(&value);
        }
        if let Ok(value) = env::var("WEBENTRY_MAX_RESOURCE_SIZE") {
            config.max_resource_size =
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::ParseError {
                        field: "WEBENTRY_MAX_RESOURCE_SIZE".to_string(),
                        error: e.to_string(),
                    })?;
        }
        if let Ok(value) = env::var("WEBENTRY_STRICT_CHECK_FILES") {
            config.strict_check_files =
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| ConfigError::ParseError {
                        field: "WEBENTRY_STRICT_CHECK_FILES".to_string(),
                        error: e.to_string(),
                    })?;
        }

        Ok(config)
    }

    pub fn with_detectors(mut self, detectors: &str) -> Self {
        self.detectors = split_list(detectors);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_resource_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max resource size must be at least 1 byte".to_string(),
            ));
        }
        if self.max_resource_size > MAX_RESOURCE_SIZE_LIMIT {
            return Err(ConfigError::ValidationFailed(
                "Max resource size cannot exceed 256MB".to_string(),
            ));
        }

        let available = DetectorRegistry::with_defaults();
        for name in &self.detectors {
            if available.get(name).is_none() {
                return Err(ConfigError::UnknownDetector(
                    name.clone(),
                    available.names().join(", "),
                ));
            }
        }

        Ok(())
    }

    /// The built-in registry restricted to the configured detectors
    pub fn registry(&self) -> Result<DetectorRegistry, ConfigError> {
        let defaults = DetectorRegistry::with_defaults();
        if self.detectors.is_empty() {
            return Ok(defaults);
        }
        defaults
            .select(self.detectors.as_slice())
            .map_err(|e| match e {
                ContractError::UnknownDetector(name) => {
                    ConfigError::UnknownDetector(name, defaults.names().join(", "))
                }
                other => ConfigError::ValidationFailed(other.to_string()),
            })
    }
}

impl fmt::Display for WebentryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Webentry Configuration:")?;
        if self.detectors.is_empty() {
            writeln!(f, "  Detectors: all")?;
        } else {
            writeln!(f, "  Detectors: {}", self.detectors.join(", "))?;
        }
        writeln!(f, "  Max Resource Size: {} bytes", self.max_resource_size)?;
        writeln!(f, "  Strict Check Files: {}", self.strict_check_files)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = WebentryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry().unwrap().len(), 2);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let _guards = vec![
            EnvGuard::set("WEBENTRY_DETECTORS", " struts , "),
            EnvGuard::set("WEBENTRY_MAX_RESOURCE_SIZE", "4096"),
            EnvGuard::set("WEBENTRY_STRICT_CHECK_FILES", "true"),
        ];

        let config = WebentryConfig::from_env().unwrap();

        assert_eq!(config.detectors, vec!["struts"]);
        assert_eq!(config.max_resource_size, 4096);
        assert!(config.strict_check_files);
        assert_eq!(config.registry().unwrap().names(), vec!["struts"]);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_numbers() {
        let _guard = EnvGuard::set("WEBENTRY_MAX_RESOURCE_SIZE", "lots");

        let err = WebentryConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { ref field, .. } if field == "WEBENTRY_MAX_RESOURCE_SIZE"));
    }

    #[test]
    #[serial]
    fn test_log_level_is_left_to_logging() {
        let _guard = EnvGuard::set("WEBENTRY_LOG_LEVEL", "loud");

        let config = WebentryConfig::from_env().unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let config = WebentryConfig {
            max_resource_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WebentryConfig::default().with_detectors("servlet,spring");
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::UnknownDetector("spring".to_string(), "servlet, struts".to_string())
        );
    }
}
