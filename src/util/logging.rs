//! Logging setup on top of `tracing-subscriber`
//!
//! Log lines go to stderr so that a driver written to stdout stays clean.
//! `RUST_LOG` directives are honoured in addition to the configured level.
//!
//! ```no_run
//! use webentry::util::logging;
//!
//! // WEBENTRY_LOG_LEVEL=debug WEBENTRY_LOG_JSON=true
//! logging::init_from_env();
//! tracing::info!("ready");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

pub const LOG_LEVEL_VAR: &str = "WEBENTRY_LOG_LEVEL";
pub const LOG_JSON_VAR: &str = "WEBENTRY_LOG_JSON";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's own events
    pub level: Level,

    /// One JSON object per line instead of human-readable text
    pub use_json: bool,

    pub include_target: bool,

    /// Include file and line of the event
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Reads `WEBENTRY_LOG_LEVEL` and `WEBENTRY_LOG_JSON`, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let level = env::var(LOG_LEVEL_VAR)
            .ok()
            .and_then(|v| parse_level(&v))
            .unwrap_or(defaults.level);
        let use_json = env::var(LOG_JSON_VAR)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.use_json);

        Self {
            level,
            use_json,
            include_target: use_json,
            ..defaults
        }
    }

    /// The filter this configuration installs
    pub fn filter(&self) -> EnvFilter {
        let filter = EnvFilter::from_default_env();
        match format!("webentry={}", self.level).parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    }
}

/// Parses `trace`..`error` case-insensitively
pub fn parse_level(level: &str) -> Option<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Installs the global subscriber; later calls are no-ops
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.filter();

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_level(" Debug "), Some(Level::DEBUG));
        assert_eq!(parse_level("WARNING"), Some(Level::WARN));
        assert_eq!(parse_level("verbose"), None);
        assert_eq!(parse_level(""), None);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::WARN);
        assert!(!config.use_json);
        assert!(!config.include_location);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(LOG_LEVEL_VAR, "debug");
        env::set_var(LOG_JSON_VAR, "true");
        let config = LoggingConfig::from_env();
        env::remove_var(LOG_LEVEL_VAR);
        env::remove_var(LOG_JSON_VAR);

        assert_eq!(config.level, Level::DEBUG);
        assert!(config.use_json);
        assert!(config.include_target);
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_invalid_values() {
        env::set_var(LOG_LEVEL_VAR, "loud");
        env::set_var(LOG_JSON_VAR, "maybe");
        let config = LoggingConfig::from_env();
        env::remove_var(LOG_LEVEL_VAR);
        env::remove_var(LOG_JSON_VAR);

        assert_eq!(config.level, Level::WARN);
        assert!(!config.use_json);
    }
}
