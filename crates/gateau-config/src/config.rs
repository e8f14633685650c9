//! Main configuration types.
//!
//! This module provides the top-level [`GateauConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{AppConfig, ConfigError, EmitterConfig, LogFormat, LoggingConfig};

/// Complete Gateau application configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use gateau_config::GateauConfig;
///
/// let config = GateauConfig::default();
/// assert_eq!(config.emitter.max_buffer_length, 8192);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct GateauConfig {
    /// Application configuration.
    #[serde(default)]
    pub app: AppConfig,

    /// Response emitter configuration.
    #[serde(default)]
    pub emitter: EmitterConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GateauConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> GateauConfigBuilder {
        GateauConfigBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("app.name", "must not be empty"));
        }

        if self.emitter.max_buffer_length == 0 {
            return Err(ConfigError::invalid_value(
                "emitter.max_buffer_length",
                "must be greater than zero",
            ));
        }

        if !self.emitter.protocol.starts_with("HTTP/") {
            return Err(ConfigError::invalid_value(
                "emitter.protocol",
                format!("expected an HTTP protocol, got {}", self.emitter.protocol),
            ));
        }

        if let Err(e) = gateau_telemetry::create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }

    /// Development preset: debug mode, pretty debug-level logs.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.app.debug = true;
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config
    }

    /// Production preset: JSON info-level logs, internal errors hidden.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.app.debug = false;
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }
}

/// Builder for [`GateauConfig`].
#[derive(Debug, Default)]
pub struct GateauConfigBuilder {
    app: Option<AppConfig>,
    emitter: Option<EmitterConfig>,
    logging: Option<LoggingConfig>,
}

impl GateauConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application section.
    #[must_use]
    pub fn app(mut self, app: AppConfig) -> Self {
        self.app = Some(app);
        self
    }

    /// Set the emitter section.
    #[must_use]
    pub fn emitter(mut self, emitter: EmitterConfig) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> GateauConfig {
        GateauConfig {
            app: self.app.unwrap_or_default(),
            emitter: self.emitter.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GateauConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = GateauConfig::development();
        assert!(dev.app.debug);
        assert_eq!(dev.logging.format, LogFormat::Pretty);

        let prod = GateauConfig::production();
        assert!(!prod.app.debug);
        assert_eq!(prod.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let config = GateauConfig::builder()
            .emitter(EmitterConfig {
                max_buffer_length: 0,
                ..EmitterConfig::default()
            })
            .build();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "emitter.max_buffer_length"
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = GateauConfig::builder()
            .app(AppConfig {
                name: "  ".to_string(),
                ..AppConfig::default()
            })
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut config = GateauConfig::default();
        config.logging.level = "gateau=shouting".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "logging.level"
        ));
    }

    #[test]
    fn test_bad_protocol_rejected() {
        let mut config = GateauConfig::default();
        config.emitter.protocol = "SPDY/3".to_string();
        assert!(config.validate().is_err());
    }
}
