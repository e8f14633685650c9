//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use gateau_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Application section.
///
/// # Example
///
/// ```
/// use gateau_config::AppConfig;
///
/// let app = AppConfig::default();
/// assert_eq!(app.name, "gateau");
/// assert!(!app.debug);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application name, used in log output.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Debug mode. Error responses include internal messages and diagnostics.
    #[serde(default)]
    pub debug: bool,

    /// Extension assumed when the router did not provide one.
    #[serde(default)]
    pub default_extension: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            debug: false,
            default_extension: None,
        }
    }
}

fn default_app_name() -> String {
    "gateau".to_string()
}

/// Response emitter section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EmitterConfig {
    /// Maximum number of body bytes written per write call.
    #[serde(default = "default_max_buffer_length")]
    pub max_buffer_length: usize,

    /// Protocol written on the status line.
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_buffer_length: default_max_buffer_length(),
            protocol: default_protocol(),
        }
    }
}

fn default_max_buffer_length() -> usize {
    8192
}

fn default_protocol() -> String {
    "HTTP/1.1".to_string()
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in log events.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into a telemetry [`LogConfig`].
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            span_events: self.format == LogFormat::Pretty,
            file_line_info: self.include_location,
            include_target: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}
