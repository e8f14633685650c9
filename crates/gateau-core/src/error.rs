//! Error types for Gateau.
//!
//! This module provides the [`GateauError`] type, the error that flows back
//! up the middleware chain whenever a unit, the dispatcher or a controller
//! fails.
//!
//! # Error Categories
//!
//! | `ErrorCategory` | Meaning | Status |
//! |---|---|---|
//! | `Configuration` | application wiring is wrong (unknown middleware, bad anchor) | 500 |
//! | `Logic` | a contract was violated by user code (action return, status range) | 500 |
//! | `NotFound` | routing resolved to a controller or action that does not exist | 404 |
//! | `Internal` | anything else, including I/O and HTTP builder failures | 500 |
//!
//! The core never recovers these locally. An error handling middleware
//! placed near the front of the queue is expected to turn them into
//! responses.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`GateauError`].
pub type GateauResult<T> = Result<T, GateauError>;

/// Categories of errors for classification and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Application wiring errors (middleware resolution, queue anchors, bootstrap).
    Configuration,
    /// Contract violations by user code.
    Logic,
    /// Missing controller or action.
    NotFound,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Configuration | Self::Logic | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Standard error type for Gateau.
///
/// # Example
///
/// ```
/// use gateau_core::{ErrorCategory, GateauError};
///
/// let err = GateauError::missing_controller("Articles", None, None, None);
/// assert_eq!(err.category(), ErrorCategory::NotFound);
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Error, Debug)]
pub enum GateauError {
    /// `insert_before` could not find its anchor in the queue.
    #[error("no middleware matching '{name}' was found in the queue")]
    MiddlewareAnchorNotFound {
        /// The anchor name that was searched for.
        name: String,
    },

    /// A middleware reference could not be resolved to an implementation.
    #[error("middleware '{name}' could not be resolved")]
    MiddlewareNotResolved {
        /// The logical name that failed to resolve.
        name: String,
    },

    /// A controller action returned something other than a response or nothing.
    #[error("controller actions can only return a response or nothing, {controller}::{action} returned {found}")]
    InvalidActionReturn {
        /// Controller name.
        controller: String,
        /// Action name.
        action: String,
        /// Description of the returned value.
        found: String,
    },

    /// A response status outside of [100, 599] was requested.
    #[error("invalid status code {code}, must be between 100 and 599")]
    InvalidStatus {
        /// The rejected code.
        code: u16,
    },

    /// The routed controller class does not exist.
    #[error("controller class {class} could not be found")]
    MissingController {
        /// The routed controller name.
        class: String,
        /// Routed plugin, if any.
        plugin: Option<String>,
        /// Routed prefix, if any.
        prefix: Option<String>,
        /// Routed extension, if any.
        extension: Option<String>,
    },

    /// The routed action does not exist on the controller.
    #[error("action {controller}::{action}() could not be found")]
    MissingAction {
        /// Controller name.
        controller: String,
        /// Action name.
        action: String,
    },

    /// Application or plugin bootstrap failed.
    #[error("bootstrap failed: {message}")]
    Bootstrap {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Building an HTTP value failed.
    #[error("http error: {0}")]
    Http(#[from] http::Error),

    /// I/O failure while emitting a response.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GateauError {
    /// Creates an anchor-not-found error.
    #[must_use]
    pub fn anchor_not_found(name: impl Into<String>) -> Self {
        Self::MiddlewareAnchorNotFound { name: name.into() }
    }

    /// Creates an unresolved middleware error.
    #[must_use]
    pub fn not_resolved(name: impl Into<String>) -> Self {
        Self::MiddlewareNotResolved { name: name.into() }
    }

    /// Creates a missing controller error carrying the routing diagnostics.
    #[must_use]
    pub fn missing_controller(
        class: impl Into<String>,
        plugin: Option<String>,
        prefix: Option<String>,
        extension: Option<String>,
    ) -> Self {
        Self::MissingController {
            class: class.into(),
            plugin,
            prefix,
            extension,
        }
    }

    /// Creates a missing action error.
    #[must_use]
    pub fn missing_action(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self::MissingAction {
            controller: controller.into(),
            action: action.into(),
        }
    }

    /// Creates a bootstrap error.
    #[must_use]
    pub fn bootstrap(message: impl Into<String>) -> Self {
        Self::Bootstrap {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MiddlewareAnchorNotFound { .. }
            | Self::MiddlewareNotResolved { .. }
            | Self::Bootstrap { .. } => ErrorCategory::Configuration,
            Self::InvalidActionReturn { .. } | Self::InvalidStatus { .. } => ErrorCategory::Logic,
            Self::MissingController { .. } | Self::MissingAction { .. } => ErrorCategory::NotFound,
            Self::Internal { .. } | Self::Http(_) | Self::Io(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MiddlewareAnchorNotFound { .. } => "MIDDLEWARE_ANCHOR_NOT_FOUND",
            Self::MiddlewareNotResolved { .. } => "MIDDLEWARE_NOT_RESOLVED",
            Self::InvalidActionReturn { .. } => "INVALID_ACTION_RETURN",
            Self::InvalidStatus { .. } => "INVALID_STATUS",
            Self::MissingController { .. } => "MISSING_CONTROLLER",
            Self::MissingAction { .. } => "MISSING_ACTION",
            Self::Bootstrap { .. } => "BOOTSTRAP_ERROR",
            Self::Internal { .. } | Self::Http(_) | Self::Io(_) => "INTERNAL_ERROR",
        }
    }

    /// Converts this error to a serializable error envelope.
    ///
    /// When `expose_details` is false, errors outside the `NotFound` category
    /// are reported with a generic message.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>, expose_details: bool) -> ErrorEnvelope {
        let message = if expose_details || self.category() == ErrorCategory::NotFound {
            self.to_string()
        } else {
            "An internal error occurred".to_string()
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
                category: self.category(),
                details: if expose_details { self.error_details() } else { None },
                request_id: request_id.map(ToString::to_string),
            },
        }
    }

    /// Returns additional diagnostic details for the envelope.
    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::MissingController {
                class,
                plugin,
                prefix,
                extension,
            } => Some(serde_json::json!({
                "class": class,
                "plugin": plugin,
                "prefix": prefix,
                "extension": extension,
            })),
            Self::MissingAction { controller, action }
            | Self::InvalidActionReturn {
                controller, action, ..
            } => Some(serde_json::json!({
                "controller": controller,
                "action": action,
            })),
            _ => None,
        }
    }
}

/// Serializable error envelope for JSON error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error details within the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional diagnostics (debug mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            GateauError::anchor_not_found("Auth").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            GateauError::not_resolved("Nope").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            GateauError::InvalidStatus { code: 600 }.category(),
            ErrorCategory::Logic
        );
        assert_eq!(
            GateauError::missing_action("Posts", "edit").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(GateauError::internal("boom").category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_missing_controller_is_404() {
        let err = GateauError::missing_controller(
            "Admin/Articles",
            None,
            Some("Admin".to_string()),
            Some("json".to_string()),
        );
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "controller class Admin/Articles could not be found");
    }

    #[test]
    fn test_logic_errors_are_500() {
        let err = GateauError::InvalidActionReturn {
            controller: "Posts".to_string(),
            action: "index".to_string(),
            found: "a string".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "INVALID_ACTION_RETURN");
    }

    #[test]
    fn test_envelope_hides_internal_details() {
        let err = GateauError::internal_with_source("db down", anyhow::anyhow!("timeout"));
        let envelope = err.to_envelope(Some("req-1"), false);

        assert_eq!(envelope.error.code, "INTERNAL_ERROR");
        assert_eq!(envelope.error.message, "An internal error occurred");
        assert!(envelope.error.details.is_none());
        assert_eq!(envelope.error.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_envelope_exposes_details_in_debug() {
        let err = GateauError::missing_controller("Posts", Some("Blog".to_string()), None, None);
        let envelope = err.to_envelope(None, true);

        let details = envelope.error.details.expect("details present");
        assert_eq!(details["class"], "Posts");
        assert_eq!(details["plugin"], "Blog");
        assert!(envelope.error.request_id.is_none());
    }

    #[test]
    fn test_envelope_serialization() {
        let err = GateauError::missing_action("Posts", "view");
        let json = serde_json::to_value(err.to_envelope(Some("abc"), false)).unwrap();

        assert_eq!(json["error"]["code"], "MISSING_ACTION");
        assert_eq!(json["error"]["category"], "not_found");
        assert_eq!(json["error"]["request_id"], "abc");
        assert!(json["error"].get("details").is_none());
    }
}
