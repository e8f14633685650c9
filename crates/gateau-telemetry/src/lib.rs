//! Structured logging for Gateau.
//!
//! Every Gateau crate logs through the `tracing` macros. This crate owns the
//! subscriber side: [`init_logging`] installs a `tracing-subscriber` registry
//! with an environment filter and either JSON or human-readable output.
//!
//! # Example
//!
//! ```rust,ignore
//! use gateau_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(controller = "Articles", "dispatching");
//! ```

#![doc(html_root_url = "https://docs.rs/gateau-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
