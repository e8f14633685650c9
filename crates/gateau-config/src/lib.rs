//! Typed configuration system for Gateau.
//!
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict parsing (unknown fields are rejected)
//! - Layered loading (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [app]
//! name = "blog"
//! debug = false
//! default_extension = "html"
//!
//! [emitter]
//! max_buffer_length = 8192
//! protocol = "HTTP/1.1"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables, e.g.
//! `GATEAU__APP__DEBUG=true` or `GATEAU__LOGGING__LEVEL=debug`.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{GateauConfig, GateauConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{AppConfig, EmitterConfig, LogFormat, LoggingConfig};
