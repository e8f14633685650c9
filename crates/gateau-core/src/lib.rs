//! # Gateau Core
//!
//! Core types shared by every Gateau crate:
//!
//! - [`Request`] / [`Response`] - buffered `http` messages
//! - [`RouteParams`] - router output attached to a request
//! - [`ResponseExt`] - response builders and status invariants
//! - [`RequestId`] / [`RouteContext`] - request-scoped identity and routing context
//! - [`GateauError`] - the error taxonomy of the dispatch pipeline

#![doc(html_root_url = "https://docs.rs/gateau-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod request;
mod response;
mod types;

pub use context::{RequestId, RouteContext};
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, GateauError, GateauResult};
pub use request::{RequestExt, RouteParams};
pub use response::{ResponseExt, MAX_STATUS, MIN_STATUS};
pub use types::{build_request, read_body, Request, Response};
