//! Response construction helpers and status invariants.
//!
//! Every status a response receives goes through [`ResponseExt::with_status`],
//! constructors included, and is checked against the [100, 599] range.
//! Switching to `204 No Content` or `304 Not Modified` drops any body
//! describing headers.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http::StatusCode;
use http_body_util::Full;

use crate::error::{GateauError, GateauResult};
use crate::types::Response;

/// Lowest status code a response may carry.
pub const MIN_STATUS: u16 = 100;

/// Highest status code a response may carry.
pub const MAX_STATUS: u16 = 599;

/// Extension trait for building and adjusting responses.
pub trait ResponseExt: Sized {
    /// Creates the seed response: status 200, no headers, empty body.
    fn empty() -> Self;

    /// Creates a `text/plain` response.
    ///
    /// Fails with [`GateauError::InvalidStatus`] outside of [100, 599].
    fn text(status: StatusCode, body: impl Into<Bytes>) -> GateauResult<Self>;

    /// Creates an `application/json` response from a JSON value.
    fn json(status: StatusCode, value: &serde_json::Value) -> GateauResult<Self>;

    /// Creates a plain-text error response.
    fn error(status: StatusCode, message: &str) -> GateauResult<Self>;

    /// Creates a redirect response with a `Location` header.
    fn redirect(location: &str, status: u16) -> GateauResult<Self>;

    /// Returns this response with a new status code.
    ///
    /// Fails with [`GateauError::InvalidStatus`] outside of [100, 599].
    fn with_status(self, code: u16) -> GateauResult<Self>;

    /// Returns this response with its body replaced.
    fn with_body(self, body: impl Into<Bytes>) -> Self;
}

impl ResponseExt for Response {
    fn empty() -> Self {
        http::Response::new(Full::new(Bytes::new()))
    }

    fn text(status: StatusCode, body: impl Into<Bytes>) -> GateauResult<Self> {
        let mut response = Self::empty().with_body(body);
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response.with_status(status.as_u16())
    }

    fn json(status: StatusCode, value: &serde_json::Value) -> GateauResult<Self> {
        let mut response = Self::empty().with_body(value.to_string());
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response.with_status(status.as_u16())
    }

    fn error(status: StatusCode, message: &str) -> GateauResult<Self> {
        Self::text(status, message.to_string())
    }

    fn redirect(location: &str, status: u16) -> GateauResult<Self> {
        let value = HeaderValue::from_str(location).map_err(http::Error::from)?;
        let mut response = Self::empty().with_status(status)?;
        response.headers_mut().insert(LOCATION, value);
        Ok(response)
    }

    fn with_status(mut self, code: u16) -> GateauResult<Self> {
        if !(MIN_STATUS..=MAX_STATUS).contains(&code) {
            return Err(GateauError::InvalidStatus { code });
        }
        let status = StatusCode::from_u16(code).map_err(|_| GateauError::InvalidStatus { code })?;
        *self.status_mut() = status;

        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
            let headers = self.headers_mut();
            headers.remove(CONTENT_TYPE);
            headers.remove(CONTENT_LENGTH);
        }

        Ok(self)
    }

    fn with_body(self, body: impl Into<Bytes>) -> Self {
        let (parts, _) = self.into_parts();
        http::Response::from_parts(parts, Full::new(body.into()))
    }
}
