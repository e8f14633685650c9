//! Request ID middleware.
//!
//! Generates (or, when trusted, accepts) a request ID, stores it on the
//! [`MiddlewareContext`] and echoes it in the `X-Request-ID` response header.
//! Generated IDs are UUID v7, so they sort by creation time.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use gateau_core::{GateauResult, RequestId};
use http::HeaderValue;
use uuid::Uuid;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or extracts request IDs.
///
/// Place it at the front of the queue so every later entry logs with the
/// final ID.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to accept a well-formed incoming `X-Request-ID` header.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always generates a new ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that reuses valid incoming `X-Request-ID` headers.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn extract_request_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &str {
        "request_id"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, GateauResult<Response>> {
        Box::pin(async move {
            let request_id = self
                .extract_request_id(&request)
                .unwrap_or_else(RequestId::new);
            ctx.set_request_id(request_id);

            let mut response = next.run(ctx, request).await?;

            let value = HeaderValue::from_str(&request_id.to_string()).map_err(http::Error::from)?;
            response.headers_mut().insert(REQUEST_ID_HEADER, value);

            Ok(response)
        })
    }
}
