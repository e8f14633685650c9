//! Error handling middleware.
//!
//! Converts any [`GateauError`] raised further down the queue into a JSON
//! error envelope with the status code of the error's category:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "MISSING_CONTROLLER",
//!     "message": "controller class Articles could not be found",
//!     "category": "not_found",
//!     "request_id": "0190..."
//!   }
//! }
//! ```
//!
//! Add it first so it wraps everything else.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};
use gateau_core::{GateauError, GateauResult};

/// Middleware that renders downstream errors as JSON responses.
#[derive(Debug, Clone, Default)]
pub struct ErrorHandlerMiddleware {
    /// Include internal messages and diagnostics in the envelope.
    expose_details: bool,
}

impl ErrorHandlerMiddleware {
    /// Creates an error handler that hides internal error details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether internal messages and diagnostics are exposed.
    ///
    /// Enable only in development.
    #[must_use]
    pub fn expose_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }

    /// Renders `error` as a JSON error response.
    pub fn render(&self, ctx: &MiddlewareContext, error: &GateauError) -> GateauResult<Response> {
        let request_id = ctx.request_id().to_string();
        let envelope = error.to_envelope(Some(&request_id), self.expose_details);

        match serde_json::to_value(&envelope) {
            Ok(body) => Response::json(error.status_code(), &body),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize error envelope");
                Response::error(error.status_code(), &envelope.error.message)
            }
        }
    }
}

impl Middleware for ErrorHandlerMiddleware {
    fn name(&self) -> &str {
        "error_handler"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, GateauResult<Response>> {
        Box::pin(async move {
            match next.run(ctx, request).await {
                Ok(response) => Ok(response),
                Err(error) => {
                    let status = error.status_code();
                    if status.is_server_error() {
                        tracing::error!(
                            request_id = %ctx.request_id(),
                            error = %error,
                            code = error.error_code(),
                            "request failed"
                        );
                    } else {
                        tracing::warn!(
                            request_id = %ctx.request_id(),
                            error = %error,
                            code = error.error_code(),
                            "request failed"
                        );
                    }
                    self.render(ctx, &error)
                }
            }
        })
    }
}
