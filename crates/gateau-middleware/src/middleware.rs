//! Core middleware traits and the continuation handed to each middleware.
//!
//! A [`Middleware`] receives the request context, the request and a [`Next`]
//! continuation. Calling [`Next::run`] hands the request to the following
//! queue entry, or to the fallback [`RequestHandler`] once the queue is
//! exhausted. Not calling it short-circuits the rest of the queue.
//!
//! # Example
//!
//! ```
//! use gateau_middleware::{BoxFuture, Middleware, Next, Request, Response};
//! use gateau_middleware::context::MiddlewareContext;
//! use gateau_core::GateauResult;
//! use http::header::{HeaderValue, SERVER};
//!
//! struct ServerHeader;
//!
//! impl Middleware for ServerHeader {
//!     fn name(&self) -> &str {
//!         "server_header"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, GateauResult<Response>> {
//!         Box::pin(async move {
//!             let mut response = next.run(ctx, request).await?;
//!             response.headers_mut().insert(SERVER, HeaderValue::from_static("gateau"));
//!             Ok(response)
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::queue::{MiddlewareQueue, QueueCursor};
use crate::types::{Request, Response};
use gateau_core::{GateauResult, ResponseExt};
use http::StatusCode;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Body of the response synthesized when the queue runs dry without a fallback.
pub const EXHAUSTED_QUEUE_MESSAGE: &str = "Middleware queue was exhausted without returning a response";

/// The core middleware trait.
///
/// # Invariants
///
/// - A middleware calls `next.run()` at most once; `Next` is consumed to
///   enforce this.
/// - A middleware that does not call `next.run()` must return its own
///   response, and nothing after it in the queue runs.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware.
    ///
    /// Used for logging and for the anchors of
    /// [`MiddlewareQueue::insert_before`] and
    /// [`MiddlewareQueue::insert_after`].
    fn name(&self) -> &str;

    /// Processes the request, optionally delegating to `next`.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, GateauResult<Response>>;
}

/// Something that turns a request into a response.
///
/// Used as the fallback at the end of a middleware queue.
pub trait RequestHandler: Send + Sync {
    /// Handles the request.
    fn handle<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, GateauResult<Response>>;
}

/// Continuation to the rest of the middleware queue.
///
/// Each `Next` carries its own cursor, so concurrent or nested runs over the
/// same queue never share a position. Running it consumes it.
pub struct Next<'a> {
    cursor: QueueCursor<'a>,
    fallback: Option<&'a dyn RequestHandler>,
}

impl<'a> Next<'a> {
    /// Creates a continuation positioned at the start of `queue`.
    pub(crate) fn new(queue: &'a MiddlewareQueue, fallback: Option<&'a dyn RequestHandler>) -> Self {
        Self {
            cursor: queue.cursor(),
            fallback,
        }
    }

    /// Returns the queue position this continuation will invoke.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Returns true if a fallback handler is attached.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Invokes the middleware at the current position, or the fallback
    /// handler once the queue is exhausted.
    ///
    /// Without a fallback, an exhausted queue produces a 500 response.
    /// Resolution failures of named middleware are returned as errors.
    pub async fn run(mut self, ctx: &mut MiddlewareContext, request: Request) -> GateauResult<Response> {
        let position = self.cursor.position();

        if let Some(middleware) = self.cursor.current()? {
            self.cursor.advance();
            tracing::trace!(
                request_id = %ctx.request_id(),
                middleware = middleware.name(),
                position,
                "invoking middleware"
            );
            return middleware.process(ctx, request, self).await;
        }

        match self.fallback {
            Some(handler) => {
                tracing::trace!(
                    request_id = %ctx.request_id(),
                    position,
                    "middleware queue exhausted, invoking fallback handler"
                );
                handler.handle(ctx, request).await
            }
            None => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    position,
                    "middleware queue exhausted with no fallback handler"
                );
                Response::error(StatusCode::INTERNAL_SERVER_ERROR, EXHAUSTED_QUEUE_MESSAGE)
            }
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("position", &self.cursor.position())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

type ClosureFn = dyn for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, GateauResult<Response>>
    + Send
    + Sync;

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use gateau_middleware::ClosureMiddleware;
///
/// let timing = ClosureMiddleware::new("timing", |ctx, request, next| {
///     Box::pin(async move {
///         let response = next.run(ctx, request).await;
///         tracing::debug!(elapsed_ms = ctx.elapsed().as_millis() as u64, "done");
///         response
///     })
/// });
/// ```
#[derive(Clone)]
pub struct ClosureMiddleware {
    name: String,
    func: Arc<ClosureFn>,
}

impl ClosureMiddleware {
    /// Creates a closure middleware.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, GateauResult<Response>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl Middleware for ClosureMiddleware {
    fn name(&self) -> &str {
        &self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, GateauResult<Response>> {
        (self.func)(ctx, request, next)
    }
}

impl std::fmt::Debug for ClosureMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type DoublePassFn = dyn for<'a> Fn(
        &'a mut MiddlewareContext,
        Request,
        Response,
        Next<'a>,
    ) -> BoxFuture<'a, GateauResult<Response>>
    + Send
    + Sync;

/// A middleware in the legacy request/response style.
///
/// The closure receives a seed response (status 200, empty body) in addition
/// to the request. It may return the seed, typically after adjusting it, or
/// delegate to `next`, which ignores the seed.
#[derive(Clone)]
pub struct DoublePassMiddleware {
    name: String,
    func: Arc<DoublePassFn>,
}

impl DoublePassMiddleware {
    /// Creates a double-pass middleware.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a mut MiddlewareContext, Request, Response, Next<'a>) -> BoxFuture<'a, GateauResult<Response>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl Middleware for DoublePassMiddleware {
    fn name(&self) -> &str {
        &self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, GateauResult<Response>> {
        (self.func)(ctx, request, Response::empty(), next)
    }
}

impl std::fmt::Debug for DoublePassMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoublePassMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type HandlerFn =
    dyn for<'a> Fn(&'a mut MiddlewareContext, Request) -> BoxFuture<'a, GateauResult<Response>> + Send + Sync;

/// A [`RequestHandler`] built from a closure.
#[derive(Clone)]
pub struct FnHandler {
    func: Arc<HandlerFn>,
}

impl FnHandler {
    /// Creates a closure handler.
    pub fn new<F>(func: F) -> Self
    where
        F: for<'a> Fn(&'a mut MiddlewareContext, Request) -> BoxFuture<'a, GateauResult<Response>>
            + Send
            + Sync
            + 'static,
    {
        Self { func: Arc::new(func) }
    }
}

impl RequestHandler for FnHandler {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, GateauResult<Response>> {
        (self.func)(ctx, request)
    }
}

impl std::fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateau_core::{build_request, read_body};

    struct Tagging {
        name: &'static str,
    }

    impl Middleware for Tagging {
        fn name(&self) -> &str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, GateauResult<Response>> {
            Box::pin(async move {
                ctx.set_extension(format!("visited:{}", self.name));
                next.run(ctx, request).await
            })
        }
    }

    fn ok_handler() -> FnHandler {
        FnHandler::new(|_ctx, _request| {
            Box::pin(async { Response::text(StatusCode::OK, "OK") })
        })
    }

    #[tokio::test]
    async fn test_next_invokes_fallback_on_empty_queue() {
        let queue = MiddlewareQueue::new();
        let handler = ok_handler();
        let mut ctx = MiddlewareContext::new();

        let next = Next::new(&queue, Some(&handler));
        let response = next.run(&mut ctx, build_request("GET", "/").unwrap()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_body(response.into_body()).await, "OK");
    }

    #[tokio::test]
    async fn test_next_without_fallback_synthesizes_500() {
        let queue = MiddlewareQueue::new();
        let mut ctx = MiddlewareContext::new();

        let next = Next::new(&queue, None);
        assert!(!next.has_fallback());

        let response = next.run(&mut ctx, build_request("GET", "/").unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_body(response.into_body()).await, EXHAUSTED_QUEUE_MESSAGE);
    }

    #[tokio::test]
    async fn test_next_runs_middleware_in_order() {
        let mut queue = MiddlewareQueue::new();
        queue.add(Arc::new(Tagging { name: "first" }) as Arc<dyn Middleware>);

        let handler = ok_handler();
        let mut ctx = MiddlewareContext::new();
        let next = Next::new(&queue, Some(&handler));
        assert_eq!(next.position(), 0);

        let response = next.run(&mut ctx, build_request("GET", "/").unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<String>().map(String::as_str),
            Some("visited:first")
        );
    }

    #[tokio::test]
    async fn test_double_pass_receives_seed_response() {
        let mw = DoublePassMiddleware::new("legacy", |_ctx, _request, response, _next| {
            Box::pin(async move {
                assert_eq!(response.status(), StatusCode::OK);
                Ok(response.with_body("seeded"))
            })
        });
        assert_eq!(mw.name(), "legacy");

        let queue = MiddlewareQueue::new();
        let mut ctx = MiddlewareContext::new();
        let response = mw
            .process(&mut ctx, build_request("GET", "/").unwrap(), Next::new(&queue, None))
            .await
            .unwrap();

        assert_eq!(read_body(response.into_body()).await, "seeded");
    }
}
