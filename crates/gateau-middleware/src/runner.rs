//! Executes a middleware queue for one request.

use crate::context::MiddlewareContext;
use crate::middleware::{Next, RequestHandler};
use crate::queue::MiddlewareQueue;
use crate::types::{Request, Response};
use gateau_core::GateauResult;

/// Drives a request through a [`MiddlewareQueue`].
///
/// Every call to [`run`](Self::run) starts a fresh cursor at the first entry,
/// so a runner can be reused for any number of requests, including nested
/// runs started from inside a middleware.
///
/// # Example
///
/// ```
/// use gateau_middleware::{FnHandler, MiddlewareQueue, Runner, Response};
/// use gateau_middleware::context::MiddlewareContext;
/// use gateau_core::{build_request, ResponseExt};
/// use http::StatusCode;
///
/// # tokio_test_block_on(async {
/// let queue = MiddlewareQueue::new();
/// let app = FnHandler::new(|_ctx, _req| Box::pin(async { Response::text(StatusCode::OK, "hi") }));
///
/// let mut ctx = MiddlewareContext::new();
/// let request = build_request("GET", "/").unwrap();
/// let response = Runner::new().run(&queue, &mut ctx, request, Some(&app)).await.unwrap();
/// assert_eq!(response.status(), StatusCode::OK);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Runner;

impl Runner {
    /// Creates a runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs `request` through `queue`.
    ///
    /// When the queue is exhausted the request is handed to `fallback`;
    /// without one, a 500 response is returned.
    pub async fn run(
        &self,
        queue: &MiddlewareQueue,
        ctx: &mut MiddlewareContext,
        request: Request,
        fallback: Option<&dyn RequestHandler>,
    ) -> GateauResult<Response> {
        tracing::debug!(
            request_id = %ctx.request_id(),
            method = %request.method(),
            path = request.uri().path(),
            middleware_count = queue.len(),
            "running middleware queue"
        );

        Next::new(queue, fallback).run(ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnHandler;
    use crate::queue::MiddlewareUnit;
    use gateau_core::{build_request, read_body, ResponseExt};
    use http::StatusCode;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recording(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> MiddlewareUnit {
        let log = Arc::clone(log);
        MiddlewareUnit::closure(name, move |ctx, request, next| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().push(format!("{name}:in"));
                let response = next.run(ctx, request).await;
                log.lock().push(format!("{name}:out"));
                response
            })
        })
    }

    fn app(log: &Arc<Mutex<Vec<String>>>) -> FnHandler {
        let log = Arc::clone(log);
        FnHandler::new(move |_ctx, _request| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().push("app".to_string());
                Response::text(StatusCode::OK, "app")
            })
        })
    }

    #[tokio::test]
    async fn test_onion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut queue = MiddlewareQueue::new();
        queue.add(recording("m0", &log)).add(recording("m1", &log));
        let handler = app(&log);

        let mut ctx = MiddlewareContext::new();
        let response = Runner::new()
            .run(&queue, &mut ctx, build_request("GET", "/").unwrap(), Some(&handler))
            .await
            .unwrap();

        assert_eq!(read_body(response.into_body()).await, "app");
        assert_eq!(
            *log.lock(),
            vec!["m0:in", "m1:in", "app", "m1:out", "m0:out"]
        );
    }

    #[tokio::test]
    async fn test_runner_is_reusable() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut queue = MiddlewareQueue::new();
        queue.add(recording("m0", &log));
        let handler = app(&log);
        let runner = Runner::new();

        for _ in 0..2 {
            let mut ctx = MiddlewareContext::new();
            let response = runner
                .run(&queue, &mut ctx, build_request("GET", "/").unwrap(), Some(&handler))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(log.lock().len(), 6);
    }

    #[tokio::test]
    async fn test_empty_queue_without_fallback() {
        let queue = MiddlewareQueue::new();
        let mut ctx = MiddlewareContext::new();

        let response = Runner::new()
            .run(&queue, &mut ctx, build_request("GET", "/").unwrap(), None)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unresolvable_entry_is_an_error() {
        let mut queue = MiddlewareQueue::new();
        queue.add("Missing");
        let mut ctx = MiddlewareContext::new();

        let result = Runner::new()
            .run(&queue, &mut ctx, build_request("GET", "/").unwrap(), None)
            .await;

        assert!(matches!(
            result,
            Err(gateau_core::GateauError::MiddlewareNotResolved { .. })
        ));
    }
}
