//! The server: one full request cycle per [`Server::run`].

use crate::application::Application;
use crate::emitter::Emitter;
use crate::events::EventManager;
use crate::globals::request_from_env;
use gateau_core::{GateauResult, Request, Response};
use gateau_middleware::{MiddlewareContext, MiddlewareQueue, RequestHandler, Runner};
use std::time::Instant;

/// Runs an [`Application`] against requests.
///
/// Each call to [`run`](Self::run) performs a full cycle:
///
/// 1. [`Application::bootstrap`], then [`Application::plugin_bootstrap`]
/// 2. takes the given request, or builds one from the process environment
/// 3. [`Application::middleware`], then [`Application::plugin_middleware`]
/// 4. fires the build-middleware event with the finished queue
/// 5. runs the queue, with the application as terminal handler
///
/// # Example
///
/// ```
/// use gateau_core::build_request;
/// use gateau_server::{Server, WebApplication};
/// use http::StatusCode;
///
/// # tokio_test::block_on(async {
/// let mut server = Server::new(WebApplication::builder().build());
///
/// // No controller is registered, so the error handler renders a 404.
/// let response = server.run(Some(build_request("GET", "/").unwrap())).await.unwrap();
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// # });
/// ```
#[derive(Debug)]
pub struct Server<A> {
    app: A,
    runner: Runner,
    events: EventManager,
}

impl<A: Application> Server<A> {
    /// Creates a server for `app` with no event listeners.
    pub fn new(app: A) -> Self {
        Self {
            app,
            runner: Runner::new(),
            events: EventManager::new(),
        }
    }

    /// Sets the event listeners.
    #[must_use]
    pub fn with_events(mut self, events: EventManager) -> Self {
        self.events = events;
        self
    }

    /// The application.
    pub fn app(&self) -> &A {
        &self.app
    }

    /// Mutable access to the application.
    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    /// The event listeners.
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    /// Consumes the server, returning the application.
    pub fn into_app(self) -> A {
        self.app
    }

    /// Runs one request through the application.
    ///
    /// Without a request, one is built from CGI-style environment variables
    /// (see [`request_from_env`]). Errors from bootstrap, queue building or
    /// the pipeline itself are returned; errors are only rendered as
    /// responses when the queue contains an error handler.
    pub async fn run(&mut self, request: Option<Request>) -> GateauResult<Response> {
        let started = Instant::now();

        self.app.bootstrap()?;
        self.app.plugin_bootstrap()?;

        let request = match request {
            Some(request) => request,
            None => request_from_env()?,
        };

        let queue = self.app.middleware(MiddlewareQueue::new())?;
        let mut queue = self.app.plugin_middleware(queue)?;
        self.events.dispatch_build_middleware(&mut queue)?;

        let mut ctx = MiddlewareContext::new();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        tracing::info!(
            request_id = %ctx.request_id(),
            method = %method,
            path = %path,
            middleware_count = queue.len(),
            "request started"
        );

        let fallback = &self.app as &dyn RequestHandler;
        let result = self.runner.run(&queue, &mut ctx, request, Some(fallback)).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => tracing::info!(
                request_id = %ctx.request_id(),
                method = %method,
                path = %path,
                status = response.status().as_u16(),
                duration_ms,
                "request completed"
            ),
            Err(e) => tracing::error!(
                request_id = %ctx.request_id(),
                method = %method,
                path = %path,
                status = e.status_code().as_u16(),
                duration_ms,
                error = %e,
                "request failed"
            ),
        }

        result
    }

    /// Sends `response` through `emitter`.
    pub async fn emit(&self, response: Response, emitter: &mut dyn Emitter) -> GateauResult<()> {
        emitter.emit(response).await
    }

    /// Runs `request` and emits the response.
    pub async fn run_and_emit(&mut self, request: Option<Request>, emitter: &mut dyn Emitter) -> GateauResult<()> {
        let response = self.run(request).await?;
        self.emit(response, emitter).await
    }
}
