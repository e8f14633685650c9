//! The action dispatcher: terminal handler of the middleware queue.

use crate::controller::Controller;
use crate::factory::ControllerFactory;
use crate::lifecycle;
use gateau_core::{GateauResult, Request, Response, ResponseExt, RouteContext};
use gateau_middleware::{BoxFuture, MiddlewareContext, RequestHandler};
use std::sync::Arc;

/// Turns a routed request into a response by running a controller.
///
/// # Example
///
/// ```
/// use gateau_controller::{ActionDispatcher, ControllerFactory};
/// use std::sync::Arc;
///
/// let dispatcher = ActionDispatcher::new(Arc::new(ControllerFactory::new()));
/// assert!(dispatcher.factory().class_keys().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    factory: Arc<ControllerFactory>,
}

impl ActionDispatcher {
    /// Creates a dispatcher building controllers with `factory`.
    #[must_use]
    pub fn new(factory: Arc<ControllerFactory>) -> Self {
        Self { factory }
    }

    /// The controller factory.
    #[must_use]
    pub fn factory(&self) -> &ControllerFactory {
        &self.factory
    }

    /// Dispatches `request` to its controller.
    ///
    /// `response` seeds the controller's held response; an empty 200
    /// response is used when none is given. The request's routing context
    /// is recorded on `ctx` before the controller is built.
    pub async fn dispatch(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
        response: Option<Response>,
    ) -> GateauResult<Response> {
        let response = response.unwrap_or_else(Response::empty);
        ctx.set_route(RouteContext::from_request(&request));

        let mut controller = self.factory.create(request, response)?;
        self.invoke(ctx, controller.as_mut()).await
    }

    /// Runs the lifecycle of an already built controller.
    pub async fn invoke(&self, ctx: &mut MiddlewareContext, controller: &mut dyn Controller) -> GateauResult<Response> {
        let started = std::time::Instant::now();
        let result = lifecycle::run(controller, ctx).await;

        tracing::debug!(
            request_id = %ctx.request_id(),
            controller = controller.state().name(),
            action = controller.state().action(),
            duration_ms = started.elapsed().as_millis() as u64,
            success = result.is_ok(),
            "controller dispatched"
        );

        result
    }
}

impl RequestHandler for ActionDispatcher {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, GateauResult<Response>> {
        Box::pin(self.dispatch(ctx, request, None))
    }
}
