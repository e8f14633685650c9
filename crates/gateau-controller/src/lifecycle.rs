//! Controller lifecycle state machine.
//!
//! ```text
//! Startup ──response──────────────────────────────▶ done (shutdown skipped)
//!    │
//!    ▼
//! Action ──response───────────────┐
//!    │ nothing/null, auto-render  │
//!    ▼                            ▼
//! Render ────────────────────▶ Shutdown ──response──▶ done (overrides)
//!    nothing, auto-render off ──▲    └──nothing─────▶ done (held response)
//! ```
//!
//! Each state runs one controller hook and yields a [`Transition`]. The
//! machine stops at the first [`Transition::Terminate`].

use crate::controller::{ActionResult, Controller};
use gateau_core::{GateauError, GateauResult, Response};
use gateau_middleware::MiddlewareContext;
use serde_json::Value;
use std::fmt;

/// A state of the controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Run the startup hook.
    Startup,
    /// Invoke the routed action.
    Action,
    /// Render a response from view variables.
    Render,
    /// Run the shutdown hook.
    Shutdown,
}

impl LifecycleState {
    /// Returns the state name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Action => "action",
            Self::Render => "render",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of running one lifecycle state.
#[derive(Debug)]
pub enum Transition {
    /// Move on to the given state.
    Continue(LifecycleState),
    /// Stop with the final response.
    Terminate(Response),
}

/// Runs one lifecycle state against `controller`.
pub async fn step(
    controller: &mut dyn Controller,
    ctx: &mut MiddlewareContext,
    state: LifecycleState,
) -> GateauResult<Transition> {
    match state {
        LifecycleState::Startup => Ok(match controller.startup_process(ctx).await? {
            Some(response) => Transition::Terminate(response),
            None => Transition::Continue(LifecycleState::Action),
        }),
        LifecycleState::Action => match controller.invoke_action(ctx).await? {
            ActionResult::Response(response) => {
                controller.state_mut().set_response(response);
                Ok(Transition::Continue(LifecycleState::Shutdown))
            }
            ActionResult::Nothing | ActionResult::Value(Value::Null)
                if controller.state().is_auto_render_enabled() =>
            {
                Ok(Transition::Continue(LifecycleState::Render))
            }
            ActionResult::Nothing | ActionResult::Value(Value::Null) => {
                Ok(Transition::Continue(LifecycleState::Shutdown))
            }
            invalid @ ActionResult::Value(_) => {
                let state = controller.state();
                Err(GateauError::InvalidActionReturn {
                    controller: state.name().to_string(),
                    action: state.action().to_string(),
                    found: invalid.describe().to_string(),
                })
            }
        },
        LifecycleState::Render => {
            let response = controller.render(ctx).await?;
            controller.state_mut().set_response(response);
            Ok(Transition::Continue(LifecycleState::Shutdown))
        }
        LifecycleState::Shutdown => Ok(match controller.shutdown_process(ctx).await? {
            Some(response) => Transition::Terminate(response),
            None => Transition::Terminate(controller.state_mut().take_response()),
        }),
    }
}

/// Drives `controller` from [`LifecycleState::Startup`] to a response.
pub async fn run(controller: &mut dyn Controller, ctx: &mut MiddlewareContext) -> GateauResult<Response> {
    let mut state = LifecycleState::Startup;
    loop {
        tracing::debug!(
            request_id = %ctx.request_id(),
            controller = controller.state().name(),
            action = controller.state().action(),
            lifecycle_state = state.as_str(),
            "controller lifecycle"
        );

        match step(controller, ctx, state).await? {
            Transition::Continue(next) => state = next,
            Transition::Terminate(response) => return Ok(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerState;
    use gateau_core::{build_request, read_body, RequestExt, ResponseExt, RouteParams};
    use gateau_middleware::BoxFuture;
    use http::StatusCode;

    /// Scripted controller recording which hooks ran.
    struct Scripted {
        state: ControllerState,
        startup: Option<u16>,
        action: fn() -> ActionResult,
        shutdown: Option<&'static str>,
        hooks: Vec<&'static str>,
    }

    impl Scripted {
        fn new(action: fn() -> ActionResult) -> Self {
            let request = build_request("GET", "/")
                .unwrap()
                .with_route_params(RouteParams::new("Scripted", "go"));
            Self {
                state: ControllerState::new("Scripted", request, Response::empty()),
                startup: None,
                action,
                shutdown: None,
                hooks: Vec::new(),
            }
        }
    }

    impl Controller for Scripted {
        fn state(&self) -> &ControllerState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut ControllerState {
            &mut self.state
        }

        fn startup_process<'a>(
            &'a mut self,
            _ctx: &'a mut MiddlewareContext,
        ) -> BoxFuture<'a, GateauResult<Option<Response>>> {
            self.hooks.push("startup");
            let startup = self.startup;
            Box::pin(async move { startup.map(|code| Response::empty().with_status(code)).transpose() })
        }

        fn invoke_action<'a>(
            &'a mut self,
            _ctx: &'a mut MiddlewareContext,
        ) -> BoxFuture<'a, GateauResult<ActionResult>> {
            self.hooks.push("action");
            let result = (self.action)();
            Box::pin(async move { Ok(result) })
        }

        fn render<'a>(&'a mut self, _ctx: &'a mut MiddlewareContext) -> BoxFuture<'a, GateauResult<Response>> {
            self.hooks.push("render");
            Box::pin(async { Response::text(StatusCode::OK, "rendered") })
        }

        fn shutdown_process<'a>(
            &'a mut self,
            _ctx: &'a mut MiddlewareContext,
        ) -> BoxFuture<'a, GateauResult<Option<Response>>> {
            self.hooks.push("shutdown");
            let body = self.shutdown;
            Box::pin(async move { body.map(|b| Response::text(StatusCode::OK, b)).transpose() })
        }
    }

    fn ok_action() -> ActionResult {
        Response::text(StatusCode::OK, "ok").unwrap().into()
    }

    #[test]
    fn test_state_names() {
        assert_eq!(LifecycleState::Startup.to_string(), "startup");
        assert_eq!(LifecycleState::Shutdown.as_str(), "shutdown");
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let mut controller = Scripted::new(ok_action);
        let mut ctx = MiddlewareContext::new();

        let response = run(&mut controller, &mut ctx).await.unwrap();
        assert_eq!(read_body(response.into_body()).await, "ok");
        assert_eq!(controller.hooks, vec!["startup", "action", "shutdown"]);
    }

    #[tokio::test]
    async fn test_startup_response_skips_everything() {
        let mut controller = Scripted::new(ok_action);
        controller.startup = Some(302);
        let mut ctx = MiddlewareContext::new();

        let response = run(&mut controller, &mut ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(controller.hooks, vec!["startup"]);
    }

    #[tokio::test]
    async fn test_auto_render_when_action_returns_nothing() {
        let mut controller = Scripted::new(|| ActionResult::Nothing);
        let mut ctx = MiddlewareContext::new();

        let response = run(&mut controller, &mut ctx).await.unwrap();
        assert_eq!(read_body(response.into_body()).await, "rendered");
        assert_eq!(controller.hooks, vec!["startup", "action", "render", "shutdown"]);
    }

    #[tokio::test]
    async fn test_no_render_when_auto_render_disabled() {
        let mut controller = Scripted::new(|| ActionResult::Nothing);
        controller.state.disable_auto_render();
        controller.state.set_response(Response::text(StatusCode::ACCEPTED, "held").unwrap());
        let mut ctx = MiddlewareContext::new();

        let response = run(&mut controller, &mut ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(read_body(response.into_body()).await, "held");
        assert_eq!(controller.hooks, vec!["startup", "action", "shutdown"]);
    }

    #[tokio::test]
    async fn test_shutdown_overrides_action_response() {
        let mut controller = Scripted::new(ok_action);
        controller.shutdown = Some("cached");
        let mut ctx = MiddlewareContext::new();

        let response = run(&mut controller, &mut ctx).await.unwrap();
        assert_eq!(read_body(response.into_body()).await, "cached");
    }

    #[tokio::test]
    async fn test_null_return_auto_renders_like_nothing() {
        let mut controller = Scripted::new(|| ActionResult::Value(Value::Null));
        let mut ctx = MiddlewareContext::new();

        let response = run(&mut controller, &mut ctx).await.unwrap();
        assert_eq!(read_body(response.into_body()).await, "rendered");
        assert_eq!(controller.hooks, vec!["startup", "action", "render", "shutdown"]);
    }

    #[tokio::test]
    async fn test_null_return_without_auto_render_keeps_held_response() {
        let mut controller = Scripted::new(|| ActionResult::Value(Value::Null));
        controller.state.disable_auto_render();
        controller.state.set_response(Response::text(StatusCode::ACCEPTED, "held").unwrap());
        let mut ctx = MiddlewareContext::new();

        let response = run(&mut controller, &mut ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(controller.hooks, vec!["startup", "action", "shutdown"]);
    }

    #[tokio::test]
    async fn test_value_return_is_rejected() {
        let mut controller = Scripted::new(|| ActionResult::Value("hello".into()));
        let mut ctx = MiddlewareContext::new();

        let err = run(&mut controller, &mut ctx).await.unwrap_err();
        assert!(matches!(
            err,
            GateauError::InvalidActionReturn { ref controller, ref action, ref found }
                if controller == "Scripted" && action == "go" && found == "a string"
        ));
        assert_eq!(controller.hooks, vec!["startup", "action"]);
    }

    #[tokio::test]
    async fn test_step_transitions() {
        let mut controller = Scripted::new(|| ActionResult::Nothing);
        let mut ctx = MiddlewareContext::new();

        let next = step(&mut controller, &mut ctx, LifecycleState::Startup).await.unwrap();
        assert!(matches!(next, Transition::Continue(LifecycleState::Action)));

        let next = step(&mut controller, &mut ctx, LifecycleState::Action).await.unwrap();
        assert!(matches!(next, Transition::Continue(LifecycleState::Render)));

        let next = step(&mut controller, &mut ctx, LifecycleState::Render).await.unwrap();
        assert!(matches!(next, Transition::Continue(LifecycleState::Shutdown)));

        let next = step(&mut controller, &mut ctx, LifecycleState::Shutdown).await.unwrap();
        assert!(matches!(next, Transition::Terminate(_)));
    }
}
