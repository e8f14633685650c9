//! The controller capability consumed by the action dispatcher.
//!
//! A controller owns a [`ControllerState`] (the routed request, the response
//! being built, view variables and the auto-render flag) and implements one
//! required hook, [`Controller::invoke_action`]. The startup, render and
//! shutdown hooks have defaults.
//!
//! # Example
//!
//! ```
//! use gateau_controller::{ActionResult, Controller, ControllerState};
//! use gateau_core::{GateauResult, ResponseExt};
//! use gateau_middleware::{BoxFuture, MiddlewareContext, Response};
//! use http::StatusCode;
//!
//! struct PagesController {
//!     state: ControllerState,
//! }
//!
//! impl Controller for PagesController {
//!     fn state(&self) -> &ControllerState {
//!         &self.state
//!     }
//!
//!     fn state_mut(&mut self) -> &mut ControllerState {
//!         &mut self.state
//!     }
//!
//!     fn invoke_action<'a>(
//!         &'a mut self,
//!         _ctx: &'a mut MiddlewareContext,
//!     ) -> BoxFuture<'a, GateauResult<ActionResult>> {
//!         Box::pin(async move {
//!             let action = self.state.action().to_string();
//!             match action.as_str() {
//!                 "home" => Response::text(StatusCode::OK, "welcome").map(ActionResult::from),
//!                 "about" => {
//!                     self.state.set("team", ["ada", "grace"])?;
//!                     Ok(ActionResult::Nothing)
//!                 }
//!                 _ => Err(self.state.missing_action()),
//!             }
//!         })
//!     }
//! }
//! ```

use gateau_core::{GateauError, GateauResult, Request, RequestExt, Response, ResponseExt, RouteParams};
use gateau_middleware::{BoxFuture, MiddlewareContext};
use http::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{Map, Value};
use std::mem;

/// What an action handed back.
///
/// Only [`ActionResult::Response`] and [`ActionResult::Nothing`] are valid.
/// A JSON `null` counts as nothing; any other [`ActionResult::Value`] is
/// rejected with [`GateauError::InvalidActionReturn`].
#[derive(Debug)]
pub enum ActionResult {
    /// The action produced the response itself.
    Response(Response),
    /// The action produced nothing; auto-render may build the response.
    Nothing,
    /// The action returned plain data. Anything but `null` is a contract
    /// violation.
    Value(Value),
}

impl ActionResult {
    /// Describes the kind of value held, for error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Response(_) => "a response",
            Self::Nothing | Self::Value(Value::Null) => "nothing",
            Self::Value(Value::Bool(_)) => "a boolean",
            Self::Value(Value::Number(_)) => "a number",
            Self::Value(Value::String(_)) => "a string",
            Self::Value(Value::Array(_)) => "an array",
            Self::Value(Value::Object(_)) => "an object",
        }
    }
}

impl From<Response> for ActionResult {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<()> for ActionResult {
    fn from((): ()) -> Self {
        Self::Nothing
    }
}

impl From<Option<Response>> for ActionResult {
    fn from(response: Option<Response>) -> Self {
        response.map_or(Self::Nothing, Self::Response)
    }
}

/// State every controller carries through its lifecycle.
#[derive(Debug)]
pub struct ControllerState {
    name: String,
    request: Request,
    response: Response,
    auto_render: bool,
    view_vars: Map<String, Value>,
}

impl ControllerState {
    /// Creates controller state for `request`, holding `response` as the
    /// response under construction. Auto-render starts enabled.
    #[must_use]
    pub fn new(name: impl Into<String>, request: Request, response: Response) -> Self {
        Self {
            name: name.into(),
            request,
            response,
            auto_render: true,
            view_vars: Map::new(),
        }
    }

    /// The controller name, e.g. `Articles`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The request being handled.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access to the request being handled.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// The routing parameters of the request, if any.
    #[must_use]
    pub fn params(&self) -> Option<&RouteParams> {
        self.request.route_params()
    }

    /// The routed plugin, if any.
    #[must_use]
    pub fn plugin(&self) -> Option<&str> {
        self.params().and_then(|p| p.plugin.as_deref())
    }

    /// The routed action, `index` when the router gave none.
    #[must_use]
    pub fn action(&self) -> &str {
        self.params().map_or("index", RouteParams::action_or_default)
    }

    /// Positional arguments passed to the action.
    #[must_use]
    pub fn pass(&self) -> &[String] {
        self.params().map(|p| p.pass.as_slice()).unwrap_or_default()
    }

    /// The response held by the controller.
    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Mutable access to the held response.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Replaces the held response.
    pub fn set_response(&mut self, response: Response) {
        self.response = response;
    }

    /// Takes the held response, leaving an empty one in its place.
    pub fn take_response(&mut self) -> Response {
        mem::replace(&mut self.response, Response::empty())
    }

    /// Returns true if a missing action response triggers rendering.
    #[must_use]
    pub fn is_auto_render_enabled(&self) -> bool {
        self.auto_render
    }

    /// Enables auto-rendering.
    pub fn enable_auto_render(&mut self) {
        self.auto_render = true;
    }

    /// Disables auto-rendering.
    pub fn disable_auto_render(&mut self) {
        self.auto_render = false;
    }

    /// Sets a view variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) -> GateauResult<()> {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|e| {
            GateauError::internal_with_source(format!("view variable '{key}' is not serializable"), e)
        })?;
        self.view_vars.insert(key, value);
        Ok(())
    }

    /// The view variables set so far.
    #[must_use]
    pub fn view_vars(&self) -> &Map<String, Value> {
        &self.view_vars
    }

    /// Builds the "action not found" error for the routed action.
    #[must_use]
    pub fn missing_action(&self) -> GateauError {
        GateauError::missing_action(self.name.clone(), self.action())
    }

    /// Renders the held response with the view variables as a JSON body.
    ///
    /// With no view variables the body is left empty.
    pub fn render_view_vars(&mut self) -> GateauResult<Response> {
        let response = self.take_response();
        if self.view_vars.is_empty() {
            return Ok(response);
        }

        let body = serde_json::to_vec(&self.view_vars)
            .map_err(|e| GateauError::internal_with_source("failed to serialize view variables", e))?;
        let mut response = response.with_body(body);
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(response)
    }
}

/// A controller whose lifecycle the dispatcher drives.
///
/// Hooks run in this order: [`startup_process`](Self::startup_process),
/// [`invoke_action`](Self::invoke_action), [`render`](Self::render) when
/// the action produced nothing and auto-render is on, then
/// [`shutdown_process`](Self::shutdown_process).
pub trait Controller: Send {
    /// The controller's state.
    fn state(&self) -> &ControllerState;

    /// Mutable access to the controller's state.
    fn state_mut(&mut self) -> &mut ControllerState;

    /// Runs before the action. Returning a response ends the lifecycle
    /// immediately: the action, render and shutdown hooks are skipped.
    fn startup_process<'a>(
        &'a mut self,
        _ctx: &'a mut MiddlewareContext,
    ) -> BoxFuture<'a, GateauResult<Option<Response>>> {
        Box::pin(async { Ok(None) })
    }

    /// Runs the routed action.
    ///
    /// Unknown actions should fail with [`ControllerState::missing_action`].
    fn invoke_action<'a>(
        &'a mut self,
        ctx: &'a mut MiddlewareContext,
    ) -> BoxFuture<'a, GateauResult<ActionResult>>;

    /// Builds a response when the action produced none.
    ///
    /// The default serializes the view variables as JSON.
    fn render<'a>(&'a mut self, _ctx: &'a mut MiddlewareContext) -> BoxFuture<'a, GateauResult<Response>> {
        Box::pin(async move { self.state_mut().render_view_vars() })
    }

    /// Runs after the action. A returned response replaces whatever the
    /// action or render produced.
    fn shutdown_process<'a>(
        &'a mut self,
        _ctx: &'a mut MiddlewareContext,
    ) -> BoxFuture<'a, GateauResult<Option<Response>>> {
        Box::pin(async { Ok(None) })
    }
}
