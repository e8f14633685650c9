//! # Gateau
//!
//! A request pipeline for web applications: an ordered queue of middleware
//! wrapped around a controller dispatcher.
//!
//! ```text
//! request ─▶ middleware 0 ─▶ middleware 1 ─▶ … ─▶ ActionDispatcher ─▶ controller
//!                                                                        │
//! response ◀─ middleware 0 ◀─ middleware 1 ◀─ … ◀────────────────────────┘
//! ```
//!
//! - [`middleware`] - the queue, the runner and built-in stages
//! - [`controller`] - controllers, their lifecycle and the dispatcher
//! - [`server`] - applications, plugins, events and response emitters
//! - [`config`] - layered configuration
//! - [`telemetry`] - logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gateau::prelude::*;
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
//!         Box::pin(async move { Response::text(http::StatusCode::OK, "home").map(ActionResult::from) })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_defaults().with_env_prefix("GATEAU").load()?;
//!     init_logging(&config.logging.to_log_config())?;
//!
//!     let mut controllers = ControllerFactory::new();
//!     controllers.register("Pages", |state| PagesController { state });
//!
//!     let emitter_config = config.emitter.clone();
//!     let app = WebApplication::builder().config(config).controllers(controllers).build();
//!
//!     let mut server = Server::new(app);
//!     let mut emitter = ResponseEmitter::from_config(std::io::stdout(), &emitter_config);
//!     server.run_and_emit(None, &mut emitter).await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/gateau/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use gateau_config as config;
pub use gateau_controller as controller;
pub use gateau_core as core;
pub use gateau_middleware as middleware;
pub use gateau_server as server;
pub use gateau_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use gateau::prelude::*;
///
/// let mut queue = MiddlewareQueue::new();
/// queue.add(MiddlewareUnit::instance(ErrorHandlerMiddleware::new()));
/// assert_eq!(queue.len(), 1);
/// ```
pub mod prelude {
    pub use gateau_core::{
        build_request, read_body, GateauError, GateauResult, Request, RequestExt, RequestId, Response,
        ResponseExt, RouteContext, RouteParams,
    };

    pub use gateau_middleware::{
        BoxFuture, ErrorHandlerMiddleware, Middleware, MiddlewareContext, MiddlewareQueue,
        MiddlewareRegistry, MiddlewareUnit, Next, RequestHandler, RequestIdMiddleware, Runner,
    };

    pub use gateau_controller::{ActionDispatcher, ActionResult, Controller, ControllerFactory, ControllerState};

    pub use gateau_server::{
        Application, Emitter, EventManager, Plugin, PluginCollection, PluginHook, ResponseEmitter, Server,
        WebApplication,
    };

    pub use gateau_config::{ConfigLoader, GateauConfig};

    pub use gateau_telemetry::{init_logging, LogConfig};
}
