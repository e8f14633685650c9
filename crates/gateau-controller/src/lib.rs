//! # Gateau Controller
//!
//! Action dispatch for the Gateau framework: the terminal handler at the end
//! of the middleware queue.
//!
//! - [`ActionDispatcher`] - records the routing context, builds the
//!   controller and runs its lifecycle
//! - [`ControllerFactory`] - maps `[Plugin.][Prefix/]Controller` class keys
//!   to controller constructors
//! - [`Controller`] - the lifecycle hooks a controller implements
//! - [`lifecycle`] - the explicit state machine driving those hooks
//!
//! ## Lifecycle
//!
//! 1. `startup_process` - a response here ends dispatch; nothing else runs
//! 2. `invoke_action` - must produce a response or nothing
//! 3. `render` - only when the action produced nothing and auto-render is on
//! 4. `shutdown_process` - a response here replaces the action's response

#![doc(html_root_url = "https://docs.rs/gateau-controller/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod controller;
pub mod dispatcher;
pub mod factory;
pub mod lifecycle;

pub use controller::{ActionResult, Controller, ControllerState};
pub use dispatcher::ActionDispatcher;
pub use factory::{ControllerConstructor, ControllerFactory};
pub use lifecycle::{LifecycleState, Transition};
