//! # Gateau Server
//!
//! Runs an application against requests and writes the responses out.
//!
//! - [`Application`] - bootstrap, middleware and terminal request handling
//! - [`WebApplication`] - an application dispatching to controllers
//! - [`Plugin`] / [`PluginCollection`] - packaged bootstrap and middleware
//! - [`EventManager`] - listeners for the build-middleware event
//! - [`Server`] - the request cycle
//! - [`Emitter`] / [`ResponseEmitter`] - response output
//!
//! ## Example
//!
//! ```rust,ignore
//! use gateau_config::ConfigLoader;
//! use gateau_server::{ResponseEmitter, Server, WebApplication};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_defaults().with_env_prefix("GATEAU").load()?;
//!     let emitter_config = config.emitter.clone();
//!
//!     let app = WebApplication::builder()
//!         .config(config)
//!         .controllers(controllers())
//!         .build();
//!
//!     let mut server = Server::new(app);
//!     let mut emitter = ResponseEmitter::from_config(std::io::stdout(), &emitter_config);
//!     server.run_and_emit(None, &mut emitter).await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/gateau-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod application;
mod emitter;
mod events;
mod globals;
mod plugin;
mod server;

pub use application::{Application, BootstrapHook, MiddlewareBuilder, WebApplication, WebApplicationBuilder};
pub use emitter::{Emitter, ResponseEmitter, DEFAULT_MAX_BUFFER_LENGTH, DEFAULT_PROTOCOL};
pub use events::{BuildMiddlewareListener, EventManager, BUILD_MIDDLEWARE_EVENT};
pub use globals::{request_from_env, request_from_vars};
pub use plugin::{Plugin, PluginCollection, PluginHook};
pub use server::Server;
