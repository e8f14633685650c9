//! # Gateau Middleware
//!
//! The middleware queue and runner at the heart of the Gateau request
//! pipeline.
//!
//! An application fills a [`MiddlewareQueue`] during startup. For each
//! request, the [`Runner`] walks the queue front to back: every middleware
//! may do work, hand the request on with [`Next::run`], and post-process the
//! response on the way back out. When the queue is exhausted the request
//! reaches the fallback [`RequestHandler`], normally the application itself.
//!
//! ```text
//! request ─▶ m0 ─▶ m1 ─▶ … ─▶ fallback handler
//!                                  │
//! response ◀─ m0 ◀─ m1 ◀─ … ◀──────┘
//! ```
//!
//! A middleware that returns without calling `next` short-circuits the rest
//! of the queue.
//!
//! ## Queue Entries
//!
//! | Entry                     | Resolved by                                 |
//! |---------------------------|---------------------------------------------|
//! | `"Name"`                  | the queue's [`MiddlewareRegistry`]          |
//! | [`MiddlewareUnit::factory`] | calling the constructor, once             |
//! | [`MiddlewareUnit::instance`] | used as is                               |
//! | [`ClosureMiddleware`]     | wrapped as a middleware                     |
//! | [`DoublePassMiddleware`]  | wrapped, receiving a seed response          |
//!
//! Entries are resolved on first use and the result is cached in the queue.
//!
//! ## Example
//!
//! ```
//! use gateau_middleware::{ErrorHandlerMiddleware, MiddlewareQueue, MiddlewareUnit, RequestIdMiddleware};
//!
//! let mut queue = MiddlewareQueue::new();
//! queue
//!     .add(MiddlewareUnit::instance(ErrorHandlerMiddleware::new()))
//!     .add(MiddlewareUnit::instance(RequestIdMiddleware::new()));
//!
//! queue
//!     .insert_before("request_id", MiddlewareUnit::closure("noop", |ctx, req, next| {
//!         Box::pin(next.run(ctx, req))
//!     }))
//!     .unwrap();
//!
//! assert_eq!(queue.names(), vec!["error_handler", "noop", "request_id"]);
//! ```

#![doc(html_root_url = "https://docs.rs/gateau-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod queue;
pub mod registry;
pub mod runner;
pub mod stages;
pub mod types;

pub use context::MiddlewareContext;
pub use middleware::{
    BoxFuture, ClosureMiddleware, DoublePassMiddleware, FnHandler, Middleware, Next, RequestHandler,
    EXHAUSTED_QUEUE_MESSAGE,
};
pub use queue::{MiddlewareQueue, MiddlewareUnit, QueueCursor};
pub use registry::{MiddlewareConstructor, MiddlewareRegistry, MIDDLEWARE_SUFFIX};
pub use runner::Runner;
pub use stages::{ErrorHandlerMiddleware, RequestIdMiddleware, REQUEST_ID_HEADER};
pub use types::{Request, Response};
