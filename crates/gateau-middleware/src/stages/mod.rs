//! Built-in middleware.
//!
//! - [`request_id`] - assign a request ID and echo it on the response
//! - [`error_handler`] - turn pipeline errors into JSON error responses
//!
//! Neither is installed automatically; applications add them to their queue.

pub mod error_handler;
pub mod request_id;

pub use error_handler::ErrorHandlerMiddleware;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
