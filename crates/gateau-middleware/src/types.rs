//! Request and response types used throughout the middleware queue.
//!
//! These are the buffered `http` messages defined in `gateau-core`,
//! re-exported so middleware authors need a single import.

pub use gateau_core::{Request, RequestExt, Response, ResponseExt};
