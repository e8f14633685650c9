//! HTTP message types shared by every Gateau crate.
//!
//! The low-level request/response object model is provided by the `http`
//! crate. Gateau fixes the body type to a fully buffered `Full<Bytes>`.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};

/// The HTTP request type used throughout the pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used throughout the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Builds a request with an empty body.
///
/// # Example
///
/// ```
/// let request = gateau_core::build_request("POST", "/articles/add").unwrap();
/// assert_eq!(request.method(), http::Method::POST);
/// ```
pub fn build_request(method: &str, uri: &str) -> Result<Request, http::Error> {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::new()))
}

/// Reads a buffered body into bytes.
pub async fn read_body(body: Full<Bytes>) -> Bytes {
    match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}
