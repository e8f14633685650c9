//! Request identity and routing context types.

use http::{Method, Uri};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::{RequestExt, RouteParams};
use crate::types::Request;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use gateau_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The request currently being dispatched to a controller.
///
/// Code below the dispatcher that needs to know which request is in flight
/// reads this from the request-scoped context instead of from shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    method: Method,
    uri: Uri,
    params: RouteParams,
}

impl RouteContext {
    /// Captures the routing context of a request.
    #[must_use]
    pub fn from_request(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            params: request.route_params().cloned().unwrap_or_default(),
        }
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the routing parameters.
    #[must_use]
    pub fn params(&self) -> &RouteParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::build_request;

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_request_id_display_roundtrips() {
        let id = RequestId::new();
        let parsed = Uuid::parse_str(&id.to_string()).unwrap();
        assert_eq!(RequestId::from_uuid(parsed), id);
    }

    #[test]
    fn test_route_context_from_request() {
        let request = build_request("PUT", "/articles/edit/5")
            .unwrap()
            .with_route_params(RouteParams::new("Articles", "edit").with_pass(["5"]));

        let ctx = RouteContext::from_request(&request);
        assert_eq!(ctx.method(), Method::PUT);
        assert_eq!(ctx.uri().path(), "/articles/edit/5");
        assert_eq!(ctx.params().pass, vec!["5".to_string()]);
    }

    #[test]
    fn test_route_context_without_params() {
        let request = build_request("GET", "/").unwrap();
        let ctx = RouteContext::from_request(&request);
        assert_eq!(ctx.params(), &RouteParams::default());
    }
}
