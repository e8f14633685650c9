//! Request-scoped middleware context.
//!
//! A [`MiddlewareContext`] is created once per request and passed by
//! mutable reference through every middleware, the fallback handler and the
//! action dispatcher. Nothing in it outlives the request.

use gateau_core::{RequestId, RouteContext};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

/// Context that flows through the middleware chain.
///
/// # Example
///
/// ```
/// use gateau_middleware::context::MiddlewareContext;
///
/// #[derive(Debug, PartialEq)]
/// struct Locale(&'static str);
///
/// let mut ctx = MiddlewareContext::new();
/// ctx.set_extension(Locale("fr_FR"));
/// assert_eq!(ctx.get_extension::<Locale>(), Some(&Locale("fr_FR")));
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// The request currently being dispatched, set by the action dispatcher.
    route: Option<RouteContext>,

    /// When the request started processing.
    started_at: Instant,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a new context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            route: None,
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Sets the request ID.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns the routing context of the request being dispatched.
    #[must_use]
    pub fn route(&self) -> Option<&RouteContext> {
        self.route.as_ref()
    }

    /// Records the routing context of the request being dispatched.
    ///
    /// Replaces any previous value, so a sub-request dispatched with the same
    /// context becomes the current one.
    pub fn set_route(&mut self, route: RouteContext) {
        self.route = Some(route);
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Retrieves a mutable typed extension value.
    pub fn get_extension_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateau_core::{build_request, RequestExt, RouteParams};

    #[test]
    fn test_new_context_has_no_route() {
        let ctx = MiddlewareContext::new();
        assert!(ctx.route().is_none());
    }

    #[test]
    fn test_set_route() {
        let request = build_request("GET", "/posts")
            .unwrap()
            .with_route_params(RouteParams::new("Posts", "index"));

        let mut ctx = MiddlewareContext::new();
        ctx.set_route(RouteContext::from_request(&request));

        let route = ctx.route().unwrap();
        assert_eq!(route.params().controller.as_deref(), Some("Posts"));
        assert_eq!(route.uri().path(), "/posts");
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct Trail(Vec<&'static str>);

        let mut ctx = MiddlewareContext::new();
        assert!(!ctx.has_extension::<Trail>());

        ctx.set_extension(Trail(vec!["a"]));
        ctx.get_extension_mut::<Trail>().unwrap().0.push("b");
        assert_eq!(ctx.get_extension::<Trail>(), Some(&Trail(vec!["a", "b"])));

        let removed = ctx.remove_extension::<Trail>();
        assert_eq!(removed, Some(Trail(vec!["a", "b"])));
        assert!(!ctx.has_extension::<Trail>());
    }

    #[test]
    fn test_request_id_override() {
        let id = RequestId::new();
        let mut ctx = MiddlewareContext::new();
        ctx.set_request_id(id);
        assert_eq!(ctx.request_id(), id);
    }

    #[test]
    fn test_elapsed_time() {
        let ctx = MiddlewareContext::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(ctx.elapsed() >= std::time::Duration::from_millis(5));
    }
}
