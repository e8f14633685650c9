//! Name-to-constructor registry for middleware referenced by name.
//!
//! A queue entry added as a plain string is resolved through the registry the
//! first time the queue reaches it.

use crate::middleware::Middleware;
use gateau_core::{GateauError, GateauResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Suffix tried when a name is not registered verbatim.
pub const MIDDLEWARE_SUFFIX: &str = "Middleware";

/// Constructs a middleware instance.
pub type MiddlewareConstructor = Arc<dyn Fn() -> Arc<dyn Middleware> + Send + Sync>;

/// Registry of middleware constructors keyed by logical name.
///
/// Lookups try the exact name first, then the name with a `Middleware`
/// suffix, so `"Cors"` finds an entry registered as `"CorsMiddleware"`.
///
/// # Example
///
/// ```
/// use gateau_middleware::{MiddlewareRegistry, RequestIdMiddleware};
///
/// let mut registry = MiddlewareRegistry::new();
/// registry.register("RequestIdMiddleware", RequestIdMiddleware::new);
///
/// assert!(registry.resolve("RequestId").is_ok());
/// assert!(registry.resolve("Csrf").is_err());
/// ```
#[derive(Default, Clone)]
pub struct MiddlewareRegistry {
    constructors: HashMap<String, MiddlewareConstructor>,
}

impl MiddlewareRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `name`, replacing any previous one.
    pub fn register<F, M>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: Middleware,
    {
        let constructor: MiddlewareConstructor = Arc::new(move || Arc::new(constructor()) as Arc<dyn Middleware>);
        self.constructors.insert(name.into(), constructor);
        self
    }

    /// Returns true if `name` resolves, with or without the suffix.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Returns the registered names.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds a fresh instance for `name`.
    ///
    /// Fails with [`GateauError::MiddlewareNotResolved`] when neither `name`
    /// nor `name` + `Middleware` is registered.
    pub fn resolve(&self, name: &str) -> GateauResult<Arc<dyn Middleware>> {
        let constructor = self.lookup(name).ok_or_else(|| GateauError::not_resolved(name))?;
        Ok(constructor())
    }

    fn lookup(&self, name: &str) -> Option<&MiddlewareConstructor> {
        self.constructors
            .get(name)
            .or_else(|| self.constructors.get(&format!("{name}{MIDDLEWARE_SUFFIX}")))
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::RequestIdMiddleware;

    #[test]
    fn test_exact_name_wins() {
        let mut registry = MiddlewareRegistry::new();
        registry.register("RequestId", RequestIdMiddleware::new);

        let mw = registry.resolve("RequestId").unwrap();
        assert_eq!(mw.name(), "request_id");
    }

    #[test]
    fn test_suffix_fallback() {
        let mut registry = MiddlewareRegistry::new();
        registry.register("RequestIdMiddleware", RequestIdMiddleware::new);

        assert!(registry.contains("RequestId"));
        assert!(registry.contains("RequestIdMiddleware"));
        assert!(!registry.contains("Request"));
    }

    #[test]
    fn test_unknown_name() {
        let registry = MiddlewareRegistry::new();
        let err = registry.resolve("Csrf").err().unwrap();
        assert!(matches!(err, GateauError::MiddlewareNotResolved { name } if name == "Csrf"));
    }

    #[test]
    fn test_each_resolve_builds_a_new_instance() {
        let mut registry = MiddlewareRegistry::new();
        registry.register("RequestId", RequestIdMiddleware::new);

        let a = registry.resolve("RequestId").unwrap();
        let b = registry.resolve("RequestId").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = MiddlewareRegistry::new();
        registry
            .register("Zeta", RequestIdMiddleware::new)
            .register("Alpha", RequestIdMiddleware::new);
        assert_eq!(registry.names(), vec!["Alpha", "Zeta"]);
    }
}
