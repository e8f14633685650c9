//! Server events.
//!
//! The server announces [`BUILD_MIDDLEWARE_EVENT`] after the application and
//! its plugins have filled the middleware queue and before the queue runs.
//! Listeners get the queue mutably and may add, insert or reorder entries.
//!
//! # Example
//!
//! ```
//! use gateau_middleware::{MiddlewareQueue, MiddlewareUnit, RequestIdMiddleware};
//! use gateau_server::EventManager;
//!
//! let events = EventManager::new().on_build_middleware("request_id", |queue| {
//!     queue.prepend(MiddlewareUnit::instance(RequestIdMiddleware::new()));
//!     Ok(())
//! });
//!
//! let mut queue = MiddlewareQueue::new();
//! events.dispatch_build_middleware(&mut queue).unwrap();
//! assert_eq!(queue.len(), 1);
//! ```
//!
//! # Execution Order
//!
//! Listeners run in registration order. The first failing listener stops
//! the dispatch and its error is returned.

use gateau_core::GateauResult;
use gateau_middleware::MiddlewareQueue;
use std::fmt;
use std::sync::Arc;

/// Name of the event fired once the middleware queue is built.
pub const BUILD_MIDDLEWARE_EVENT: &str = "Server.buildMiddleware";

/// A listener for [`BUILD_MIDDLEWARE_EVENT`].
pub type BuildMiddlewareListener = Arc<dyn Fn(&mut MiddlewareQueue) -> GateauResult<()> + Send + Sync>;

/// Registry of server event listeners.
#[must_use]
#[derive(Default, Clone)]
pub struct EventManager {
    build_middleware: Vec<(String, BuildMiddlewareListener)>,
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("build_middleware", &self.listener_names())
            .finish()
    }
}

impl EventManager {
    /// Creates an event manager with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named [`BUILD_MIDDLEWARE_EVENT`] listener.
    pub fn on_build_middleware<F>(mut self, name: impl Into<String>, listener: F) -> Self
    where
        F: Fn(&mut MiddlewareQueue) -> GateauResult<()> + Send + Sync + 'static,
    {
        self.build_middleware.push((name.into(), Arc::new(listener)));
        self
    }

    /// Number of [`BUILD_MIDDLEWARE_EVENT`] listeners.
    pub fn listener_count(&self) -> usize {
        self.build_middleware.len()
    }

    /// Listener names in registration order.
    pub fn listener_names(&self) -> Vec<&str> {
        self.build_middleware.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Appends every listener of `other` after this manager's listeners.
    pub fn merge(mut self, other: EventManager) -> Self {
        self.build_middleware.extend(other.build_middleware);
        self
    }

    /// Fires [`BUILD_MIDDLEWARE_EVENT`] with `queue`.
    pub fn dispatch_build_middleware(&self, queue: &mut MiddlewareQueue) -> GateauResult<()> {
        for (name, listener) in &self.build_middleware {
            tracing::debug!(
                event = BUILD_MIDDLEWARE_EVENT,
                listener = %name,
                queue_len = queue.len(),
                "running event listener"
            );

            if let Err(e) = listener(queue) {
                tracing::error!(
                    event = BUILD_MIDDLEWARE_EVENT,
                    listener = %name,
                    error = %e,
                    "event listener failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateau_core::GateauError;
    use gateau_middleware::MiddlewareUnit;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn passthrough(name: &'static str) -> MiddlewareUnit {
        MiddlewareUnit::closure(name, |ctx, req, next| Box::pin(next.run(ctx, req)))
    }

    #[test]
    fn test_listeners_run_in_order() {
        let events = EventManager::new()
            .on_build_middleware("first", |queue| {
                queue.add(passthrough("a"));
                Ok(())
            })
            .on_build_middleware("second", |queue| {
                queue.prepend(passthrough("b"));
                Ok(())
            });

        let mut queue = MiddlewareQueue::new();
        queue.add(passthrough("app"));
        events.dispatch_build_middleware(&mut queue).unwrap();

        assert_eq!(queue.names(), vec!["b", "app", "a"]);
        assert_eq!(events.listener_names(), vec!["first", "second"]);
    }

    #[test]
    fn test_failure_stops_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let events = EventManager::new()
            .on_build_middleware("broken", |_| Err(GateauError::bootstrap("listener broke")))
            .on_build_middleware("never", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let mut queue = MiddlewareQueue::new();
        let err = events.dispatch_build_middleware(&mut queue).unwrap_err();

        assert!(matches!(err, GateauError::Bootstrap { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_merge_appends() {
        let events = EventManager::new()
            .on_build_middleware("one", |_| Ok(()))
            .merge(EventManager::new().on_build_middleware("two", |_| Ok(())));

        assert_eq!(events.listener_count(), 2);
        assert_eq!(events.listener_names(), vec!["one", "two"]);
    }
}
