//! Ordered, mutable middleware queue.
//!
//! Entries are stored as given (a name, a constructor, an instance or a
//! closure) and normalized to a [`Middleware`] instance the first time they
//! are fetched. A normalized entry is cached, so later fetches return the
//! same instance.
//!
//! # Example
//!
//! ```
//! use gateau_middleware::{ErrorHandlerMiddleware, MiddlewareQueue, MiddlewareUnit, RequestIdMiddleware};
//!
//! let mut queue = MiddlewareQueue::new();
//! queue
//!     .add(MiddlewareUnit::instance(ErrorHandlerMiddleware::new()))
//!     .add(MiddlewareUnit::factory("request_id", RequestIdMiddleware::new));
//!
//! assert_eq!(queue.len(), 2);
//! assert_eq!(queue.names(), vec!["error_handler", "request_id"]);
//! ```

use crate::middleware::{BoxFuture, ClosureMiddleware, DoublePassMiddleware, Middleware, Next};
use crate::registry::{MiddlewareConstructor, MiddlewareRegistry};
use crate::context::MiddlewareContext;
use crate::types::{Request, Response};
use gateau_core::{GateauError, GateauResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// A middleware entry as supplied by the application.
#[derive(Clone)]
pub enum MiddlewareUnit {
    /// A logical name, resolved through the queue's [`MiddlewareRegistry`].
    Named(String),

    /// A constructor invoked once, on first use.
    Factory {
        /// Name used for anchor matching.
        name: String,
        /// Builds the instance.
        constructor: MiddlewareConstructor,
    },

    /// A ready instance.
    Instance(Arc<dyn Middleware>),

    /// A closure in the single-pass style.
    Closure(ClosureMiddleware),

    /// A closure in the legacy request/response style.
    DoublePass(DoublePassMiddleware),
}

impl MiddlewareUnit {
    /// A middleware referenced by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// A middleware built lazily by `constructor`.
    pub fn factory<F, M>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: Middleware,
    {
        Self::Factory {
            name: name.into(),
            constructor: Arc::new(move || Arc::new(constructor()) as Arc<dyn Middleware>),
        }
    }

    /// A ready middleware instance.
    pub fn instance<M: Middleware>(middleware: M) -> Self {
        Self::Instance(Arc::new(middleware))
    }

    /// A single-pass closure middleware.
    pub fn closure<F>(name: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, GateauResult<Response>>
            + Send
            + Sync
            + 'static,
    {
        Self::Closure(ClosureMiddleware::new(name, func))
    }

    /// A double-pass closure middleware.
    pub fn double_pass<F>(name: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a mut MiddlewareContext, Request, Response, Next<'a>) -> BoxFuture<'a, GateauResult<Response>>
            + Send
            + Sync
            + 'static,
    {
        Self::DoublePass(DoublePassMiddleware::new(name, func))
    }

    /// The name this entry was added under.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Named(name) | Self::Factory { name, .. } => name,
            Self::Instance(middleware) => middleware.name(),
            Self::Closure(closure) => closure.name(),
            Self::DoublePass(closure) => closure.name(),
        }
    }

    fn resolve(&self, registry: Option<&MiddlewareRegistry>) -> GateauResult<Arc<dyn Middleware>> {
        match self {
            Self::Named(name) => registry
                .ok_or_else(|| GateauError::not_resolved(name))?
                .resolve(name),
            Self::Factory { constructor, .. } => Ok(constructor()),
            Self::Instance(middleware) => Ok(Arc::clone(middleware)),
            Self::Closure(closure) => Ok(Arc::new(closure.clone())),
            Self::DoublePass(closure) => Ok(Arc::new(closure.clone())),
        }
    }
}

impl From<&str> for MiddlewareUnit {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for MiddlewareUnit {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn Middleware>> for MiddlewareUnit {
    fn from(middleware: Arc<dyn Middleware>) -> Self {
        Self::Instance(middleware)
    }
}

impl From<ClosureMiddleware> for MiddlewareUnit {
    fn from(closure: ClosureMiddleware) -> Self {
        Self::Closure(closure)
    }
}

impl From<DoublePassMiddleware> for MiddlewareUnit {
    fn from(closure: DoublePassMiddleware) -> Self {
        Self::DoublePass(closure)
    }
}

impl std::fmt::Debug for MiddlewareUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Named(_) => "Named",
            Self::Factory { .. } => "Factory",
            Self::Instance(_) => "Instance",
            Self::Closure(_) => "Closure",
            Self::DoublePass(_) => "DoublePass",
        };
        f.debug_tuple(kind).field(&self.label()).finish()
    }
}

enum SlotState {
    Raw(MiddlewareUnit),
    Resolved(Arc<dyn Middleware>),
}

/// One queue position: the name it was added under plus its lazily
/// normalized instance.
struct Slot {
    label: String,
    state: Mutex<SlotState>,
}

impl Slot {
    fn new(unit: MiddlewareUnit) -> Self {
        Self {
            label: unit.label().to_string(),
            state: Mutex::new(SlotState::Raw(unit)),
        }
    }

    fn resolve(&self, registry: Option<&MiddlewareRegistry>) -> GateauResult<Arc<dyn Middleware>> {
        let mut state = self.state.lock();
        let resolved = match &*state {
            SlotState::Resolved(middleware) => return Ok(Arc::clone(middleware)),
            SlotState::Raw(unit) => unit.resolve(registry)?,
        };
        *state = SlotState::Resolved(Arc::clone(&resolved));
        Ok(resolved)
    }

    fn matches(&self, name: &str) -> bool {
        if self.label == name {
            return true;
        }
        match &*self.state.lock() {
            SlotState::Resolved(middleware) => middleware.name() == name,
            SlotState::Raw(_) => false,
        }
    }
}

/// An ordered list of middleware entries.
///
/// The queue is built while the application configures itself and is then
/// only read while requests run. Fetching an entry never reorders the queue.
#[derive(Default)]
pub struct MiddlewareQueue {
    slots: Vec<Slot>,
    registry: Option<Arc<MiddlewareRegistry>>,
}

impl MiddlewareQueue {
    /// Creates an empty queue without a registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue that resolves names through `registry`.
    #[must_use]
    pub fn with_registry(registry: Arc<MiddlewareRegistry>) -> Self {
        Self {
            slots: Vec::new(),
            registry: Some(registry),
        }
    }

    /// Replaces the registry used for entries not yet resolved.
    pub fn set_registry(&mut self, registry: Arc<MiddlewareRegistry>) {
        self.registry = Some(registry);
    }

    /// Appends an entry.
    pub fn add(&mut self, unit: impl Into<MiddlewareUnit>) -> &mut Self {
        self.slots.push(Slot::new(unit.into()));
        self
    }

    /// Appends an entry. Alias of [`add`](Self::add).
    pub fn push(&mut self, unit: impl Into<MiddlewareUnit>) -> &mut Self {
        self.add(unit)
    }

    /// Appends several entries, keeping their relative order.
    pub fn add_many<I>(&mut self, units: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<MiddlewareUnit>,
    {
        self.slots.extend(units.into_iter().map(|unit| Slot::new(unit.into())));
        self
    }

    /// Inserts an entry at the front.
    pub fn prepend(&mut self, unit: impl Into<MiddlewareUnit>) -> &mut Self {
        self.slots.insert(0, Slot::new(unit.into()));
        self
    }

    /// Inserts an entry at `index`, shifting later entries back.
    ///
    /// An index past the end appends.
    pub fn insert_at(&mut self, index: usize, unit: impl Into<MiddlewareUnit>) -> &mut Self {
        let index = index.min(self.slots.len());
        self.slots.insert(index, Slot::new(unit.into()));
        self
    }

    /// Inserts an entry before the first entry named `anchor`.
    ///
    /// Fails with [`GateauError::MiddlewareAnchorNotFound`] when no entry
    /// matches; the queue is left unchanged.
    pub fn insert_before(&mut self, anchor: &str, unit: impl Into<MiddlewareUnit>) -> GateauResult<&mut Self> {
        let index = self
            .position_of(anchor)
            .ok_or_else(|| GateauError::anchor_not_found(anchor))?;
        Ok(self.insert_at(index, unit))
    }

    /// Inserts an entry after the first entry named `anchor`.
    ///
    /// When no entry matches, the entry is appended instead.
    pub fn insert_after(&mut self, anchor: &str, unit: impl Into<MiddlewareUnit>) -> &mut Self {
        match self.position_of(anchor) {
            Some(index) => self.insert_at(index + 1, unit),
            None => self.add(unit),
        }
    }

    /// Returns the index of the first entry named `name`.
    ///
    /// An entry matches by the name it was added under, or by the name of
    /// its instance once resolved.
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.matches(name))
    }

    /// Returns the normalized middleware at `index`, resolving it on first
    /// access. Returns `Ok(None)` past the end.
    pub fn get(&self, index: usize) -> GateauResult<Option<Arc<dyn Middleware>>> {
        let Some(slot) = self.slots.get(index) else {
            return Ok(None);
        };
        slot.resolve(self.registry.as_deref()).map(Some)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of entries. Alias of [`len`](Self::len).
    #[must_use]
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Returns true if the queue has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the names entries were added under, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.label.as_str()).collect()
    }

    /// Returns a cursor positioned at the first entry.
    #[must_use]
    pub fn cursor(&self) -> QueueCursor<'_> {
        QueueCursor {
            queue: self,
            position: 0,
        }
    }
}

impl std::fmt::Debug for MiddlewareQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareQueue")
            .field("entries", &self.names())
            .field("has_registry", &self.registry.is_some())
            .finish()
    }
}

/// A read position within a [`MiddlewareQueue`].
///
/// Cursors are independent: moving one never affects another cursor over the
/// same queue.
#[derive(Debug, Clone, Copy)]
pub struct QueueCursor<'a> {
    queue: &'a MiddlewareQueue,
    position: usize,
}

impl QueueCursor<'_> {
    /// Returns the current position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns true while the position refers to an entry.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.position < self.queue.len()
    }

    /// Returns the normalized middleware at the current position.
    pub fn current(&self) -> GateauResult<Option<Arc<dyn Middleware>>> {
        self.queue.get(self.position)
    }

    /// Moves to the next position.
    pub fn advance(&mut self) {
        self.position += 1;
    }

    /// Moves back to the first entry.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Moves to `position`, which must refer to an entry.
    pub fn seek(&mut self, position: usize) -> GateauResult<()> {
        if position >= self.queue.len() {
            return Err(GateauError::internal(format!(
                "invalid seek position ({position}), queue has {} entries",
                self.queue.len()
            )));
        }
        self.position = position;
        Ok(())
    }
}
