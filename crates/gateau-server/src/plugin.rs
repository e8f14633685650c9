//! Plugins: packaged bootstrap logic and middleware.
//!
//! A plugin contributes to two application hooks:
//!
//! - [`PluginHook::Bootstrap`] runs once the application has bootstrapped
//! - [`PluginHook::Middleware`] appends to the application's queue
//!
//! Each hook can be switched off per plugin in the [`PluginCollection`]
//! without removing the plugin.

use gateau_core::GateauResult;
use gateau_middleware::MiddlewareQueue;
use std::fmt;
use std::sync::Arc;

/// An application hook a plugin can take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginHook {
    /// Runs after the application's own bootstrap.
    Bootstrap,
    /// Adds middleware after the application's own middleware.
    Middleware,
}

impl PluginHook {
    /// Every hook, in the order the server runs them.
    pub const ALL: [PluginHook; 2] = [PluginHook::Bootstrap, PluginHook::Middleware];

    /// The hook name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bootstrap => "bootstrap",
            Self::Middleware => "middleware",
        }
    }
}

impl fmt::Display for PluginHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plugin.
///
/// # Example
///
/// ```
/// use gateau_core::GateauResult;
/// use gateau_middleware::{MiddlewareQueue, MiddlewareUnit, RequestIdMiddleware};
/// use gateau_server::Plugin;
///
/// struct Tracing;
///
/// impl Plugin for Tracing {
///     fn name(&self) -> &str {
///         "Tracing"
///     }
///
///     fn middleware(&self, mut queue: MiddlewareQueue) -> GateauResult<MiddlewareQueue> {
///         queue.add(MiddlewareUnit::instance(RequestIdMiddleware::new()));
///         Ok(queue)
///     }
/// }
/// ```
pub trait Plugin: Send + Sync + 'static {
    /// The plugin name. Names are unique within a collection.
    fn name(&self) -> &str;

    /// Runs the plugin's bootstrap logic.
    fn bootstrap(&self) -> GateauResult<()> {
        Ok(())
    }

    /// Adds the plugin's middleware to `queue`.
    fn middleware(&self, queue: MiddlewareQueue) -> GateauResult<MiddlewareQueue> {
        Ok(queue)
    }
}

struct PluginEntry {
    plugin: Arc<dyn Plugin>,
    bootstrap: bool,
    middleware: bool,
}

impl PluginEntry {
    fn is_enabled(&self, hook: PluginHook) -> bool {
        match hook {
            PluginHook::Bootstrap => self.bootstrap,
            PluginHook::Middleware => self.middleware,
        }
    }

    fn set_enabled(&mut self, hook: PluginHook, enabled: bool) {
        match hook {
            PluginHook::Bootstrap => self.bootstrap = enabled,
            PluginHook::Middleware => self.middleware = enabled,
        }
    }
}

/// Plugins in registration order.
///
/// Adding a plugin whose name is already taken replaces the old plugin in
/// place, keeping its position and its hook flags.
#[derive(Default)]
pub struct PluginCollection {
    entries: Vec<PluginEntry>,
}

impl PluginCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `plugin` with every hook enabled.
    pub fn add(&mut self, plugin: impl Plugin) -> &mut Self {
        self.add_arc(Arc::new(plugin))
    }

    /// Adds a shared plugin with every hook enabled.
    ///
    /// A plugin already registered under the same name is swapped out, and
    /// its enabled hooks carry over to the new plugin.
    pub fn add_arc(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
        match self.index_of(plugin.name()) {
            Some(index) => self.entries[index].plugin = plugin,
            None => self.entries.push(PluginEntry {
                plugin,
                bootstrap: true,
                middleware: true,
            }),
        }
        self
    }

    /// Removes the plugin called `name`, returning it.
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Plugin>> {
        let index = self.index_of(name)?;
        Some(self.entries.remove(index).plugin)
    }

    /// Returns the plugin called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.index_of(name).map(|index| &self.entries[index].plugin)
    }

    /// Returns true if a plugin called `name` is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Enables `hook` for the plugin called `name`. Returns false if there
    /// is no such plugin.
    pub fn enable(&mut self, name: &str, hook: PluginHook) -> bool {
        self.set_enabled(name, hook, true)
    }

    /// Disables `hook` for the plugin called `name`. Returns false if there
    /// is no such plugin.
    pub fn disable(&mut self, name: &str, hook: PluginHook) -> bool {
        self.set_enabled(name, hook, false)
    }

    /// Returns true if `hook` is enabled for the plugin called `name`.
    #[must_use]
    pub fn is_enabled(&self, name: &str, hook: PluginHook) -> bool {
        self.index_of(name)
            .is_some_and(|index| self.entries[index].is_enabled(hook))
    }

    /// Plugins with `hook` enabled, in registration order.
    pub fn with(&self, hook: PluginHook) -> impl Iterator<Item = &Arc<dyn Plugin>> {
        self.entries
            .iter()
            .filter(move |entry| entry.is_enabled(hook))
            .map(|entry| &entry.plugin)
    }

    /// Plugin names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.plugin.name()).collect()
    }

    /// Number of plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.plugin.name() == name)
    }

    fn set_enabled(&mut self, name: &str, hook: PluginHook, enabled: bool) -> bool {
        match self.index_of(name) {
            Some(index) => {
                self.entries[index].set_enabled(hook, enabled);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for PluginCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCollection")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Plugin for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_registration_order() {
        let mut plugins = PluginCollection::new();
        plugins.add(Named("Blog")).add(Named("Auth")).add(Named("Cache"));

        assert_eq!(plugins.names(), vec!["Blog", "Auth", "Cache"]);
        assert_eq!(plugins.len(), 3);
        assert!(plugins.has("Auth"));
        assert!(!plugins.has("Missing"));
    }

    #[test]
    fn test_same_name_replaces_in_place() {
        let mut plugins = PluginCollection::new();
        plugins.add(Named("Blog")).add(Named("Auth"));
        plugins.add(Named("Blog"));

        assert_eq!(plugins.names(), vec!["Blog", "Auth"]);
        assert!(plugins.is_enabled("Blog", PluginHook::Middleware));
    }

    #[test]
    fn test_readding_keeps_disabled_hooks() {
        let mut plugins = PluginCollection::new();
        plugins.add(Named("Blog")).add(Named("Auth"));
        plugins.disable("Blog", PluginHook::Middleware);

        plugins.add(Named("Blog"));

        assert_eq!(plugins.names(), vec!["Blog", "Auth"]);
        assert!(!plugins.is_enabled("Blog", PluginHook::Middleware));
        assert!(plugins.is_enabled("Blog", PluginHook::Bootstrap));
        let middleware: Vec<&str> = plugins.with(PluginHook::Middleware).map(|p| p.name()).collect();
        assert_eq!(middleware, vec!["Auth"]);
    }

    #[test]
    fn test_hooks_toggle_independently() {
        let mut plugins = PluginCollection::new();
        plugins.add(Named("Blog")).add(Named("Auth"));

        assert!(plugins.disable("Blog", PluginHook::Bootstrap));
        assert!(!plugins.disable("Missing", PluginHook::Bootstrap));

        let bootstrapping: Vec<&str> = plugins.with(PluginHook::Bootstrap).map(|p| p.name()).collect();
        let middleware: Vec<&str> = plugins.with(PluginHook::Middleware).map(|p| p.name()).collect();
        assert_eq!(bootstrapping, vec!["Auth"]);
        assert_eq!(middleware, vec!["Blog", "Auth"]);

        plugins.enable("Blog", PluginHook::Bootstrap);
        assert_eq!(plugins.with(PluginHook::Bootstrap).count(), 2);
    }

    #[test]
    fn test_remove() {
        let mut plugins = PluginCollection::new();
        plugins.add(Named("Blog"));

        assert_eq!(plugins.remove("Blog").map(|p| p.name().to_string()).as_deref(), Some("Blog"));
        assert!(plugins.is_empty());
        assert!(plugins.remove("Blog").is_none());
    }

    #[test]
    fn test_hook_names() {
        assert_eq!(PluginHook::Bootstrap.to_string(), "bootstrap");
        assert_eq!(PluginHook::ALL.len(), 2);
    }
}
