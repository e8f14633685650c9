//! The application capability and a ready-made implementation.
//!
//! An [`Application`] bootstraps itself, builds the middleware queue and
//! handles whatever request reaches the end of that queue. Plugins extend
//! both bootstrap and middleware through the default
//! [`Application::plugin_bootstrap`] and [`Application::plugin_middleware`].
//!
//! [`WebApplication`] covers the common case: controllers registered in a
//! [`ControllerFactory`], named middleware in a [`MiddlewareRegistry`], and
//! unmatched requests handed to an [`ActionDispatcher`].

use crate::plugin::{Plugin, PluginCollection, PluginHook};
use gateau_config::GateauConfig;
use gateau_controller::{ActionDispatcher, ControllerFactory};
use gateau_core::{GateauResult, Request, RequestExt, Response};
use gateau_middleware::{
    BoxFuture, ErrorHandlerMiddleware, MiddlewareContext, MiddlewareQueue, MiddlewareRegistry,
    MiddlewareUnit, RequestHandler, RequestIdMiddleware,
};
use std::fmt;
use std::sync::Arc;

/// An application run by the [`Server`](crate::Server).
///
/// The [`RequestHandler`] supertrait is the terminal handler: it receives
/// every request that passes through the whole middleware queue.
pub trait Application: RequestHandler + 'static {
    /// Loads configuration and registers plugins.
    fn bootstrap(&mut self) -> GateauResult<()>;

    /// Adds the application's middleware to `queue`.
    fn middleware(&self, queue: MiddlewareQueue) -> GateauResult<MiddlewareQueue>;

    /// The application's plugins.
    fn plugins(&self) -> &PluginCollection;

    /// Bootstraps every plugin with [`PluginHook::Bootstrap`] enabled, in
    /// registration order.
    fn plugin_bootstrap(&mut self) -> GateauResult<()> {
        for plugin in self.plugins().with(PluginHook::Bootstrap) {
            tracing::debug!(plugin = plugin.name(), "bootstrapping plugin");
            plugin.bootstrap()?;
        }
        Ok(())
    }

    /// Lets every plugin with [`PluginHook::Middleware`] enabled add to
    /// `queue`, in registration order.
    fn plugin_middleware(&self, mut queue: MiddlewareQueue) -> GateauResult<MiddlewareQueue> {
        for plugin in self.plugins().with(PluginHook::Middleware) {
            tracing::debug!(plugin = plugin.name(), "adding plugin middleware");
            queue = plugin.middleware(queue)?;
        }
        Ok(queue)
    }
}

/// Builds the application middleware queue.
pub type MiddlewareBuilder =
    Arc<dyn Fn(MiddlewareQueue, &GateauConfig) -> GateauResult<MiddlewareQueue> + Send + Sync>;

/// A named bootstrap step.
pub type BootstrapHook = Arc<dyn Fn(&mut WebApplication) -> GateauResult<()> + Send + Sync>;

/// An application dispatching to controllers.
///
/// Without a custom middleware builder the queue is an
/// [`ErrorHandlerMiddleware`] (exposing details when `app.debug` is set)
/// followed by a [`RequestIdMiddleware`].
///
/// # Example
///
/// ```
/// use gateau_controller::ControllerFactory;
/// use gateau_server::WebApplication;
///
/// let app = WebApplication::builder()
///     .controllers(ControllerFactory::new())
///     .on_bootstrap("log", |app| {
///         tracing::info!(name = %app.config().app.name, "booting");
///         Ok(())
///     })
///     .build();
///
/// assert!(!app.is_bootstrapped());
/// ```
pub struct WebApplication {
    config: GateauConfig,
    plugins: PluginCollection,
    registry: Arc<MiddlewareRegistry>,
    dispatcher: ActionDispatcher,
    middleware: Option<MiddlewareBuilder>,
    bootstrap_hooks: Vec<(String, BootstrapHook)>,
    bootstrapped: bool,
}

impl WebApplication {
    /// Creates a builder.
    pub fn builder() -> WebApplicationBuilder {
        WebApplicationBuilder::new()
    }

    /// The application configuration.
    pub fn config(&self) -> &GateauConfig {
        &self.config
    }

    /// The action dispatcher used as terminal handler.
    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// The registry named queue entries are resolved from.
    pub fn registry(&self) -> &Arc<MiddlewareRegistry> {
        &self.registry
    }

    /// Mutable access to the plugins, for bootstrap hooks.
    pub fn plugins_mut(&mut self) -> &mut PluginCollection {
        &mut self.plugins
    }

    /// Adds a plugin.
    pub fn add_plugin(&mut self, plugin: impl Plugin) -> &mut Self {
        self.plugins.add(plugin);
        self
    }

    /// Returns true once [`Application::bootstrap`] has completed.
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    fn default_middleware(&self, mut queue: MiddlewareQueue) -> MiddlewareQueue {
        queue
            .add(MiddlewareUnit::instance(
                ErrorHandlerMiddleware::new().expose_details(self.config.app.debug),
            ))
            .add(MiddlewareUnit::instance(RequestIdMiddleware::new()));
        queue
    }

    /// Fills in the configured default extension on routed requests that
    /// carry none.
    fn apply_default_extension(&self, request: Request) -> Request {
        let Some(ext) = self.config.app.default_extension.as_deref() else {
            return request;
        };
        let missing = request.route_params().filter(|p| p.ext.is_none()).cloned();
        match missing {
            Some(params) => request.with_route_params(params.with_ext(ext)),
            None => request,
        }
    }
}

impl Application for WebApplication {
    fn bootstrap(&mut self) -> GateauResult<()> {
        let hooks = self.bootstrap_hooks.clone();
        for (name, hook) in &hooks {
            tracing::debug!(hook = %name, "running bootstrap hook");
            hook(self)?;
        }
        self.bootstrapped = true;
        Ok(())
    }

    fn middleware(&self, mut queue: MiddlewareQueue) -> GateauResult<MiddlewareQueue> {
        queue.set_registry(Arc::clone(&self.registry));
        match &self.middleware {
            Some(build) => build(queue, &self.config),
            None => Ok(self.default_middleware(queue)),
        }
    }

    fn plugins(&self) -> &PluginCollection {
        &self.plugins
    }
}

impl RequestHandler for WebApplication {
    fn handle<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, GateauResult<Response>> {
        let request = self.apply_default_extension(request);
        self.dispatcher.handle(ctx, request)
    }
}

impl fmt::Debug for WebApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebApplication")
            .field("name", &self.config.app.name)
            .field("plugins", &self.plugins)
            .field("controllers", &self.dispatcher.factory().class_keys())
            .field("middleware_names", &self.registry.names())
            .field("bootstrap_hooks", &self.bootstrap_hooks.len())
            .field("bootstrapped", &self.bootstrapped)
            .finish()
    }
}

/// Builder for [`WebApplication`].
#[must_use]
#[derive(Default)]
pub struct WebApplicationBuilder {
    config: GateauConfig,
    plugins: PluginCollection,
    registry: MiddlewareRegistry,
    controllers: ControllerFactory,
    middleware: Option<MiddlewareBuilder>,
    bootstrap_hooks: Vec<(String, BootstrapHook)>,
}

impl WebApplicationBuilder {
    /// Creates a builder with default configuration and no controllers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: GateauConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the controllers the dispatcher can build.
    pub fn controllers(mut self, controllers: ControllerFactory) -> Self {
        self.controllers = controllers;
        self
    }

    /// Sets the registry named queue entries resolve from.
    pub fn registry(mut self, registry: MiddlewareRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Adds a plugin.
    pub fn plugin(mut self, plugin: impl Plugin) -> Self {
        self.plugins.add(plugin);
        self
    }

    /// Replaces the default middleware with `build`.
    pub fn middleware<F>(mut self, build: F) -> Self
    where
        F: Fn(MiddlewareQueue, &GateauConfig) -> GateauResult<MiddlewareQueue> + Send + Sync + 'static,
    {
        self.middleware = Some(Arc::new(build));
        self
    }

    /// Adds a named bootstrap step. Steps run in registration order.
    pub fn on_bootstrap<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut WebApplication) -> GateauResult<()> + Send + Sync + 'static,
    {
        self.bootstrap_hooks.push((name.into(), Arc::new(hook)));
        self
    }

    /// Builds the application.
    pub fn build(self) -> WebApplication {
        WebApplication {
            config: self.config,
            plugins: self.plugins,
            registry: Arc::new(self.registry),
            dispatcher: ActionDispatcher::new(Arc::new(self.controllers)),
            middleware: self.middleware,
            bootstrap_hooks: self.bootstrap_hooks,
            bootstrapped: false,
        }
    }
}
