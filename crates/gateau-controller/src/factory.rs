//! Resolves routing parameters to controller instances.
//!
//! Controllers are registered under a class key built from the routing
//! parameters: `[Plugin.][Prefix/]Controller`, for example `Articles`,
//! `Admin/Articles` or `Blog.Admin/Articles`. Prefix segments are camelized,
//! so a router prefix of `admin/api_v2` maps to `Admin/ApiV2`.

use crate::controller::{Controller, ControllerState};
use gateau_core::{GateauError, GateauResult, Request, RequestExt, Response, RouteParams};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a controller from its initial state.
pub type ControllerConstructor = Arc<dyn Fn(ControllerState) -> Box<dyn Controller> + Send + Sync>;

/// Registry of controller constructors keyed by class key.
///
/// # Example
///
/// ```
/// use gateau_controller::ControllerFactory;
/// use gateau_core::RouteParams;
///
/// let params = RouteParams::new("Articles", "index")
///     .with_plugin("Blog")
///     .with_prefix("admin/api_v2");
///
/// assert_eq!(ControllerFactory::class_key(&params).unwrap(), "Blog.Admin/ApiV2/Articles");
/// ```
#[derive(Default, Clone)]
pub struct ControllerFactory {
    constructors: HashMap<String, ControllerConstructor>,
}

impl ControllerFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller under `class_key`.
    pub fn register<F, C>(&mut self, class_key: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(ControllerState) -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        let constructor: ControllerConstructor =
            Arc::new(move |state| Box::new(constructor(state)) as Box<dyn Controller>);
        self.constructors.insert(class_key.into(), constructor);
        self
    }

    /// Returns true if a controller is registered under `class_key`.
    #[must_use]
    pub fn contains(&self, class_key: &str) -> bool {
        self.constructors.contains_key(class_key)
    }

    /// Returns the registered class keys, sorted.
    #[must_use]
    pub fn class_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Builds the class key for `params`.
    ///
    /// Returns `None` when the controller name is missing or malformed: it
    /// must start with an uppercase ASCII letter and must not contain `\`,
    /// `/` or `.`.
    #[must_use]
    pub fn class_key(params: &RouteParams) -> Option<String> {
        let controller = params.controller.as_deref()?;
        if !is_valid_controller_name(controller) {
            return None;
        }

        let mut key = String::new();
        if let Some(plugin) = params.plugin.as_deref().filter(|p| !p.is_empty()) {
            key.push_str(plugin);
            key.push('.');
        }
        if let Some(prefix) = params.prefix.as_deref().filter(|p| !p.is_empty()) {
            let camelized: Vec<String> = prefix.split('/').map(camelize).collect();
            key.push_str(&camelized.join("/"));
            key.push('/');
        }
        key.push_str(controller);
        Some(key)
    }

    /// Builds the controller for `request`, seeded with `response`.
    ///
    /// Fails with [`GateauError::MissingController`] when the request has no
    /// valid controller name or nothing is registered under its class key.
    pub fn create(&self, request: Request, response: Response) -> GateauResult<Box<dyn Controller>> {
        let params = request.route_params().cloned().unwrap_or_default();

        let constructor = Self::class_key(&params)
            .and_then(|key| self.constructors.get(&key))
            .ok_or_else(|| missing_controller(&params))?;

        let name = params.controller.unwrap_or_default();
        Ok(constructor(ControllerState::new(name, request, response)))
    }
}

impl std::fmt::Debug for ControllerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerFactory")
            .field("class_keys", &self.class_keys())
            .finish()
    }
}

fn missing_controller(params: &RouteParams) -> GateauError {
    GateauError::missing_controller(
        params.controller.clone().unwrap_or_default(),
        params.plugin.clone(),
        params.prefix.clone(),
        params.ext.clone(),
    )
}

fn is_valid_controller_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && !name.contains(['\\', '/', '.'])
}

/// `admin_panel` and `admin-panel` become `AdminPanel`.
fn camelize(segment: &str) -> String {
    segment
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect()
}
