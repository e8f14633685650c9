//! Routing parameters and request attribute access.
//!
//! The router is an external collaborator. Its output reaches the pipeline
//! as a [`RouteParams`] value stored in the request extensions, and the
//! controller factory reads it back from there.

use serde::{Deserialize, Serialize};

use crate::types::Request;

/// Routing parameters attached to a request by the router.
///
/// # Example
///
/// ```
/// use gateau_core::{build_request, RequestExt, RouteParams};
///
/// let request = build_request("GET", "/admin/articles/view/3")
///     .unwrap()
///     .with_route_params(
///         RouteParams::new("Articles", "view")
///             .with_prefix("admin")
///             .with_pass(["3"]),
///     );
///
/// let params = request.route_params().unwrap();
/// assert_eq!(params.controller.as_deref(), Some("Articles"));
/// assert_eq!(params.pass, vec!["3".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    /// Plugin owning the controller.
    #[serde(default)]
    pub plugin: Option<String>,
    /// Controller name, e.g. `Articles`.
    #[serde(default)]
    pub controller: Option<String>,
    /// Action name, e.g. `index`.
    #[serde(default)]
    pub action: Option<String>,
    /// Routing prefix, e.g. `admin` or `admin/api`.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Requested extension, e.g. `json`.
    #[serde(default, rename = "_ext")]
    pub ext: Option<String>,
    /// Positional arguments passed to the action.
    #[serde(default)]
    pub pass: Vec<String>,
}

impl RouteParams {
    /// Creates parameters for a controller and action.
    #[must_use]
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: Some(controller.into()),
            action: Some(action.into()),
            ..Self::default()
        }
    }

    /// Sets the plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }

    /// Sets the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the extension.
    #[must_use]
    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = Some(ext.into());
        self
    }

    /// Sets the passed arguments.
    #[must_use]
    pub fn with_pass<I, S>(mut self, pass: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pass = pass.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the action name, defaulting to `index`.
    #[must_use]
    pub fn action_or_default(&self) -> &str {
        self.action.as_deref().unwrap_or("index")
    }
}

/// Extension trait for reading and attaching request attributes.
pub trait RequestExt: Sized {
    /// Returns the routing parameters, if the router attached any.
    fn route_params(&self) -> Option<&RouteParams>;

    /// Attaches routing parameters, replacing previous ones.
    fn with_route_params(self, params: RouteParams) -> Self;

    /// Returns a typed request attribute.
    fn attribute<T: Clone + Send + Sync + 'static>(&self) -> Option<&T>;

    /// Returns this request with a typed attribute attached.
    fn with_attribute<T: Clone + Send + Sync + 'static>(self, value: T) -> Self;
}

impl RequestExt for Request {
    fn route_params(&self) -> Option<&RouteParams> {
        self.extensions().get::<RouteParams>()
    }

    fn with_route_params(self, params: RouteParams) -> Self {
        self.with_attribute(params)
    }

    fn attribute<T: Clone + Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions().get::<T>()
    }

    fn with_attribute<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions_mut().insert(value);
        self
    }
}
