//! Route modules: the units backing route nodes
//!
//! A [`RouteModule`] names a page or layout and carries its optional
//! capabilities. Each capability is an explicit `Option`, so "does this node
//! have a loader" is answered by the type, never by probing at runtime.
//!
//! ```rust,ignore
//! let album = RouteModule::new("gallery-album")
//!     .loader(load_album)
//!     .meta(json!({ "title": "Album" }))
//!     .render(|props| json!({ "album": props.data, "body": props.outlet }))
//!     .error_boundary(|props| json!({ "error": props.failure.to_string() }));
//! ```

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::context::EmptyContext;
use crate::error::NavigationFailure;
use crate::loader::handler::{BoxedLoader, Loader, into_boxed_loader};
use crate::tree::NodeId;
use crate::types::{Params, View};

/// Input of a render capability.
#[derive(Debug)]
pub struct RenderProps<'a> {
    /// Node being rendered
    pub node_id: &'a NodeId,
    /// Module name
    pub module: &'a str,
    /// Data returned by the node's loader (`null` without one)
    pub data: &'a Value,
    /// Parameters bound up to and including this node
    pub params: &'a Params,
    /// Rendered output of the next inner node, if any
    pub outlet: Option<View>,
}

/// Input of an error boundary capability.
#[derive(Debug)]
pub struct ErrorProps<'a> {
    /// Node whose boundary is rendering
    pub node_id: &'a NodeId,
    /// Module name
    pub module: &'a str,
    /// The failure being presented
    pub failure: &'a NavigationFailure,
    /// Parameters bound up to and including this node
    pub params: &'a Params,
}

/// Render capability
pub type RenderFn = Arc<dyn Fn(RenderProps<'_>) -> View + Send + Sync>;

/// Error boundary capability
pub type ErrorBoundaryFn = Arc<dyn Fn(ErrorProps<'_>) -> View + Send + Sync>;

/// Page or layout unit with optional loader, meta, render, and error boundary.
pub struct RouteModule<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    name: String,
    loader: Option<BoxedLoader<Ctx>>,
    meta: Option<Value>,
    render: Option<RenderFn>,
    error_boundary: Option<ErrorBoundaryFn>,
}

impl<Ctx: Clone + Send + Sync + 'static> RouteModule<Ctx> {
    /// Create a module with no capabilities.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loader: None,
            meta: None,
            render: None,
            error_boundary: None,
        }
    }

    /// Attach a data loader.
    pub fn loader<Output, L>(mut self, loader: L) -> Self
    where
        Output: Serialize + Send + 'static,
        L: Loader<Ctx, Output>,
    {
        self.loader = Some(into_boxed_loader(loader));
        self
    }

    /// Attach static metadata (title, description, ...).
    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Attach a render capability.
    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(RenderProps<'_>) -> View + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Attach an error boundary.
    pub fn error_boundary<F>(mut self, boundary: F) -> Self
    where
        F: Fn(ErrorProps<'_>) -> View + Send + Sync + 'static,
    {
        self.error_boundary = Some(Arc::new(boundary));
        self
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the module has a loader.
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// True if the module declares an error boundary.
    pub fn has_error_boundary(&self) -> bool {
        self.error_boundary.is_some()
    }

    /// Static metadata.
    pub fn meta_value(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    pub(crate) fn boxed_loader(&self) -> Option<&BoxedLoader<Ctx>> {
        self.loader.as_ref()
    }

    pub(crate) fn render_fn(&self) -> Option<&RenderFn> {
        self.render.as_ref()
    }

    pub(crate) fn error_boundary_fn(&self) -> Option<&ErrorBoundaryFn> {
        self.error_boundary.as_ref()
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for RouteModule<Ctx> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            loader: self.loader.clone(),
            meta: self.meta.clone(),
            render: self.render.clone(),
            error_boundary: self.error_boundary.clone(),
        }
    }
}

impl<Ctx: Clone + Send + Sync + 'static> fmt::Debug for RouteModule<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteModule")
            .field("name", &self.name)
            .field("has_loader", &self.loader.is_some())
            .field("meta", &self.meta)
            .field("has_render", &self.render.is_some())
            .field("has_error_boundary", &self.error_boundary.is_some())
            .finish()
    }
}

impl<Ctx: Clone + Send + Sync + 'static> From<&str> for RouteModule<Ctx> {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl<Ctx: Clone + Send + Sync + 'static> From<String> for RouteModule<Ctx> {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
