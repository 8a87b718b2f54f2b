//! Declarative route definitions
//!
//! Definitions are plain values describing the route hierarchy. They are
//! compiled once into a frozen [`RouteTree`](crate::RouteTree) and never
//! consulted again.
//!
//! # Example
//! ```rust,ignore
//! use nested_router::prelude::*;
//!
//! let routes = vec![
//!     index("home"),
//!     route("about", "about"),
//!     route("gallery", "gallery").children(vec![
//!         index("gallery-home"),
//!         route("albums/:albumId", "gallery-album"),
//!     ]),
//!     layout("auth", vec![route("login", "login"), route("register", "register")]),
//!     prefix("admin", vec![index("admin-home"), route("users", "admin-users")]),
//! ];
//! ```

use std::fmt;

use crate::context::EmptyContext;
use crate::module::RouteModule;
use crate::types::SPLAT_PARAM;

/// Kind of a route definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// Rendered when the enclosing path is matched exactly
    Index,
    /// Literal path segments only
    Static,
    /// At least one `:param` or trailing `*` segment
    Dynamic,
    /// Wraps its children without consuming path
    Layout,
    /// Prepends a path to its children and contributes no node
    Prefix,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => write!(f, "index"),
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
            Self::Layout => write!(f, "layout"),
            Self::Prefix => write!(f, "prefix"),
        }
    }
}

/// A user-authored route definition.
pub struct RouteDefinition<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    kind: RouteKind,
    path_segment: String,
    module: Option<RouteModule<Ctx>>,
    children: Vec<RouteDefinition<Ctx>>,
}

impl<Ctx: Clone + Send + Sync + 'static> RouteDefinition<Ctx> {
    /// Replace the children of this definition.
    #[must_use = "This method returns a new RouteDefinition and does not modify self"]
    pub fn children(mut self, children: Vec<RouteDefinition<Ctx>>) -> Self {
        self.children = children;
        self
    }

    /// Append one child.
    #[must_use = "This method returns a new RouteDefinition and does not modify self"]
    pub fn child(mut self, child: RouteDefinition<Ctx>) -> Self {
        self.children.push(child);
        self
    }

    /// Definition kind.
    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    /// Path segment(s) as written; empty for index and layout definitions.
    pub fn path_segment(&self) -> &str {
        &self.path_segment
    }

    /// The module backing this definition; `None` for prefix groups.
    pub fn module(&self) -> Option<&RouteModule<Ctx>> {
        self.module.as_ref()
    }

    /// Child definitions in declaration order.
    pub fn child_definitions(&self) -> &[RouteDefinition<Ctx>] {
        &self.children
    }

    pub(crate) fn into_parts(
        self,
    ) -> (RouteKind, String, Option<RouteModule<Ctx>>, Vec<RouteDefinition<Ctx>>) {
        (self.kind, self.path_segment, self.module, self.children)
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for RouteDefinition<Ctx> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            path_segment: self.path_segment.clone(),
            module: self.module.clone(),
            children: self.children.clone(),
        }
    }
}

impl<Ctx: Clone + Send + Sync + 'static> fmt::Debug for RouteDefinition<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("kind", &self.kind)
            .field("path_segment", &self.path_segment)
            .field("module", &self.module.as_ref().map(RouteModule::name))
            .field("children", &self.children)
            .finish()
    }
}

fn infer_kind(path: &str) -> RouteKind {
    let dynamic = path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment == SPLAT_PARAM);
    if dynamic {
        RouteKind::Dynamic
    } else {
        RouteKind::Static
    }
}

/// Index route of the enclosing group.
pub fn index<Ctx: Clone + Send + Sync + 'static>(
    module: impl Into<RouteModule<Ctx>>,
) -> RouteDefinition<Ctx> {
    RouteDefinition {
        kind: RouteKind::Index,
        path_segment: String::new(),
        module: Some(module.into()),
        children: Vec::new(),
    }
}

/// Page route. The kind is [`RouteKind::Dynamic`] when any segment is a
/// parameter or splat, [`RouteKind::Static`] otherwise.
pub fn route<Ctx: Clone + Send + Sync + 'static>(
    path: impl Into<String>,
    module: impl Into<RouteModule<Ctx>>,
) -> RouteDefinition<Ctx> {
    let path = path.into();
    RouteDefinition {
        kind: infer_kind(&path),
        path_segment: path,
        module: Some(module.into()),
        children: Vec::new(),
    }
}

/// Layout wrapping `children` without consuming path.
pub fn layout<Ctx: Clone + Send + Sync + 'static>(
    module: impl Into<RouteModule<Ctx>>,
    children: Vec<RouteDefinition<Ctx>>,
) -> RouteDefinition<Ctx> {
    RouteDefinition {
        kind: RouteKind::Layout,
        path_segment: String::new(),
        module: Some(module.into()),
        children,
    }
}

/// Prefix group: prepends `path` to every child and adds no node of its own.
pub fn prefix<Ctx: Clone + Send + Sync + 'static>(
    path: impl Into<String>,
    children: Vec<RouteDefinition<Ctx>>,
) -> RouteDefinition<Ctx> {
    RouteDefinition {
        kind: RouteKind::Prefix,
        path_segment: path.into(),
        module: None,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_kind_is_inferred() {
        let def: RouteDefinition = route("about", "about");
        assert_eq!(def.kind(), RouteKind::Static);

        let def: RouteDefinition = route("albums/:albumId", "album");
        assert_eq!(def.kind(), RouteKind::Dynamic);

        let def: RouteDefinition = route("files/*", "files");
        assert_eq!(def.kind(), RouteKind::Dynamic);
    }

    #[test]
    fn test_children_builders() {
        let def: RouteDefinition = route("gallery", "gallery")
            .children(vec![index("gallery-home")])
            .child(route("albums/:albumId", "gallery-album"));

        assert_eq!(def.child_definitions().len(), 2);
        assert_eq!(def.child_definitions()[0].kind(), RouteKind::Index);
        assert_eq!(def.module().map(RouteModule::name), Some("gallery"));
    }

    #[test]
    fn test_prefix_has_no_module() {
        let def: RouteDefinition = prefix("admin", vec![index("admin-home")]);
        assert_eq!(def.kind(), RouteKind::Prefix);
        assert!(def.module().is_none());
        assert_eq!(def.path_segment(), "admin");
    }
}
