//! Route node model
//!
//! A [`RouteNode`] is one addressable unit of the frozen route tree: the
//! synthetic root, a page, an index page, or a layout. Nodes are created by the
//! builder and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::context::EmptyContext;
use crate::error::{RouterError, RouterResult};
use crate::module::RouteModule;
use crate::types::SPLAT_PARAM;

// =============================================================================
// Node Id
// =============================================================================

/// Stable node identifier derived from the node's full path pattern.
///
/// - pages: the full pattern, e.g. `/gallery/albums/:albumId`
/// - index pages: the parent pattern plus `#index`, e.g. `/gallery#index`
/// - layouts: the enclosing pattern plus `#layout:<module>`, e.g. `/#layout:auth`;
///   later layouts reusing the module at the same path add `@<n>`, e.g. `/#layout:auth@1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub(crate) fn page(full_pattern: &str) -> Self {
        Self(full_pattern.to_string())
    }

    pub(crate) fn index(parent_pattern: &str) -> Self {
        Self(format!("{}#index", parent_pattern))
    }

    pub(crate) fn layout(parent_pattern: &str, module: &str) -> Self {
        Self(format!("{}#layout:{}", parent_pattern, module))
    }

    /// Id of a later layout reusing a module already anchored at the same path.
    pub(crate) fn layout_nth(parent_pattern: &str, module: &str, ordinal: usize) -> Self {
        Self(format!("{}#layout:{}@{}", parent_pattern, module, ordinal))
    }

    pub(crate) fn root() -> Self {
        Self("#root".to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Segment Pattern
// =============================================================================

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal text compared against the request segment
    Static(String),
    /// Named parameter (`:name`) binding any non-empty segment
    Param(String),
    /// Trailing `*` binding the remainder of the path
    Splat,
}

impl Segment {
    fn parse(raw: &str) -> RouterResult<Self> {
        if raw.contains('?') || raw.contains('#') {
            return Err(RouterError::invalid_definition(format!(
                "Route segment '{}' may not contain '?' or '#'",
                raw
            )));
        }

        if raw == SPLAT_PARAM {
            return Ok(Self::Splat);
        }

        if raw.contains('*') {
            return Err(RouterError::invalid_definition(format!(
                "Splat must be a whole segment, found '{}'",
                raw
            )));
        }

        match raw.strip_prefix(':') {
            Some(name) => {
                validate_param_name(name)?;
                Ok(Self::Param(name.to_string()))
            }
            None => Ok(Self::Static(raw.to_string())),
        }
    }
}

fn validate_param_name(name: &str) -> RouterResult<()> {
    if name.is_empty() {
        return Err(RouterError::invalid_definition(
            "Route parameter name cannot be empty",
        ));
    }

    if name.starts_with(|ch: char| ch.is_ascii_digit()) {
        return Err(RouterError::invalid_definition(format!(
            "Route parameter '{}' cannot start with a digit",
            name
        )));
    }

    if let Some(invalid_char) = name
        .chars()
        .find(|&ch| !ch.is_ascii_alphanumeric() && ch != '_')
    {
        return Err(RouterError::invalid_definition(format!(
            "Route parameter '{}' contains invalid character: '{}'",
            name, invalid_char
        )));
    }

    Ok(())
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(lit) => f.write_str(lit),
            Self::Param(name) => write!(f, ":{}", name),
            Self::Splat => f.write_str(SPLAT_PARAM),
        }
    }
}

/// Sequence of segments a page consumes from the request path.
///
/// Index pages and layouts carry an empty pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SegmentPattern(Vec<Segment>);

impl SegmentPattern {
    /// Parse a `/`-separated pattern such as `albums/:albumId` or `files/*`.
    ///
    /// Empty segments (leading, trailing, or doubled slashes) are ignored.
    pub fn parse(path: &str) -> RouterResult<Self> {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect::<RouterResult<Vec<_>>>()?;

        if let Some(pos) = segments.iter().position(|s| matches!(s, Segment::Splat)) {
            if pos + 1 != segments.len() {
                return Err(RouterError::invalid_definition(format!(
                    "Splat must be the last segment of '{}'",
                    path
                )));
            }
        }

        Ok(Self(segments))
    }

    /// Concatenate two patterns.
    pub(crate) fn join(&self, other: &SegmentPattern) -> RouterResult<Self> {
        if matches!(self.0.last(), Some(Segment::Splat)) && !other.is_empty() {
            return Err(RouterError::invalid_definition(format!(
                "Cannot nest '{}' under splat prefix '{}'",
                other, self
            )));
        }
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Ok(Self(segments))
    }

    /// The segments of this pattern.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty pattern.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any segment is a parameter or splat.
    pub fn is_dynamic(&self) -> bool {
        self.0.iter().any(|s| !matches!(s, Segment::Static(_)))
    }

    /// True when the pattern ends with a splat.
    pub fn has_splat(&self) -> bool {
        matches!(self.0.last(), Some(Segment::Splat))
    }

    /// Names of the parameters bound by this pattern, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Splat => Some(SPLAT_PARAM),
            Segment::Static(_) => None,
        })
    }

    /// Pattern with parameter names erased, used for duplicate detection.
    ///
    /// `users/:id` and `users/:userId` share the shape `users/:`.
    pub(crate) fn shape(&self, case_sensitive: bool) -> String {
        self.0
            .iter()
            .map(|s| match s {
                Segment::Static(lit) if case_sensitive => lit.clone(),
                Segment::Static(lit) => lit.to_lowercase(),
                Segment::Param(_) => ":".to_string(),
                Segment::Splat => SPLAT_PARAM.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for SegmentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/");
        f.write_str(&joined)
    }
}

// =============================================================================
// Route Node
// =============================================================================

/// Kind of a normalized route node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Synthetic tree root, never part of a match chain
    Root,
    /// Path-consuming page (static or dynamic pattern)
    Page,
    /// Page rendered when its parent's path is matched exactly
    Index,
    /// Wraps descendants without consuming a path segment
    Layout,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Page => write!(f, "page"),
            Self::Index => write!(f, "index"),
            Self::Layout => write!(f, "layout"),
        }
    }
}

/// Matching priority within a sibling group. Lower ranks are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum MatchRank {
    Index,
    Static,
    Dynamic,
    Splat,
}

/// A node reachable from a page or the root once layouts are flattened.
///
/// `via` holds the layouts wrapping `target`, outermost first.
pub(crate) struct RouteEntry<Ctx: Clone + Send + Sync + 'static> {
    pub(crate) via: Vec<Arc<RouteNode<Ctx>>>,
    pub(crate) target: Arc<RouteNode<Ctx>>,
    pub(crate) rank: MatchRank,
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for RouteEntry<Ctx> {
    fn clone(&self) -> Self {
        Self {
            via: self.via.clone(),
            target: self.target.clone(),
            rank: self.rank,
        }
    }
}

/// Immutable node of the route tree.
pub struct RouteNode<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) pattern: SegmentPattern,
    pub(crate) full_pattern: String,
    pub(crate) module: RouteModule<Ctx>,
    pub(crate) children: Vec<Arc<RouteNode<Ctx>>>,
    pub(crate) depth: usize,
    /// Candidates for the next match step, in priority order. Empty on layouts.
    pub(crate) entries: Vec<RouteEntry<Ctx>>,
}

impl<Ctx: Clone + Send + Sync + 'static> RouteNode<Ctx> {
    /// Stable node id.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Node kind.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Segments this node consumes, relative to its parent page.
    pub fn pattern(&self) -> &SegmentPattern {
        &self.pattern
    }

    /// Full path pattern from the root, e.g. `/gallery/albums/:albumId`.
    pub fn full_pattern(&self) -> &str {
        &self.full_pattern
    }

    /// The module backing this node.
    pub fn module(&self) -> &RouteModule<Ctx> {
        &self.module
    }

    /// Child nodes in declaration order.
    pub fn children(&self) -> &[Arc<RouteNode<Ctx>>] {
        &self.children
    }

    /// Distance from the root (the root is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True for layout nodes, which join the match chain without consuming path.
    pub fn is_layout(&self) -> bool {
        self.kind == NodeKind::Layout
    }

    /// True for index nodes.
    pub fn is_index(&self) -> bool {
        self.kind == NodeKind::Index
    }

    /// True if this node can end a match: index and page nodes.
    ///
    /// A page with children ends a match on its own path only when it has no
    /// index child.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Index | NodeKind::Page)
    }
}

impl<Ctx: Clone + Send + Sync + 'static> fmt::Debug for RouteNode<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("pattern", &self.pattern.to_string())
            .field("module", &self.module.name())
            .field("children", &self.children)
            .finish()
    }
}
