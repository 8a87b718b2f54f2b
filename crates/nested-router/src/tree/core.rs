//! The frozen route tree and its process-wide slot

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::builder::{Compiled, compile};
use super::node::{NodeId, RouteNode, Segment, SegmentPattern};
use crate::config::RouterConfig;
use crate::context::EmptyContext;
use crate::definition::RouteDefinition;
use crate::error::{RouterError, RouterErrorCode, RouterResult};
use crate::logging::log_tree_installed;
use crate::matcher::{MatchResult, match_path};
use crate::types::{Params, SPLAT_PARAM};

// =============================================================================
// Route Tree
// =============================================================================

struct TreeInner<Ctx: Clone + Send + Sync + 'static> {
    root: Arc<RouteNode<Ctx>>,
    nodes: HashMap<NodeId, Arc<RouteNode<Ctx>>>,
    lookup: BTreeMap<String, NodeId>,
    config: RouterConfig,
}

/// Immutable, normalized route tree.
///
/// Cloning is cheap and clones share the same nodes. There is no mutating
/// API: concurrent navigations always observe the same tree.
///
/// # Example
/// ```rust,ignore
/// let tree: RouteTree = RouteTree::build(
///     vec![
///         index("home"),
///         route("gallery", "gallery").children(vec![
///             index("gallery-home"),
///             route("albums/:albumId", "gallery-album"),
///         ]),
///     ],
///     &RouterConfig::default(),
/// )?;
///
/// let matched = tree.match_path("/gallery/albums/42")?;
/// assert_eq!(matched.module_names(), vec!["gallery", "gallery-album"]);
/// ```
pub struct RouteTree<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    inner: Arc<TreeInner<Ctx>>,
}

impl<Ctx: Clone + Send + Sync + 'static> RouteTree<Ctx> {
    /// Compile definitions into a frozen tree.
    ///
    /// # Errors
    ///
    /// Returns a configuration error (`DuplicateRoute`, `MultipleIndex`,
    /// `InvalidDefinition`, `TreeTooDeep`) when the definitions are malformed
    /// or the configuration is invalid.
    pub fn build(definitions: Vec<RouteDefinition<Ctx>>, config: &RouterConfig) -> RouterResult<Self> {
        config.validate().map_err(|e| {
            RouterError::invalid_definition(format!("Invalid router config: {}", e))
        })?;

        let Compiled {
            root,
            nodes,
            lookup,
        } = compile(definitions, config)?;

        Ok(Self {
            inner: Arc::new(TreeInner {
                root,
                nodes,
                lookup,
                config: config.clone(),
            }),
        })
    }

    /// The synthetic root node.
    pub fn root(&self) -> &Arc<RouteNode<Ctx>> {
        &self.inner.root
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Arc<RouteNode<Ctx>>> {
        self.inner.nodes.get(id)
    }

    /// Node id of the routable endpoint registered under a full pattern.
    pub fn lookup(&self, pattern: &str) -> Option<&NodeId> {
        self.inner.lookup.get(pattern)
    }

    /// Routable endpoints as `(full pattern, node id)`, sorted by pattern.
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &NodeId)> {
        self.inner.lookup.iter().map(|(pattern, id)| (pattern.as_str(), id))
    }

    /// Number of nodes, excluding the root.
    pub fn len(&self) -> usize {
        self.inner.nodes.len()
    }

    /// True if the tree has no routes.
    pub fn is_empty(&self) -> bool {
        self.inner.nodes.is_empty()
    }

    /// Configuration the tree was built with.
    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// Resolve a request path into its match chain.
    pub fn match_path(&self, path: &str) -> RouterResult<MatchResult<Ctx>> {
        match_path(self, path)
    }

    /// Build the URL of a node by filling its pattern with `params`.
    ///
    /// # Example
    /// ```rust,ignore
    /// let params = Params::from([("albumId".to_string(), "42".to_string())]);
    /// assert_eq!(tree.href("/gallery/albums/:albumId", &params)?, "/gallery/albums/42");
    /// ```
    pub fn href(&self, node_id: &str, params: &Params) -> RouterResult<String> {
        let node = self.node(node_id).ok_or_else(|| {
            RouterError::new(
                RouterErrorCode::NoMatchFound,
                format!("Unknown route '{}'", node_id),
            )
        })?;

        let pattern = SegmentPattern::parse(node.full_pattern())?;
        let mut parts = Vec::with_capacity(pattern.len());
        for segment in pattern.segments() {
            let part = match segment {
                Segment::Static(lit) => lit.as_str(),
                Segment::Param(name) => params
                    .get(name)
                    .map(String::as_str)
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| RouterError::missing_parameter(node.id(), name))?,
                Segment::Splat => params
                    .get(SPLAT_PARAM)
                    .map(String::as_str)
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| RouterError::missing_parameter(node.id(), SPLAT_PARAM))?,
            };
            parts.push(part.trim_matches('/'));
        }

        Ok(format!("/{}", parts.join("/")))
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for RouteTree<Ctx> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Ctx: Clone + Send + Sync + 'static> fmt::Debug for RouteTree<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTree")
            .field("patterns", &self.inner.lookup)
            .field("config", &self.inner.config)
            .finish()
    }
}

// =============================================================================
// Tree Slot
// =============================================================================

/// Once-only holder for the process-wide route tree.
///
/// # Example
/// ```rust,ignore
/// static ROUTES: TreeSlot = TreeSlot::new();
///
/// ROUTES.install(build_routes()?)?;
/// let tree = ROUTES.get().expect("routes installed at startup");
/// ```
pub struct TreeSlot<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    cell: OnceLock<RouteTree<Ctx>>,
}

impl<Ctx: Clone + Send + Sync + 'static> TreeSlot<Ctx> {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Install the tree.
    ///
    /// # Errors
    ///
    /// Returns `ImmutableTree` if a tree was already installed; the installed
    /// tree is left untouched.
    pub fn install(&self, tree: RouteTree<Ctx>) -> RouterResult<&RouteTree<Ctx>> {
        let mut installed = false;
        let current = self.cell.get_or_init(|| {
            installed = true;
            tree
        });

        if installed {
            log_tree_installed(current.len());
            Ok(current)
        } else {
            Err(RouterError::immutable_tree())
        }
    }

    /// The installed tree, if any.
    pub fn get(&self) -> Option<&RouteTree<Ctx>> {
        self.cell.get()
    }

    /// True once a tree has been installed.
    pub fn is_installed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Default for TreeSlot<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}
