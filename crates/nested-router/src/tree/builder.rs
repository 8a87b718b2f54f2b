//! Route tree compilation
//!
//! Turns declarative [`RouteDefinition`]s into frozen [`RouteNode`]s. Prefix
//! groups are expanded here, layouts become non-path-consuming nodes, and every
//! page precomputes the ordered candidate list the matcher walks.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::core::RouteTree;
use super::node::{MatchRank, NodeId, NodeKind, RouteEntry, RouteNode, SegmentPattern};
use crate::config::RouterConfig;
use crate::context::EmptyContext;
use crate::definition::{RouteDefinition, RouteKind, prefix};
use crate::error::{RouterError, RouterResult};
use crate::logging::{log_route_registered, log_tree_built};
use crate::module::RouteModule;

// =============================================================================
// Route Tree Builder
// =============================================================================

/// Fluent builder collecting definitions before compiling them into a
/// [`RouteTree`].
///
/// # Example
/// ```rust,ignore
/// let tree = RouteTreeBuilder::new()
///     .config(RouterConfig::new().with_case_sensitive(false))
///     .route(index("home"))
///     .route(route("about", "about"))
///     .merge("admin", admin_routes())
///     .build()?;
/// ```
pub struct RouteTreeBuilder<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    config: RouterConfig,
    definitions: Vec<RouteDefinition<Ctx>>,
}

impl<Ctx: Clone + Send + Sync + 'static> RouteTreeBuilder<Ctx> {
    /// Create an empty builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: RouterConfig::default(),
            definitions: Vec::new(),
        }
    }

    /// Set the configuration used when building.
    #[must_use = "This method returns a new RouteTreeBuilder and does not modify self"]
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a top-level definition.
    #[must_use = "This method returns a new RouteTreeBuilder and does not modify self"]
    pub fn route(mut self, definition: RouteDefinition<Ctx>) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add several top-level definitions.
    #[must_use = "This method returns a new RouteTreeBuilder and does not modify self"]
    pub fn routes<I>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = RouteDefinition<Ctx>>,
    {
        self.definitions.extend(definitions);
        self
    }

    /// Mount another builder's definitions under `path`.
    ///
    /// An empty path merges the definitions as siblings. The other builder's
    /// configuration is ignored.
    #[must_use = "This method returns a new RouteTreeBuilder and does not modify self"]
    pub fn merge<P: Into<String>>(mut self, path: P, other: RouteTreeBuilder<Ctx>) -> Self {
        let path = path.into();
        if path.trim_matches('/').is_empty() {
            self.definitions.extend(other.definitions);
        } else {
            self.definitions.push(prefix(path, other.definitions));
        }
        self
    }

    /// Number of top-level definitions collected so far.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True if no definition was added.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Compile the collected definitions into a frozen tree.
    pub fn build(self) -> RouterResult<RouteTree<Ctx>> {
        RouteTree::build(self.definitions, &self.config)
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Default for RouteTreeBuilder<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Compilation
// =============================================================================

/// Output of a successful compilation.
pub(crate) struct Compiled<Ctx: Clone + Send + Sync + 'static> {
    pub(crate) root: Arc<RouteNode<Ctx>>,
    pub(crate) nodes: HashMap<NodeId, Arc<RouteNode<Ctx>>>,
    pub(crate) lookup: BTreeMap<String, NodeId>,
}

pub(crate) fn compile<Ctx: Clone + Send + Sync + 'static>(
    definitions: Vec<RouteDefinition<Ctx>>,
    config: &RouterConfig,
) -> RouterResult<Compiled<Ctx>> {
    let mut compiler = Compiler {
        config,
        nodes: HashMap::new(),
        lookup: BTreeMap::new(),
    };

    let base = SegmentPattern::default();
    let children = compiler.compile_group(definitions, &base, &SegmentPattern::default(), 1)?;
    let full_pattern = full_path(&base);
    let entries = collect_entries(&children, &full_pattern, config.case_sensitive)?;

    let root = Arc::new(RouteNode {
        id: NodeId::root(),
        kind: NodeKind::Root,
        pattern: base,
        full_pattern,
        module: RouteModule::new("root"),
        children,
        depth: 0,
        entries,
    });

    log_tree_built(compiler.nodes.len(), compiler.lookup.len());

    Ok(Compiled {
        root,
        nodes: compiler.nodes,
        lookup: compiler.lookup,
    })
}

struct Compiler<'a, Ctx: Clone + Send + Sync + 'static> {
    config: &'a RouterConfig,
    nodes: HashMap<NodeId, Arc<RouteNode<Ctx>>>,
    lookup: BTreeMap<String, NodeId>,
}

impl<Ctx: Clone + Send + Sync + 'static> Compiler<'_, Ctx> {
    /// Compile one declaration group.
    ///
    /// `base` is the full pattern of the enclosing page and `prefix` the
    /// pending prefix-group path not yet attached to a page.
    fn compile_group(
        &mut self,
        definitions: Vec<RouteDefinition<Ctx>>,
        base: &SegmentPattern,
        prefix: &SegmentPattern,
        depth: usize,
    ) -> RouterResult<Vec<Arc<RouteNode<Ctx>>>> {
        let mut nodes = Vec::with_capacity(definitions.len());

        for definition in definitions {
            let (kind, path, module, children) = definition.into_parts();

            match kind {
                RouteKind::Prefix => {
                    let joined = prefix.join(&SegmentPattern::parse(&path)?)?;
                    let index_count = children
                        .iter()
                        .filter(|child| child.kind() == RouteKind::Index)
                        .count();
                    if index_count > 1 {
                        return Err(RouterError::multiple_index(&full_path(&base.join(&joined)?)));
                    }
                    nodes.extend(self.compile_group(children, base, &joined, depth)?);
                }
                RouteKind::Layout => {
                    let module = require_module(module, kind, &path)?;
                    let full_pattern = full_path(&base.join(prefix)?);
                    if children.is_empty() {
                        return Err(RouterError::invalid_definition(format!(
                            "Layout '{}' at '{}' must have children",
                            module.name(),
                            full_pattern
                        )));
                    }
                    self.check_depth(depth, &NodeId::layout(&full_pattern, module.name()))?;

                    let children = self.compile_group(children, base, prefix, depth + 1)?;
                    let id = self.layout_id(&full_pattern, module.name());
                    nodes.push(self.register(RouteNode {
                        id,
                        kind: NodeKind::Layout,
                        pattern: SegmentPattern::default(),
                        full_pattern,
                        module,
                        children,
                        depth,
                        entries: Vec::new(),
                    })?);
                }
                RouteKind::Index | RouteKind::Static | RouteKind::Dynamic => {
                    let module = require_module(module, kind, &path)?;
                    if kind == RouteKind::Index && !children.is_empty() {
                        return Err(RouterError::invalid_definition(format!(
                            "Index route '{}' cannot have children",
                            module.name()
                        )));
                    }

                    // An index with no pending prefix is a true index; inside a
                    // prefix group it becomes a page at the prefix path.
                    if kind == RouteKind::Index && prefix.is_empty() {
                        let full_pattern = full_path(base);
                        let id = NodeId::index(&full_pattern);
                        self.check_depth(depth, &id)?;
                        nodes.push(self.register(RouteNode {
                            id,
                            kind: NodeKind::Index,
                            pattern: SegmentPattern::default(),
                            full_pattern,
                            module,
                            children: Vec::new(),
                            depth,
                            entries: Vec::new(),
                        })?);
                        continue;
                    }

                    let own = SegmentPattern::parse(&path)?;
                    if kind != RouteKind::Index && own.is_empty() {
                        return Err(RouterError::invalid_definition(format!(
                            "Route '{}' has an empty path; use index() instead",
                            module.name()
                        )));
                    }

                    let pattern = prefix.join(&own)?;
                    let full = base.join(&pattern)?;
                    let full_pattern = full_path(&full);
                    let id = NodeId::page(&full_pattern);
                    self.check_depth(depth, &id)?;

                    let children =
                        self.compile_group(children, &full, &SegmentPattern::default(), depth + 1)?;
                    let entries =
                        collect_entries(&children, &full_pattern, self.config.case_sensitive)?;

                    nodes.push(self.register(RouteNode {
                        id,
                        kind: NodeKind::Page,
                        pattern,
                        full_pattern,
                        module,
                        children,
                        depth,
                        entries,
                    })?);
                }
            }
        }

        Ok(nodes)
    }

    fn check_depth(&self, depth: usize, id: &NodeId) -> RouterResult<()> {
        if depth > self.config.max_depth {
            return Err(RouterError::tree_too_deep(id.as_str(), self.config.max_depth));
        }
        Ok(())
    }

    /// Layouts own no path, so a module reused at the same anchor gets the
    /// next free ordinal instead of colliding.
    fn layout_id(&self, anchor: &str, module: &str) -> NodeId {
        let id = NodeId::layout(anchor, module);
        if !self.nodes.contains_key(&id) {
            return id;
        }

        let mut ordinal = 1;
        loop {
            let id = NodeId::layout_nth(anchor, module, ordinal);
            if !self.nodes.contains_key(&id) {
                return id;
            }
            ordinal += 1;
        }
    }

    fn register(&mut self, node: RouteNode<Ctx>) -> RouterResult<Arc<RouteNode<Ctx>>> {
        if self.nodes.contains_key(&node.id) {
            return Err(match node.kind {
                NodeKind::Index => RouterError::multiple_index(&node.full_pattern),
                _ => RouterError::duplicate_route(node.id.as_str()),
            });
        }

        if node.is_terminal() {
            match self.lookup.get(&node.full_pattern) {
                // Children register first, so an index child already owns
                // its parent's path.
                Some(existing)
                    if node.kind == NodeKind::Page
                        && self.nodes.get(existing).is_some_and(|n| n.is_index()) => {}
                Some(_) => return Err(RouterError::duplicate_route(&node.full_pattern)),
                None => {
                    self.lookup.insert(node.full_pattern.clone(), node.id.clone());
                }
            }
        }

        log_route_registered(node.id.as_str(), &node.kind.to_string(), node.module.name());

        let node = Arc::new(node);
        self.nodes.insert(node.id.clone(), node.clone());
        Ok(node)
    }
}

fn require_module<Ctx: Clone + Send + Sync + 'static>(
    module: Option<RouteModule<Ctx>>,
    kind: RouteKind,
    path: &str,
) -> RouterResult<RouteModule<Ctx>> {
    module.ok_or_else(|| {
        RouterError::invalid_definition(format!("{} route '{}' has no module", kind, path))
    })
}

fn full_path(pattern: &SegmentPattern) -> String {
    format!("/{}", pattern)
}

fn rank_of<Ctx: Clone + Send + Sync + 'static>(node: &RouteNode<Ctx>) -> MatchRank {
    if node.is_index() {
        MatchRank::Index
    } else if node.pattern.has_splat() {
        MatchRank::Splat
    } else if node.pattern.is_dynamic() {
        MatchRank::Dynamic
    } else {
        MatchRank::Static
    }
}

fn flatten<Ctx: Clone + Send + Sync + 'static>(
    children: &[Arc<RouteNode<Ctx>>],
    via: &mut Vec<Arc<RouteNode<Ctx>>>,
    out: &mut Vec<RouteEntry<Ctx>>,
) {
    for child in children {
        if child.is_layout() {
            via.push(child.clone());
            flatten(&child.children, via, out);
            via.pop();
        } else {
            out.push(RouteEntry {
                via: via.clone(),
                target: child.clone(),
                rank: rank_of(child),
            });
        }
    }
}

/// Flatten layouts out of a sibling group, order candidates by rank
/// (stable, so declaration order breaks ties), and validate the group.
fn collect_entries<Ctx: Clone + Send + Sync + 'static>(
    children: &[Arc<RouteNode<Ctx>>],
    parent_pattern: &str,
    case_sensitive: bool,
) -> RouterResult<Vec<RouteEntry<Ctx>>> {
    let mut entries = Vec::new();
    flatten(children, &mut Vec::new(), &mut entries);
    entries.sort_by_key(|entry| entry.rank);

    let mut has_index = false;
    let mut shapes = HashSet::new();
    for entry in &entries {
        match entry.target.kind {
            NodeKind::Index if has_index => {
                return Err(RouterError::multiple_index(parent_pattern));
            }
            NodeKind::Index => has_index = true,
            NodeKind::Page => {
                if !shapes.insert(entry.target.pattern.shape(case_sensitive)) {
                    return Err(RouterError::duplicate_route(&entry.target.full_pattern));
                }
            }
            NodeKind::Root | NodeKind::Layout => {}
        }
    }

    Ok(entries)
}
