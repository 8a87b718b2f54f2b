//! Path matching
//!
//! Resolves a request path into the chain of nodes from the outermost route to
//! the leaf. Matching is pure: it reads the frozen tree and allocates only the
//! result, so it is safe to call from any number of tasks at once.
//!
//! Descent is greedy: within each sibling group the first eligible candidate
//! is taken and its siblings are never revisited, even when its subtree fails
//! to match the rest of the path. Candidates are tried in this order:
//!
//! 1. the index route, when the remaining path is empty
//! 2. static patterns, in declaration order
//! 3. dynamic patterns, in declaration order
//! 4. splat patterns, in declaration order
//!
//! Layouts are transparent: their children take part in the parent's sibling
//! group, and the layout joins the chain whenever one of them matches.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::context::EmptyContext;
use crate::error::{RouterError, RouterResult};
use crate::tree::{NodeId, RouteEntry, RouteNode, RouteTree, Segment, SegmentPattern};
use crate::types::{Params, SPLAT_PARAM};

// =============================================================================
// Path Normalization
// =============================================================================

/// Split a request path into its non-empty segments.
///
/// The query string and fragment are dropped; leading, trailing, and doubled
/// slashes are ignored.
pub fn path_segments(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

/// Canonical form of a request path: `/` followed by its segments.
///
/// ```rust,ignore
/// assert_eq!(normalize_path("gallery//albums/42/?sort=asc"), "/gallery/albums/42");
/// ```
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path_segments(path).join("/"))
}

// =============================================================================
// Match Result
// =============================================================================

/// One step of a match chain.
pub struct MatchedNode<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    node: Arc<RouteNode<Ctx>>,
    params: Params,
}

impl<Ctx: Clone + Send + Sync + 'static> MatchedNode<Ctx> {
    /// The matched node.
    pub fn node(&self) -> &Arc<RouteNode<Ctx>> {
        &self.node
    }

    /// Node id.
    pub fn id(&self) -> &NodeId {
        self.node.id()
    }

    /// Parameters bound by this node alone; empty for layouts and index nodes.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for MatchedNode<Ctx> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            params: self.params.clone(),
        }
    }
}

impl<Ctx: Clone + Send + Sync + 'static> fmt::Debug for MatchedNode<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchedNode")
            .field("id", self.node.id())
            .field("params", &self.params)
            .finish()
    }
}

/// Ordered chain of matched nodes, outermost first, root excluded.
pub struct MatchResult<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    path: String,
    entries: Vec<MatchedNode<Ctx>>,
}

impl<Ctx: Clone + Send + Sync + 'static> MatchResult<Ctx> {
    /// Normalized request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Chain entries, outermost first.
    pub fn entries(&self) -> &[MatchedNode<Ctx>] {
        &self.entries
    }

    /// Number of nodes in the chain.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for an empty chain. A successful match is never empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The innermost node.
    pub fn leaf(&self) -> Option<&MatchedNode<Ctx>> {
        self.entries.last()
    }

    /// Node ids, outermost first.
    pub fn node_ids(&self) -> Vec<&NodeId> {
        self.entries.iter().map(MatchedNode::id).collect()
    }

    /// Module names, outermost first.
    pub fn module_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.node.module().name()).collect()
    }

    /// All parameters bound along the chain.
    pub fn params(&self) -> Params {
        self.params_until(self.entries.len().saturating_sub(1))
    }

    /// Parameters bound by the entries up to and including `idx`.
    pub fn params_until(&self, idx: usize) -> Params {
        self.entries
            .iter()
            .take(idx + 1)
            .flat_map(|e| e.params.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Ids of the entries before `idx`, outermost first.
    pub fn ancestor_ids(&self, idx: usize) -> Vec<NodeId> {
        self.entries
            .iter()
            .take(idx)
            .map(|e| e.id().clone())
            .collect()
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for MatchResult<Ctx> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<Ctx: Clone + Send + Sync + 'static> PartialEq for MatchResult<Ctx> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.id() == b.id() && a.params == b.params)
    }
}

impl<Ctx: Clone + Send + Sync + 'static> fmt::Debug for MatchResult<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("path", &self.path)
            .field("entries", &self.entries)
            .finish()
    }
}

// =============================================================================
// Matching
// =============================================================================

/// Resolve `path` against `tree`.
///
/// # Errors
///
/// Returns `NoMatchFound` when the chosen chain cannot consume the whole path,
/// or when it runs out of path on a layout instead of a page.
pub fn match_path<Ctx: Clone + Send + Sync + 'static>(
    tree: &RouteTree<Ctx>,
    path: &str,
) -> RouterResult<MatchResult<Ctx>> {
    let segments = path_segments(path);
    let case_sensitive = tree.config().case_sensitive;
    let mut chain = Vec::new();

    if !descend(tree.root(), &segments, case_sensitive, &mut chain) {
        trace!(path = %path, "No route matched");
        return Err(RouterError::no_match(path));
    }

    let result = MatchResult {
        path: format!("/{}", segments.join("/")),
        entries: chain,
    };

    if tree.config().debug_logging {
        debug!(path = %result.path, chain = ?result.node_ids(), "Route matched");
    } else {
        trace!(path = %result.path, depth = result.len(), "Route matched");
    }

    Ok(result)
}

fn descend<Ctx: Clone + Send + Sync + 'static>(
    node: &RouteNode<Ctx>,
    remaining: &[&str],
    case_sensitive: bool,
    chain: &mut Vec<MatchedNode<Ctx>>,
) -> bool {
    for entry in &node.entries {
        let target = &entry.target;

        if target.is_index() {
            if remaining.is_empty() {
                push_entry(chain, entry, Params::new());
                return true;
            }
            continue;
        }

        let Some((params, consumed)) = match_pattern(&target.pattern, remaining, case_sensitive)
        else {
            continue;
        };

        let rest = &remaining[consumed..];

        // A leaf page has nowhere to send leftover segments.
        if target.children.is_empty() && !rest.is_empty() {
            continue;
        }

        trace!(node_id = %target.id, consumed = consumed, "Candidate matched segments");

        // First eligible candidate wins; siblings are never revisited.
        push_entry(chain, entry, params);

        // With the path used up an index child is preferred, and the page
        // itself ends the match otherwise.
        return descend(target, rest, case_sensitive, chain) || rest.is_empty();
    }

    false
}

fn push_entry<Ctx: Clone + Send + Sync + 'static>(
    chain: &mut Vec<MatchedNode<Ctx>>,
    entry: &RouteEntry<Ctx>,
    params: Params,
) {
    chain.extend(entry.via.iter().map(|layout| MatchedNode {
        node: layout.clone(),
        params: Params::new(),
    }));
    chain.push(MatchedNode {
        node: entry.target.clone(),
        params,
    });
}

/// Match a page pattern against the front of `remaining`, returning the
/// bound parameters and the number of segments consumed.
fn match_pattern(
    pattern: &SegmentPattern,
    remaining: &[&str],
    case_sensitive: bool,
) -> Option<(Params, usize)> {
    let mut params = Params::new();

    for (i, segment) in pattern.segments().iter().enumerate() {
        match segment {
            Segment::Static(lit) => {
                let actual = remaining.get(i)?;
                let equal = if case_sensitive {
                    lit == actual
                } else {
                    lit.to_lowercase() == actual.to_lowercase()
                };
                if !equal {
                    return None;
                }
            }
            Segment::Param(name) => {
                let actual = remaining.get(i)?;
                params.insert(name.clone(), (*actual).to_string());
            }
            Segment::Splat => {
                let rest = remaining.get(i..).filter(|rest| !rest.is_empty())?;
                params.insert(SPLAT_PARAM.to_string(), rest.join("/"));
                return Some((params, remaining.len()));
            }
        }
    }

    Some((params, pattern.len()))
}
