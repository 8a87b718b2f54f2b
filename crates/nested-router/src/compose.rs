//! Render composition
//!
//! Turns a match chain and its loader outcomes into a nested [`Composition`]:
//! the innermost node sits in the outlet of the next outer one. Composing is
//! pure; it performs no I/O and never renders by itself. The rendering
//! collaborator either walks the structure or calls [`Composition::render`]
//! to run the modules' render capabilities.

use serde::Serialize;
use serde::ser::SerializeStruct;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::context::EmptyContext;
use crate::error::{NavigationFailure, RouterError, RouterResult};
use crate::loader::OutcomeMap;
use crate::matcher::MatchResult;
use crate::module::{ErrorProps, RenderProps};
use crate::tree::{NodeId, RouteNode};
use crate::types::{Params, View};

/// One level of the composed output.
pub struct Composition<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    node: Arc<RouteNode<Ctx>>,
    data: Value,
    params: Params,
    outlet: Option<Box<Composition<Ctx>>>,
    failure: Option<NavigationFailure>,
}

impl<Ctx: Clone + Send + Sync + 'static> Composition<Ctx> {
    /// Node id.
    pub fn node_id(&self) -> &NodeId {
        self.node.id()
    }

    /// The composed node.
    pub fn node(&self) -> &Arc<RouteNode<Ctx>> {
        &self.node
    }

    /// Module name.
    pub fn module_name(&self) -> &str {
        self.node.module().name()
    }

    /// Loaded data (`null` when the node has no loader).
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Parameters bound up to and including this node.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The next inner level, if any.
    pub fn outlet(&self) -> Option<&Composition<Ctx>> {
        self.outlet.as_deref()
    }

    /// Failure presented by this level's error boundary, if any.
    pub fn failure(&self) -> Option<&NavigationFailure> {
        self.failure.as_ref()
    }

    /// True when this level renders its error boundary.
    pub fn is_boundary(&self) -> bool {
        self.failure.is_some()
    }

    /// All levels, outermost first.
    pub fn chain(&self) -> Vec<&Composition<Ctx>> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(inner) = current.outlet.as_deref() {
            chain.push(inner);
            current = inner;
        }
        chain
    }

    /// The innermost level.
    pub fn leaf(&self) -> &Composition<Ctx> {
        let mut current = self;
        while let Some(inner) = current.outlet.as_deref() {
            current = inner;
        }
        current
    }

    /// Node ids, outermost first.
    pub fn node_ids(&self) -> Vec<&NodeId> {
        self.chain().into_iter().map(Composition::node_id).collect()
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.chain().len()
    }

    /// Merge object-valued module meta from the outermost level inwards;
    /// inner keys override outer ones.
    pub fn meta(&self) -> Value {
        let mut merged = Map::new();
        for level in self.chain() {
            if let Some(Value::Object(meta)) = level.node.module().meta_value() {
                merged.extend(meta.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        Value::Object(merged)
    }

    /// Run the render capabilities innermost first, passing each view into
    /// the outlet of the level above it.
    ///
    /// Levels without a render capability pass their outlet through.
    pub fn render(&self) -> View {
        self.chain()
            .into_iter()
            .rev()
            .fold(None, |outlet, level| Some(level.render_level(outlet)))
            .unwrap_or(Value::Null)
    }

    fn render_level(&self, outlet: Option<View>) -> View {
        let module = self.node.module();

        if let (Some(failure), Some(boundary)) = (&self.failure, module.error_boundary_fn()) {
            return boundary(ErrorProps {
                node_id: self.node.id(),
                module: module.name(),
                failure,
                params: &self.params,
            });
        }

        match module.render_fn() {
            Some(render) => render(RenderProps {
                node_id: self.node.id(),
                module: module.name(),
                data: &self.data,
                params: &self.params,
                outlet,
            }),
            None => outlet.unwrap_or(Value::Null),
        }
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for Composition<Ctx> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            data: self.data.clone(),
            params: self.params.clone(),
            outlet: self.outlet.clone(),
            failure: self.failure.clone(),
        }
    }
}

impl<Ctx: Clone + Send + Sync + 'static> fmt::Debug for Composition<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composition")
            .field("node_id", self.node.id())
            .field("data", &self.data)
            .field("params", &self.params)
            .field("failure", &self.failure)
            .field("outlet", &self.outlet)
            .finish()
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Serialize for Composition<Ctx> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Composition", 6)?;
        state.serialize_field("node_id", self.node.id())?;
        state.serialize_field("module", self.node.module().name())?;
        state.serialize_field("data", &self.data)?;
        state.serialize_field("params", &self.params)?;
        state.serialize_field("failure", &self.failure)?;
        state.serialize_field("outlet", &self.outlet)?;
        state.end()
    }
}

// =============================================================================
// Composing
// =============================================================================

/// Compose a fully loaded chain.
///
/// # Errors
///
/// Returns `IncompleteOutcomes` when a node of the chain has no `Data`
/// outcome in `outcomes`.
pub fn compose<Ctx: Clone + Send + Sync + 'static>(
    matched: &MatchResult<Ctx>,
    outcomes: &OutcomeMap,
) -> RouterResult<Composition<Ctx>> {
    let mut outlet: Option<Box<Composition<Ctx>>> = None;

    for (idx, entry) in matched.entries().iter().enumerate().rev() {
        let data = outcomes
            .data(entry.id().as_str())
            .ok_or_else(|| RouterError::incomplete_outcomes(entry.id()))?;

        outlet = Some(Box::new(Composition {
            node: entry.node().clone(),
            data: data.clone(),
            params: matched.params_until(idx),
            outlet: outlet.take(),
            failure: None,
        }));
    }

    outlet
        .map(|root| *root)
        .ok_or_else(|| RouterError::internal("Cannot compose an empty match chain"))
}

/// Compose a chain whose pipeline failed, down to the nearest level that
/// declares an error boundary.
///
/// The search starts at the failing node and walks outwards. Levels above the
/// boundary render normally with their loaded data; the boundary level renders
/// the failure in place of its own output.
///
/// # Errors
///
/// Returns the failure, marked unrecoverable, when no level of the chain can
/// present it.
pub fn compose_error<Ctx: Clone + Send + Sync + 'static>(
    matched: &MatchResult<Ctx>,
    partial: &OutcomeMap,
    failure: &NavigationFailure,
) -> Result<Composition<Ctx>, NavigationFailure> {
    let entries = matched.entries();

    let boundary = failure.boundary_search_order().find_map(|id| {
        entries
            .iter()
            .position(|entry| entry.id() == id && entry.node().module().has_error_boundary())
    });

    let Some(boundary) = boundary else {
        return Err(failure.clone().unrecoverable());
    };

    let mut outlet: Option<Box<Composition<Ctx>>> = None;
    for (idx, entry) in entries.iter().enumerate().take(boundary + 1).rev() {
        let data = partial
            .data(entry.id().as_str())
            .cloned()
            .unwrap_or(Value::Null);

        outlet = Some(Box::new(Composition {
            node: entry.node().clone(),
            data,
            params: matched.params_until(idx),
            outlet: outlet.take(),
            failure: (idx == boundary).then(|| failure.clone()),
        }));
    }

    outlet
        .map(|root| *root)
        .ok_or_else(|| failure.clone().unrecoverable())
}
