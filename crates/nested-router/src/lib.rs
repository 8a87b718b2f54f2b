#![warn(missing_docs)]
//! # Nested Router
//!
//! A rendering-agnostic route tree resolver with a cancellable data loading
//! pipeline.
//!
//! ## Overview
//!
//! - **Declarative definitions** for index, static, dynamic, layout, and prefix routes
//! - **Frozen route trees** validated once at startup
//! - **Path matching** with static-before-dynamic priority and declaration-order tie-breaks
//! - **Loaders** run strictly parent-to-child, each cancellable
//! - **Composition** of the matched chain into nested outlets for a renderer
//!
//! ## Architecture
//!
//! ```text
//! definitions ──► RouteTree::build ──► RouteTree (immutable, Arc-shared)
//!                                          │
//!        request path ──► match_path ──────┤
//!                                          ▼
//!                                    MatchResult
//!                                          │
//!   NavigationToken ──► LoaderPipeline::run (outer → inner, one task per loader)
//!                                          │
//!                     ┌────────────────────┼──────────────────┐
//!                     ▼                    ▼                  ▼
//!                 Complete             Redirect         Failed / Cancelled
//!                     │                                       │
//!                     ▼                                       ▼
//!                 compose ──► Composition ◄── compose_error (nearest boundary)
//! ```
//!
//! ## Quick Start
//!
//! ### 1. Define Loaders
//!
//! ```rust,ignore
//! use nested_router::prelude::*;
//!
//! #[derive(Clone)]
//! pub struct AppContext {
//!     pub albums: Arc<AlbumStore>,
//! }
//!
//! async fn load_album(args: LoaderArgs<AppContext>) -> LoaderResult<Album> {
//!     let id = args.param("albumId").unwrap_or_default();
//!     args.ctx.albums.get(id).await.ok_or_else(LoaderSignal::not_found)
//! }
//! ```
//!
//! ### 2. Build the Tree
//!
//! ```rust,ignore
//! let tree = RouteTreeBuilder::new()
//!     .route(index("home"))
//!     .route(route("about", "about"))
//!     .route(route("gallery", "gallery").children(vec![
//!         index("gallery-home"),
//!         route("albums/:albumId", RouteModule::new("gallery-album").loader(load_album)),
//!     ]))
//!     .build()?;
//! ```
//!
//! ### 3. Navigate
//!
//! ```rust,ignore
//! let navigator = Navigator::new(tree, AppContext::new());
//! let outcome = navigator.navigate("/gallery/albums/42").await?;
//! if let Some(composition) = outcome.composition() {
//!     present(composition.render());
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`definition`] - Declarative route definitions
//! - [`tree`] - Route nodes, the tree builder, and the process-wide [`TreeSlot`]
//! - [`matcher`] - Path normalization and matching
//! - [`loader`] - Loaders, outcomes, cancellation, and the pipeline
//! - [`compose`] - Render composition and error boundaries
//! - [`navigator`] - Match, load, and compose in one call
//! - [`logging`] - Structured `tracing` events
//! - [`RouterError`] - Error types and codes
//! - [`RouterConfig`] - Configuration

pub mod compose;
mod config;
mod context;
pub mod definition;
mod error;
pub mod loader;
pub mod logging;
pub mod matcher;
mod module;
pub mod navigator;
pub mod tree;
pub mod types;

#[cfg(test)]
mod tests;

// Public API
pub use compose::{Composition, compose, compose_error};
pub use config::{ConfigValidationError, RouterConfig};
pub use context::{Context, EmptyContext};
pub use definition::{RouteDefinition, RouteKind, index, layout, prefix, route};
pub use error::{
    FailureKind, LoaderError, NavigationFailure, RouterError, RouterErrorCode, RouterResult,
};
pub use loader::{
    CancellationSignal, Loader, LoaderArgs, LoaderOutcome, LoaderPipeline, LoaderResult,
    LoaderSignal, NavigationManager, NavigationToken, OutcomeMap, PipelineOutcome,
};
pub use logging::{NavigationId, OutcomeKind};
pub use matcher::{MatchResult, MatchedNode, match_path, normalize_path};
pub use module::{ErrorBoundaryFn, ErrorProps, RenderFn, RenderProps, RouteModule};
pub use navigator::{DEFAULT_NAVIGATION_KEY, NavigationOutcome, Navigator};
pub use tree::{NodeId, NodeKind, RouteNode, RouteTree, RouteTreeBuilder, SegmentPattern, TreeSlot};
pub use types::{Params, SPLAT_PARAM, View};

/// Prelude for convenient imports
///
/// ```rust,ignore
/// use nested_router::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Composition
        Composition,
        // Context
        Context,
        EmptyContext,
        // Errors
        FailureKind,
        // Loaders
        LoaderArgs,
        LoaderError,
        LoaderOutcome,
        LoaderPipeline,
        LoaderResult,
        LoaderSignal,
        // Matching
        MatchResult,
        NavigationFailure,
        // Navigation
        NavigationManager,
        NavigationOutcome,
        NavigationToken,
        Navigator,
        NodeId,
        OutcomeMap,
        Params,
        PipelineOutcome,
        RenderProps,
        // Configuration
        RouterConfig,
        RouterError,
        RouterErrorCode,
        RouterResult,
        // Tree
        RouteDefinition,
        RouteModule,
        RouteTree,
        RouteTreeBuilder,
        TreeSlot,
        compose,
        compose_error,
        index,
        layout,
        prefix,
        route,
    };
}
