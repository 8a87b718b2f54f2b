//! Navigation facade: match, load, compose
//!
//! The [`Navigator`] ties the pieces together for one route tree. Each
//! navigation is registered with a [`NavigationManager`] under a key, so
//! starting a new navigation under the same key cancels the previous one.
//!
//! # Example
//! ```rust,ignore
//! let navigator = Navigator::new(tree, AppContext::default());
//!
//! match navigator.navigate("/gallery/albums/42").await? {
//!     NavigationOutcome::Rendered(composition) => present(composition.render()),
//!     NavigationOutcome::Redirect(target) => history.replace(target),
//!     NavigationOutcome::Fallback { composition, .. } => present(composition.render()),
//!     NavigationOutcome::Failed(failure) => show_error_page(failure),
//!     NavigationOutcome::Cancelled => {}
//! }
//! ```

use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::compose::{Composition, compose, compose_error};
use crate::context::EmptyContext;
use crate::error::{NavigationFailure, RouterErrorCode, RouterResult};
use crate::loader::{LoaderPipeline, NavigationManager, NavigationToken, PipelineOutcome};
use crate::logging::{NavigationLogEvent, OutcomeKind, log_navigation_event};
use crate::tree::RouteTree;

/// Key used by [`Navigator::navigate`].
pub const DEFAULT_NAVIGATION_KEY: &str = "default";

/// Result of a navigation, handed to the rendering collaborator.
pub enum NavigationOutcome<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    /// The chain loaded and composed
    Rendered(Composition<Ctx>),
    /// A loader asked to navigate elsewhere
    Redirect(String),
    /// A loader failed and an error boundary presents the failure
    Fallback {
        /// Chain composed down to the boundary
        composition: Composition<Ctx>,
        /// The failure being presented
        failure: NavigationFailure,
    },
    /// Nothing in the chain can present the failure
    Failed(NavigationFailure),
    /// Superseded or cancelled; nothing to apply
    Cancelled,
}

impl<Ctx: Clone + Send + Sync + 'static> NavigationOutcome<Ctx> {
    /// How the navigation ended.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Rendered(_) => OutcomeKind::Rendered,
            Self::Redirect(_) => OutcomeKind::Redirect,
            Self::Fallback { .. } => OutcomeKind::Fallback,
            Self::Failed(_) => OutcomeKind::Failed,
            Self::Cancelled => OutcomeKind::Cancelled,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        self.kind().as_str()
    }

    /// The composition to present, if any.
    pub fn composition(&self) -> Option<&Composition<Ctx>> {
        match self {
            Self::Rendered(composition) | Self::Fallback { composition, .. } => Some(composition),
            _ => None,
        }
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&NavigationFailure> {
        match self {
            Self::Fallback { failure, .. } | Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// True for [`NavigationOutcome::Rendered`].
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }

    /// True for [`NavigationOutcome::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    fn log_event(&self, token: &NavigationToken, path: &str, started: Instant) {
        let mut event = NavigationLogEvent::new(token.id(), path, self.kind())
            .with_duration(started.elapsed());

        match self {
            Self::Rendered(composition) => event = event.with_node(composition.leaf().node_id().as_str()),
            Self::Redirect(target) => event = event.with_redirect(target.as_str()),
            Self::Fallback { failure, .. } | Self::Failed(failure) => {
                if let Some(node_id) = &failure.node_id {
                    event = event.with_node(node_id.as_str());
                }
                if let Some(target) = &failure.redirect_target {
                    event = event.with_redirect(target.as_str());
                }
            }
            Self::Cancelled => {}
        }

        log_navigation_event(&event);
    }
}

impl<Ctx: Clone + Send + Sync + 'static> fmt::Debug for NavigationOutcome<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rendered(composition) => f.debug_tuple("Rendered").field(composition).finish(),
            Self::Redirect(target) => f.debug_tuple("Redirect").field(target).finish(),
            Self::Fallback {
                composition,
                failure,
            } => f
                .debug_struct("Fallback")
                .field("composition", composition)
                .field("failure", failure)
                .finish(),
            Self::Failed(failure) => f.debug_tuple("Failed").field(failure).finish(),
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Resolves paths against a route tree.
pub struct Navigator<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    tree: RouteTree<Ctx>,
    pipeline: LoaderPipeline<Ctx>,
    manager: Arc<NavigationManager>,
}

impl<Ctx: Clone + Send + Sync + 'static> Navigator<Ctx> {
    /// Create a navigator. Loader timeouts and redirect handling follow the
    /// tree's configuration.
    pub fn new(tree: RouteTree<Ctx>, ctx: Ctx) -> Self {
        let pipeline = LoaderPipeline::new(ctx, tree.config());
        Self {
            tree,
            pipeline,
            manager: Arc::new(NavigationManager::new()),
        }
    }

    /// Share a navigation registry with other navigators.
    #[must_use = "This method returns a new Navigator and does not modify self"]
    pub fn with_manager(mut self, manager: Arc<NavigationManager>) -> Self {
        self.manager = manager;
        self
    }

    /// The route tree.
    pub fn tree(&self) -> &RouteTree<Ctx> {
        &self.tree
    }

    /// The navigation registry.
    pub fn manager(&self) -> &Arc<NavigationManager> {
        &self.manager
    }

    /// Navigate under [`DEFAULT_NAVIGATION_KEY`].
    pub async fn navigate(&self, path: &str) -> RouterResult<NavigationOutcome<Ctx>> {
        self.navigate_keyed(DEFAULT_NAVIGATION_KEY, path).await
    }

    /// Navigate under `key`, superseding the navigation in flight for it.
    ///
    /// # Errors
    ///
    /// Only internal errors are returned as `Err`; unmatched paths, loader
    /// failures, and cancellation are navigation outcomes.
    pub async fn navigate_keyed(&self, key: &str, path: &str) -> RouterResult<NavigationOutcome<Ctx>> {
        let token = self.manager.begin(key);
        let outcome = self.resolve(path, &token).await;
        self.manager.finish(key, &token);
        outcome
    }

    /// Resolve `path` under a caller-owned token, following redirects when
    /// the configuration asks for it.
    pub async fn resolve(&self, path: &str, token: &NavigationToken) -> RouterResult<NavigationOutcome<Ctx>> {
        let started = Instant::now();
        let config = self.tree.config();
        let mut current = path.to_string();
        let mut followed = 0;

        let outcome = loop {
            let outcome = self.resolve_once(&current, token).await?;
            match outcome {
                NavigationOutcome::Redirect(target) if config.follow_redirects => {
                    if token.is_cancelled() {
                        break NavigationOutcome::Cancelled;
                    }
                    followed += 1;
                    if followed > config.max_redirects {
                        break NavigationOutcome::Failed(NavigationFailure::redirect_loop(target));
                    }
                    tracing::debug!(
                        navigation_id = %token.id().short(),
                        from = %current,
                        to = %target,
                        "Following redirect"
                    );
                    current = target;
                }
                other => break other,
            }
        };

        outcome.log_event(token, path, started);
        Ok(outcome)
    }

    /// Resolve several paths concurrently, each under its own token.
    ///
    /// Prefetches are not registered with the manager and never supersede a
    /// keyed navigation. Results are in input order.
    pub async fn prefetch<I, S>(&self, paths: I) -> Vec<RouterResult<NavigationOutcome<Ctx>>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let navigations = paths.into_iter().map(|path| {
            let path = path.as_ref().to_string();
            async move {
                let token = NavigationToken::new();
                self.resolve(&path, &token).await
            }
        });
        join_all(navigations).await
    }

    /// Cancel the navigation in flight under `key`.
    pub fn cancel(&self, key: &str) -> bool {
        self.manager.cancel(key)
    }

    /// Cancel every navigation in flight.
    pub fn cancel_all(&self) -> usize {
        self.manager.cancel_all()
    }

    async fn resolve_once(&self, path: &str, token: &NavigationToken) -> RouterResult<NavigationOutcome<Ctx>> {
        let matched = match self.tree.match_path(path) {
            Ok(matched) => matched,
            Err(e) if e.code == RouterErrorCode::NoMatchFound => {
                return Ok(NavigationOutcome::Failed(NavigationFailure::no_match()));
            }
            Err(e) => return Err(e),
        };

        let outcome = match self.pipeline.run(&matched, token).await {
            PipelineOutcome::Complete(outcomes) => NavigationOutcome::Rendered(compose(&matched, &outcomes)?),
            PipelineOutcome::Redirect { target, .. } => NavigationOutcome::Redirect(target),
            PipelineOutcome::Failed { failure, partial } => {
                match compose_error(&matched, &partial, &failure) {
                    Ok(composition) => NavigationOutcome::Fallback {
                        composition,
                        failure,
                    },
                    Err(unrecoverable) => NavigationOutcome::Failed(unrecoverable),
                }
            }
            PipelineOutcome::Cancelled => NavigationOutcome::Cancelled,
        };

        Ok(outcome)
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for Navigator<Ctx> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            pipeline: self.pipeline.clone(),
            manager: self.manager.clone(),
        }
    }
}
