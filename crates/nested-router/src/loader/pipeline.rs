//! Parent-to-child loader pipeline
//!
//! Every loader of a match chain runs in its own spawned task. The pipeline
//! awaits each task before issuing the next, so a loader can always rely on
//! the data of the loaders above it. Each task races the navigation's
//! cancellation token: once cancelled, no further loader is started and any
//! outcome still in flight is dropped.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::cancel::NavigationToken;
use super::handler::{BoxedLoader, LoaderArgs};
use super::outcome::{LoaderOutcome, OutcomeMap};
use crate::Context;
use crate::config::RouterConfig;
use crate::context::EmptyContext;
use crate::error::{LoaderError, NavigationFailure};
use crate::matcher::MatchResult;
use crate::tree::NodeId;

/// Overall result of running the pipeline over a match chain.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Every node produced data; the map covers the whole chain
    Complete(OutcomeMap),
    /// A loader redirected; deeper loaders were never invoked
    Redirect {
        /// Node whose loader redirected
        node_id: NodeId,
        /// Redirect target
        target: String,
    },
    /// A loader reported not-found or failed
    Failed {
        /// Failure attributed to the node and its ancestors
        failure: NavigationFailure,
        /// Outcomes recorded up to and including the failing node
        partial: OutcomeMap,
    },
    /// The navigation was cancelled; nothing may be applied
    Cancelled,
}

impl PipelineOutcome {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Complete(_) => "complete",
            Self::Redirect { .. } => "redirect",
            Self::Failed { .. } => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// True for [`PipelineOutcome::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Runs the loaders of a match chain.
///
/// # Example
/// ```rust,ignore
/// let pipeline = LoaderPipeline::new(AppContext::default(), tree.config());
/// let matched = tree.match_path("/gallery/albums/42")?;
/// match pipeline.run(&matched, &NavigationToken::new()).await {
///     PipelineOutcome::Complete(outcomes) => compose(&matched, &outcomes)?,
///     other => ...,
/// }
/// ```
pub struct LoaderPipeline<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    ctx: Context<Ctx>,
    timeout: Option<Duration>,
    debug_logging: bool,
}

impl<Ctx: Clone + Send + Sync + 'static> LoaderPipeline<Ctx> {
    /// Create a pipeline owning `ctx`.
    pub fn new(ctx: Ctx, config: &RouterConfig) -> Self {
        Self::with_context(Context::new(ctx), config)
    }

    /// Create a pipeline sharing an existing context.
    pub fn with_context(ctx: Context<Ctx>, config: &RouterConfig) -> Self {
        Self {
            ctx,
            timeout: config.loader_timeout(),
            debug_logging: config.debug_logging,
        }
    }

    /// Application context handed to loaders.
    pub fn context(&self) -> &Context<Ctx> {
        &self.ctx
    }

    /// Run every loader of `matched`, outermost first.
    pub async fn run(&self, matched: &MatchResult<Ctx>, token: &NavigationToken) -> PipelineOutcome {
        let mut outcomes = OutcomeMap::with_capacity(matched.len());
        let mut loaded: Vec<(NodeId, Value)> = Vec::with_capacity(matched.len());

        for (idx, entry) in matched.entries().iter().enumerate() {
            if token.is_cancelled() {
                debug!(
                    navigation_id = %token.id().short(),
                    next_node = %entry.id(),
                    "Pipeline cancelled before loader"
                );
                return PipelineOutcome::Cancelled;
            }

            let node_id = entry.id().clone();
            let outcome = match entry.node().module().boxed_loader() {
                None => LoaderOutcome::empty(),
                Some(loader) => {
                    let args = LoaderArgs {
                        ctx: self.ctx.clone(),
                        node_id: node_id.clone(),
                        path: matched.path().to_string(),
                        params: matched.params_until(idx),
                        own_params: entry.params().clone(),
                        ancestors: Arc::new(loaded.clone()),
                        token: token.clone(),
                    };
                    match self.invoke(loader, args, token).await {
                        Some(outcome) => outcome,
                        None => {
                            debug!(
                                navigation_id = %token.id().short(),
                                node_id = %node_id,
                                "Loader outcome discarded after cancellation"
                            );
                            return PipelineOutcome::Cancelled;
                        }
                    }
                }
            };

            if self.debug_logging {
                debug!(
                    navigation_id = %token.id().short(),
                    node_id = %node_id,
                    outcome = outcome.label(),
                    "Loader finished"
                );
            }

            match outcome {
                LoaderOutcome::Data(value) => {
                    loaded.push((node_id.clone(), value.clone()));
                    outcomes.insert(node_id, LoaderOutcome::Data(value));
                }
                LoaderOutcome::Redirect(target) => {
                    debug!(node_id = %node_id, target = %target, "Loader redirected");
                    return PipelineOutcome::Redirect { node_id, target };
                }
                LoaderOutcome::NotFound => {
                    outcomes.insert(node_id.clone(), LoaderOutcome::NotFound);
                    return PipelineOutcome::Failed {
                        failure: NavigationFailure::not_found(node_id, matched.ancestor_ids(idx)),
                        partial: outcomes,
                    };
                }
                LoaderOutcome::Error(cause) => {
                    warn!(node_id = %node_id, error = %cause, "Loader failed");
                    outcomes.insert(node_id.clone(), LoaderOutcome::Error(cause.clone()));
                    return PipelineOutcome::Failed {
                        failure: NavigationFailure::loader(node_id, matched.ancestor_ids(idx), cause),
                        partial: outcomes,
                    };
                }
            }
        }

        PipelineOutcome::Complete(outcomes)
    }

    /// Run one loader in its own task. Returns `None` when the navigation is
    /// cancelled before the outcome can be used.
    async fn invoke(
        &self,
        loader: &BoxedLoader<Ctx>,
        args: LoaderArgs<Ctx>,
        token: &NavigationToken,
    ) -> Option<LoaderOutcome> {
        debug!(
            navigation_id = %token.id().short(),
            node_id = %args.node_id,
            "Invoking loader"
        );

        let future = loader(args);
        let timeout = self.timeout;
        let mut handle = tokio::spawn(async move {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, future).await.unwrap_or_else(|_| {
                    LoaderOutcome::Error(LoaderError::timeout(limit.as_millis() as u64))
                }),
                None => future.await,
            }
        });

        let joined = tokio::select! {
            biased;
            _ = token.cancelled() => {
                handle.abort();
                return None;
            }
            joined = &mut handle => joined,
        };

        // An outcome that raced a cancel is never applied.
        if token.is_cancelled() {
            return None;
        }

        Some(match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => LoaderOutcome::Error(LoaderError::panicked()),
            Err(e) => LoaderOutcome::Error(LoaderError::new(format!("Loader task failed: {}", e))),
        })
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for LoaderPipeline<Ctx> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            timeout: self.timeout,
            debug_logging: self.debug_logging,
        }
    }
}
