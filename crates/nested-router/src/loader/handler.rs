//! Loader traits and utilities
//!
//! A loader fetches the data a route needs before composition. Loaders are
//! plain async functions taking [`LoaderArgs`] and returning a
//! [`LoaderResult`]; they are type-erased into [`BoxedLoader`] for storage on
//! the route module.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{trace, warn};

use super::cancel::NavigationToken;
use super::outcome::{LoaderOutcome, LoaderResult, LoaderSignal};
use crate::Context;
use crate::context::EmptyContext;
use crate::tree::NodeId;
use crate::types::Params;

/// Boxed loader for type erasure
pub(crate) type BoxedLoader<Ctx> = Arc<
    dyn Fn(LoaderArgs<Ctx>) -> Pin<Box<dyn Future<Output = LoaderOutcome> + Send>> + Send + Sync,
>;

/// Arguments passed to a loader.
pub struct LoaderArgs<Ctx: Clone + Send + Sync + 'static = EmptyContext> {
    /// Application context
    pub ctx: Context<Ctx>,
    /// Node being loaded
    pub node_id: NodeId,
    /// Request path being navigated to
    pub path: String,
    /// Parameters bound by this node and all of its ancestors
    pub params: Params,
    /// Parameters bound by this node alone
    pub own_params: Params,
    /// Data produced by ancestor loaders, outermost first
    pub(crate) ancestors: Arc<Vec<(NodeId, Value)>>,
    /// Cancellation token of the navigation
    pub token: NavigationToken,
}

impl<Ctx: Clone + Send + Sync + 'static> LoaderArgs<Ctx> {
    /// Look up a path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Data loaded by the ancestor with the given id.
    pub fn parent_data(&self, node_id: &str) -> Option<&Value> {
        self.ancestors
            .iter()
            .find(|(id, _)| id.as_str() == node_id)
            .map(|(_, data)| data)
    }

    /// Data loaded by the nearest ancestor whose loader returned something
    /// other than `null`.
    pub fn nearest_parent_data(&self) -> Option<&Value> {
        self.ancestors
            .iter()
            .rev()
            .map(|(_, data)| data)
            .find(|data| !data.is_null())
    }

    /// Deserialize an ancestor's data.
    pub fn parent_data_as<T: DeserializeOwned>(&self, node_id: &str) -> LoaderResult<Option<T>> {
        self.parent_data(node_id)
            .map(|data| serde_json::from_value(data.clone()))
            .transpose()
            .map_err(LoaderSignal::from)
    }

    /// Ancestor data, outermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = (&NodeId, &Value)> {
        self.ancestors.iter().map(|(id, data)| (id, data))
    }

    /// True once the navigation has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<Ctx: Clone + Send + Sync + 'static> Clone for LoaderArgs<Ctx> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            node_id: self.node_id.clone(),
            path: self.path.clone(),
            params: self.params.clone(),
            own_params: self.own_params.clone(),
            ancestors: self.ancestors.clone(),
            token: self.token.clone(),
        }
    }
}

/// Trait for loader functions
///
/// Automatically implemented for async functions with the signature:
/// `async fn(LoaderArgs<Ctx>) -> LoaderResult<Output>`
pub trait Loader<Ctx, Output>: Clone + Send + Sync + 'static
where
    Ctx: Clone + Send + Sync + 'static,
    Output: Serialize + Send + 'static,
{
    /// The future type returned by the loader
    type Future: Future<Output = LoaderResult<Output>> + Send;

    /// Run the loader
    fn load(&self, args: LoaderArgs<Ctx>) -> Self::Future;
}

impl<Ctx, Output, F, Fut> Loader<Ctx, Output> for F
where
    Ctx: Clone + Send + Sync + 'static,
    Output: Serialize + Send + 'static,
    F: Fn(LoaderArgs<Ctx>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = LoaderResult<Output>> + Send + 'static,
{
    type Future = Fut;

    fn load(&self, args: LoaderArgs<Ctx>) -> Self::Future {
        (self)(args)
    }
}

/// Convert a loader into a boxed loader for storage
pub(crate) fn into_boxed_loader<Ctx, Output, L>(loader: L) -> BoxedLoader<Ctx>
where
    Ctx: Clone + Send + Sync + 'static,
    Output: Serialize + Send + 'static,
    L: Loader<Ctx, Output>,
{
    Arc::new(move |args| {
        let loader = loader.clone();
        Box::pin(async move {
            let node_id = args.node_id.clone();
            trace!(node_id = %node_id, "Executing loader");

            let output = match loader.load(args).await {
                Ok(output) => output,
                Err(signal) => return LoaderOutcome::from(signal),
            };

            match serde_json::to_value(output) {
                Ok(value) => LoaderOutcome::Data(value),
                Err(e) => {
                    warn!(node_id = %node_id, error = %e, "Loader output serialization failed");
                    LoaderOutcome::Error(e.into())
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args_with_ancestors(ancestors: Vec<(NodeId, Value)>) -> LoaderArgs<EmptyContext> {
        LoaderArgs {
            ctx: Context::new(EmptyContext),
            node_id: NodeId::from("/a/b"),
            path: "/a/b".into(),
            params: Params::new(),
            own_params: Params::new(),
            ancestors: Arc::new(ancestors),
            token: NavigationToken::new(),
        }
    }

    #[derive(Serialize)]
    struct Profile {
        name: &'static str,
    }

    async fn profile_loader(_args: LoaderArgs<EmptyContext>) -> LoaderResult<Profile> {
        Ok(Profile { name: "ada" })
    }

    async fn guarded_loader(_args: LoaderArgs<EmptyContext>) -> LoaderResult<Value> {
        Err(LoaderSignal::redirect("/login"))
    }

    #[tokio::test]
    async fn test_boxed_loader_serializes_output() {
        let boxed = into_boxed_loader(profile_loader);
        let outcome = boxed(args_with_ancestors(Vec::new())).await;
        assert_eq!(outcome, LoaderOutcome::Data(json!({"name": "ada"})));
    }

    #[tokio::test]
    async fn test_boxed_loader_maps_signals() {
        let boxed = into_boxed_loader(guarded_loader);
        let outcome = boxed(args_with_ancestors(Vec::new())).await;
        assert_eq!(outcome, LoaderOutcome::Redirect("/login".into()));
    }

    #[test]
    fn test_parent_data_lookup() {
        let args = args_with_ancestors(vec![
            (NodeId::from("/#layout:shell"), json!({"user": "ada"})),
            (NodeId::from("/a"), Value::Null),
        ]);

        assert_eq!(args.parent_data("/#layout:shell"), Some(&json!({"user": "ada"})));
        assert_eq!(args.nearest_parent_data(), Some(&json!({"user": "ada"})));
        assert!(args.parent_data("/missing").is_none());

        #[derive(serde::Deserialize)]
        struct Session {
            user: String,
        }
        let session: Option<Session> = args.parent_data_as("/#layout:shell").unwrap();
        assert_eq!(session.unwrap().user, "ada");
    }
}
