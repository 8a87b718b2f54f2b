//! Context types for dependency injection

use std::sync::Arc;

/// Context wrapper giving loaders access to application state.
///
/// The context is cloned for every loader invocation, so it wraps the state in
/// an `Arc`. Put shared mutable state behind its own lock inside `T`.
#[derive(Clone)]
pub struct Context<T: Clone + Send + Sync + 'static> {
    inner: Arc<T>,
}

impl<T: Clone + Send + Sync + 'static> Context<T> {
    /// Create a new context wrapping the given value
    pub fn new(ctx: T) -> Self {
        Self { inner: Arc::new(ctx) }
    }

}

impl<T: Clone + Send + Sync + 'static> std::ops::Deref for Context<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: Clone + Send + Sync + 'static + Default> Default for Context<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + 'static + std::fmt::Debug> std::fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Context").field(&self.inner).finish()
    }
}

/// Empty context for route trees whose loaders need no state
#[derive(Clone, Default, Debug)]
pub struct EmptyContext;
