//! Navigation cancellation types

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

use crate::logging::NavigationId;

/// Cancellation signal shared between a navigation and its loaders
#[derive(Debug)]
pub struct CancellationSignal {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationSignal {
    /// Create a new cancellation signal
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Cancel the signal
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Check if cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until cancelled
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register as a waiter before reading the flag so a concurrent
        // cancel() cannot slip between the check and the await.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation token for one navigation.
///
/// Cloning shares the underlying signal: cancelling any clone cancels the
/// navigation. Loaders receive a clone and may poll it to stop early; the
/// pipeline races every loader against it regardless.
#[derive(Debug, Clone)]
pub struct NavigationToken {
    id: NavigationId,
    signal: Arc<CancellationSignal>,
}

impl NavigationToken {
    /// Create a fresh, uncancelled token.
    pub fn new() -> Self {
        Self {
            id: NavigationId::new(),
            signal: Arc::new(CancellationSignal::new()),
        }
    }

    /// Id of the navigation this token belongs to.
    pub fn id(&self) -> NavigationId {
        self.id
    }

    /// Cancel the navigation.
    pub fn cancel(&self) {
        self.signal.cancel();
    }

    /// Check if the navigation has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }

    /// Resolve once the navigation is cancelled.
    pub async fn cancelled(&self) {
        self.signal.cancelled().await
    }

    /// Get the cancellation signal for sharing
    pub fn signal(&self) -> Arc<CancellationSignal> {
        self.signal.clone()
    }
}

impl Default for NavigationToken {
    fn default() -> Self {
        Self::new()
    }
}
