//! Registry of in-flight navigations
//!
//! A navigation is registered under a logical key (a tab, a frame, a
//! client). Beginning a new navigation under a key that is still loading
//! cancels the older one, so a superseded pipeline never applies its outcomes.

use dashmap::DashMap;
use tracing::{debug, trace};

use super::cancel::NavigationToken;

/// Tracks the current navigation per key.
#[derive(Debug, Default)]
pub struct NavigationManager {
    active: DashMap<String, NavigationToken>,
}

impl NavigationManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a navigation under `key`, cancelling the one it supersedes.
    pub fn begin(&self, key: impl Into<String>) -> NavigationToken {
        let key = key.into();
        let token = NavigationToken::new();

        if let Some(previous) = self.active.insert(key.clone(), token.clone()) {
            previous.cancel();
            debug!(
                key = %key,
                superseded = %previous.id().short(),
                navigation_id = %token.id().short(),
                "Navigation superseded"
            );
        } else {
            trace!(key = %key, navigation_id = %token.id().short(), "Navigation started");
        }

        token
    }

    /// Unregister `token` if it is still the current navigation for `key`.
    ///
    /// Returns false when a newer navigation has taken over the key.
    pub fn finish(&self, key: &str, token: &NavigationToken) -> bool {
        self.active
            .remove_if(key, |_, current| current.id() == token.id())
            .is_some()
    }

    /// Cancel the current navigation for `key`.
    pub fn cancel(&self, key: &str) -> bool {
        match self.active.remove(key) {
            Some((_, token)) => {
                token.cancel();
                debug!(key = %key, navigation_id = %token.id().short(), "Navigation cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every in-flight navigation. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let keys: Vec<String> = self.active.iter().map(|entry| entry.key().clone()).collect();
        keys.iter().filter(|key| self.cancel(key)).count()
    }

    /// True if a navigation is registered under `key`.
    pub fn is_active(&self, key: &str) -> bool {
        self.active.contains_key(key)
    }

    /// Number of registered navigations.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_supersedes_previous_navigation() {
        let manager = NavigationManager::new();
        let first = manager.begin("main");
        let second = manager.begin("main");

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn test_finish_ignores_stale_tokens() {
        let manager = NavigationManager::new();
        let first = manager.begin("main");
        let second = manager.begin("main");

        assert!(!manager.finish("main", &first));
        assert!(manager.is_active("main"));
        assert!(manager.finish("main", &second));
        assert!(!manager.is_active("main"));
    }

    #[test]
    fn test_keys_are_independent() {
        let manager = NavigationManager::new();
        let main = manager.begin("main");
        let side = manager.begin("sidebar");

        assert!(manager.cancel("sidebar"));
        assert!(side.is_cancelled());
        assert!(!main.is_cancelled());
        assert!(!manager.cancel("sidebar"));

        manager.begin("other");
        assert_eq!(manager.cancel_all(), 2);
        assert!(main.is_cancelled());
        assert_eq!(manager.active_count(), 0);
    }
}
