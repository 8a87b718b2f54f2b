//! Navigation log events.

use serde::Serialize;
use std::time::Duration;

use super::types::{NavigationId, OutcomeKind};

/// Summary of a finished navigation.
///
/// # Example
///
/// ```rust,ignore
/// let event = NavigationLogEvent::new(token.id(), "/gallery", OutcomeKind::Rendered)
///     .with_node("/gallery#index")
///     .with_duration(started.elapsed());
/// log_navigation_event(&event);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct NavigationLogEvent {
    /// Navigation id
    pub navigation_id: NavigationId,
    /// Requested path
    pub path: String,
    /// How the navigation ended
    pub outcome: OutcomeKind,
    /// Node the outcome is attributed to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Redirect target, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_target: Option<String>,
    /// Wall time spent resolving the navigation
    pub duration_ms: u64,
}

impl NavigationLogEvent {
    /// Create an event with the mandatory fields.
    pub fn new(navigation_id: NavigationId, path: impl Into<String>, outcome: OutcomeKind) -> Self {
        Self {
            navigation_id,
            path: path.into(),
            outcome,
            node_id: None,
            redirect_target: None,
            duration_ms: 0,
        }
    }

    /// Attribute the event to a node.
    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// Record a redirect target.
    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect_target = Some(target.into());
        self
    }

    /// Record the elapsed time.
    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_ms = elapsed.as_millis() as u64;
        self
    }
}

/// Log a navigation event.
///
/// Failed navigations are logged at Warn level, cancellations at Debug, and
/// everything else at Info.
pub fn log_navigation_event(event: &NavigationLogEvent) {
    let node_id = event.node_id.as_deref().unwrap_or("-");
    let target = event.redirect_target.as_deref().unwrap_or("-");
    match event.outcome {
        OutcomeKind::Failed => tracing::warn!(
            navigation_id = %event.navigation_id.short(),
            path = %event.path,
            node_id = %node_id,
            duration_ms = event.duration_ms,
            "Navigation failed"
        ),
        OutcomeKind::Cancelled => tracing::debug!(
            navigation_id = %event.navigation_id.short(),
            path = %event.path,
            duration_ms = event.duration_ms,
            "Navigation cancelled"
        ),
        outcome => tracing::info!(
            navigation_id = %event.navigation_id.short(),
            path = %event.path,
            outcome = %outcome,
            node_id = %node_id,
            redirect_target = %target,
            duration_ms = event.duration_ms,
            "Navigation resolved"
        ),
    }
}
