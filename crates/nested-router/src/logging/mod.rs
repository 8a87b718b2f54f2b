//! Structured logging for tree construction and navigation
//!
//! All output goes through `tracing`; install any subscriber to collect it.
//!
//! - **types**: [`NavigationId`] for correlating the log lines of one navigation
//! - **lifecycle**: tree build and installation events
//! - **events**: per-navigation summaries

mod events;
mod lifecycle;
mod types;

pub use events::{NavigationLogEvent, log_navigation_event};
pub use lifecycle::{log_route_registered, log_tree_built, log_tree_installed};
pub use types::{NavigationId, OutcomeKind, SHORT_ID_LENGTH};
