//! Error types for route tree construction and navigation
//!
//! This module provides type-safe error handling for the router.
//!
//! # Error Codes
//!
//! Error codes are represented by the [`RouterErrorCode`] enum. Configuration
//! codes (duplicate routes, multiple index routes, mutation of a frozen tree,
//! malformed definitions) are fatal and abort startup. Runtime codes such as
//! [`RouterErrorCode::NoMatchFound`] are recoverable and are reported to the
//! rendering collaborator as navigation outcomes.
//!
//! When serialized, codes are converted to SCREAMING_SNAKE_CASE strings.
//!
//! # Example
//! ```rust,ignore
//! use nested_router::{RouterError, RouterErrorCode};
//!
//! let error = RouterError::new(RouterErrorCode::DuplicateRoute, "Route '/about' declared twice");
//! let error = RouterError::no_match("/missing"); // Convenience method
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::tree::NodeId;

/// Type-safe error codes for router operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum RouterErrorCode {
    // Configuration errors (fatal at startup)
    /// Two sibling routes resolve to the same path pattern
    DuplicateRoute,
    /// More than one index route in the same sibling group
    MultipleIndex,
    /// Attempt to replace or mutate a frozen route tree
    ImmutableTree,
    /// A route definition is malformed
    InvalidDefinition,
    /// Route nesting exceeds the configured maximum depth
    TreeTooDeep,

    // Runtime errors
    /// No route matches the requested path
    NoMatchFound,
    /// A reverse URL lookup is missing a parameter value
    MissingParameter,
    /// The composer was given an outcome map that does not cover the chain
    IncompleteOutcomes,
    /// An unexpected internal error occurred
    InternalError,
    /// JSON serialization/deserialization failed
    SerializationError,
}

impl RouterErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateRoute => "DUPLICATE_ROUTE",
            Self::MultipleIndex => "MULTIPLE_INDEX",
            Self::ImmutableTree => "IMMUTABLE_TREE",
            Self::InvalidDefinition => "INVALID_DEFINITION",
            Self::TreeTooDeep => "TREE_TOO_DEEP",
            Self::NoMatchFound => "NO_MATCH_FOUND",
            Self::MissingParameter => "MISSING_PARAMETER",
            Self::IncompleteOutcomes => "INCOMPLETE_OUTCOMES",
            Self::InternalError => "INTERNAL_ERROR",
            Self::SerializationError => "SERIALIZATION_ERROR",
        }
    }

    /// Returns true for errors raised while building the route tree.
    ///
    /// These indicate a programming mistake and are never retried.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRoute
                | Self::MultipleIndex
                | Self::ImmutableTree
                | Self::InvalidDefinition
                | Self::TreeTooDeep
        )
    }

    /// Returns true for errors a caller can recover from at runtime.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoMatchFound | Self::MissingParameter)
    }
}

impl fmt::Display for RouterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Router error with type-safe code and message.
///
/// # Example
/// ```rust,ignore
/// use nested_router::{RouterError, RouterErrorCode};
///
/// let error = RouterError::new(RouterErrorCode::InvalidDefinition, "Empty parameter name")
///     .with_details(serde_json::json!({"segment": ":"}));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("[{code}] {message}")]
pub struct RouterError {
    /// Type-safe error code
    pub code: RouterErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (JSON value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl RouterError {
    /// Create a new error with code and message.
    pub fn new(code: RouterErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    // Convenience constructors

    /// Create a DUPLICATE_ROUTE error.
    pub fn duplicate_route(pattern: &str) -> Self {
        Self::new(
            RouterErrorCode::DuplicateRoute,
            format!("Route '{}' is declared more than once in the same group", pattern),
        )
        .with_details(serde_json::json!({ "pattern": pattern }))
    }

    /// Create a MULTIPLE_INDEX error.
    pub fn multiple_index(parent_pattern: &str) -> Self {
        Self::new(
            RouterErrorCode::MultipleIndex,
            format!("Route group '{}' declares more than one index route", parent_pattern),
        )
        .with_details(serde_json::json!({ "parent": parent_pattern }))
    }

    /// Create an IMMUTABLE_TREE error.
    pub fn immutable_tree() -> Self {
        Self::new(
            RouterErrorCode::ImmutableTree,
            "Route tree is frozen and cannot be replaced or modified",
        )
    }

    /// Create an INVALID_DEFINITION error.
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::new(RouterErrorCode::InvalidDefinition, message)
    }

    /// Create a TREE_TOO_DEEP error.
    pub fn tree_too_deep(pattern: &str, max_depth: usize) -> Self {
        Self::new(
            RouterErrorCode::TreeTooDeep,
            format!("Route '{}' exceeds the maximum nesting depth of {}", pattern, max_depth),
        )
    }

    /// Create a NO_MATCH_FOUND error.
    pub fn no_match(path: &str) -> Self {
        Self::new(
            RouterErrorCode::NoMatchFound,
            format!("No route matches '{}'", path),
        )
        .with_details(serde_json::json!({ "path": path }))
    }

    /// Create a MISSING_PARAMETER error.
    pub fn missing_parameter(node_id: &NodeId, param: &str) -> Self {
        Self::new(
            RouterErrorCode::MissingParameter,
            format!("Missing parameter '{}' for route '{}'", param, node_id),
        )
    }

    /// Create an INCOMPLETE_OUTCOMES error.
    pub fn incomplete_outcomes(node_id: &NodeId) -> Self {
        Self::new(
            RouterErrorCode::IncompleteOutcomes,
            format!("No data outcome recorded for route '{}'", node_id),
        )
    }

    /// Create an INTERNAL_ERROR error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RouterErrorCode::InternalError, message)
    }

    /// Create a SERIALIZATION_ERROR error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(RouterErrorCode::SerializationError, message)
    }
}

impl From<serde_json::Error> for RouterError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

/// Result type alias for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

// =============================================================================
// Loader Errors
// =============================================================================

/// Error produced by a data loader.
///
/// Loader errors are surfaced, never swallowed: they halt the pipeline and
/// become a [`NavigationFailure`] attributed to the failing node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct LoaderError {
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (JSON value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LoaderError {
    /// Create a new loader error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    pub(crate) fn timeout(after_ms: u64) -> Self {
        Self::new(format!("Loader timed out after {}ms", after_ms))
            .with_details(serde_json::json!({ "timeout_ms": after_ms }))
    }

    pub(crate) fn panicked() -> Self {
        Self::new("Loader panicked")
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}

// =============================================================================
// Navigation Failure
// =============================================================================

/// Category of a failed navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FailureKind {
    /// No route matched, or a loader reported the resource missing
    NotFound,
    /// A loader failed
    LoaderError,
    /// Redirects kept pointing at each other beyond the configured budget
    RedirectLoop,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::LoaderError => write!(f, "loader_error"),
            Self::RedirectLoop => write!(f, "redirect_loop"),
        }
    }
}

/// Structured failure handed to the rendering collaborator.
///
/// The collaborator decides how to present it (error boundary, 404 page, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationFailure {
    /// Node that produced the failure; `None` when no route matched
    pub node_id: Option<NodeId>,
    /// Failure category
    pub kind: FailureKind,
    /// Redirect target involved in the failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_target: Option<String>,
    /// Loader error, for [`FailureKind::LoaderError`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<LoaderError>,
    /// Ancestors of the failing node, outermost first
    pub ancestors: Vec<NodeId>,
    /// Whether an error boundary in the chain can present this failure
    pub recoverable: bool,
}

impl NavigationFailure {
    /// Failure for a path that matched no route.
    pub fn no_match() -> Self {
        Self {
            node_id: None,
            kind: FailureKind::NotFound,
            redirect_target: None,
            cause: None,
            ancestors: Vec::new(),
            recoverable: true,
        }
    }

    /// Failure for a loader that reported its resource missing.
    pub fn not_found(node_id: NodeId, ancestors: Vec<NodeId>) -> Self {
        Self {
            node_id: Some(node_id),
            kind: FailureKind::NotFound,
            redirect_target: None,
            cause: None,
            ancestors,
            recoverable: true,
        }
    }

    /// Failure for a loader error.
    pub fn loader(node_id: NodeId, ancestors: Vec<NodeId>, cause: LoaderError) -> Self {
        Self {
            node_id: Some(node_id),
            kind: FailureKind::LoaderError,
            redirect_target: None,
            cause: Some(cause),
            ancestors,
            recoverable: true,
        }
    }

    /// Failure for a redirect chain that exceeded its budget.
    pub fn redirect_loop(target: impl Into<String>) -> Self {
        Self {
            node_id: None,
            kind: FailureKind::RedirectLoop,
            redirect_target: Some(target.into()),
            cause: None,
            ancestors: Vec::new(),
            recoverable: false,
        }
    }

    /// Mark the failure as unrecoverable (no boundary could present it).
    pub fn unrecoverable(mut self) -> Self {
        self.recoverable = false;
        self
    }

    /// The attributed node followed by its ancestors, innermost first.
    ///
    /// This is the search order for the nearest error boundary.
    pub fn boundary_search_order(&self) -> impl Iterator<Item = &NodeId> {
        self.node_id.iter().chain(self.ancestors.iter().rev())
    }
}

impl fmt::Display for NavigationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.node_id, &self.cause) {
            (Some(node), Some(cause)) => write!(f, "{} at '{}': {}", self.kind, node, cause),
            (Some(node), None) => write!(f, "{} at '{}'", self.kind, node),
            (None, _) => write!(f, "{}", self.kind),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
