//! Configuration module for the router.
//!
//! This module provides the [`RouterConfig`] struct for customizing tree
//! construction, matching, and the loader pipeline.
//!
//! # Example
//! ```rust,ignore
//! use nested_router::RouterConfig;
//!
//! let config = RouterConfig::new()
//!     .with_case_sensitive(false)
//!     .with_loader_timeout(5_000)
//!     .with_follow_redirects(true);
//!
//! // Or load it from application configuration
//! let config = RouterConfig::from_json(r#"{ "max_depth": 16 }"#)?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigValidationError {
    /// max_depth must be greater than 0
    InvalidMaxDepth,
    /// loader_timeout_ms must be greater than 0 when set
    InvalidLoaderTimeout,
    /// max_redirects must be greater than 0 when redirects are followed
    InvalidRedirectBudget,
    /// The configuration document could not be parsed
    Parse(String),
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMaxDepth => write!(f, "max_depth must be greater than 0"),
            Self::InvalidLoaderTimeout => {
                write!(f, "loader_timeout_ms must be greater than 0 when set")
            }
            Self::InvalidRedirectBudget => {
                write!(f, "max_redirects must be greater than 0 when follow_redirects is enabled")
            }
            Self::Parse(msg) => write!(f, "invalid router config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Router configuration.
///
/// All fields have defaults that work out of the box; missing fields in a
/// configuration document fall back to them.
///
/// # Fields
///
/// * `case_sensitive` - Compare literal segments case-sensitively. Default: true.
///
/// * `max_depth` - Maximum nesting depth of the route tree. Definitions nested
///   deeper are rejected when the tree is built. Default: 32.
///
/// * `loader_timeout_ms` - Upper bound for a single loader invocation. A loader
///   exceeding it produces an error outcome. Default: none.
///
/// * `follow_redirects` - Let the navigator re-resolve redirect targets itself
///   instead of handing them to the caller. Default: false.
///
/// * `max_redirects` - Redirect budget per navigation when following. Default: 5.
///
/// * `debug_logging` - Emit per-step matcher and pipeline traces at debug level.
///   Default: false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Compare literal segments case-sensitively (default: true)
    pub case_sensitive: bool,
    /// Maximum route nesting depth (default: 32)
    pub max_depth: usize,
    /// Per-loader timeout in milliseconds (default: none)
    pub loader_timeout_ms: Option<u64>,
    /// Follow redirects inside the navigator (default: false)
    pub follow_redirects: bool,
    /// Maximum redirects followed per navigation (default: 5)
    pub max_redirects: usize,
    /// Enable debug logging (default: false)
    pub debug_logging: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            max_depth: 32,
            loader_timeout_ms: None,
            follow_redirects: false,
            max_redirects: 5,
            debug_logging: false,
        }
    }
}

impl RouterConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigValidationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigValidationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return an error if invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_depth` is 0
    /// - `loader_timeout_ms` is `Some(0)`
    /// - `follow_redirects` is enabled with `max_redirects` of 0
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_depth == 0 {
            return Err(ConfigValidationError::InvalidMaxDepth);
        }
        if self.loader_timeout_ms == Some(0) {
            return Err(ConfigValidationError::InvalidLoaderTimeout);
        }
        if self.follow_redirects && self.max_redirects == 0 {
            return Err(ConfigValidationError::InvalidRedirectBudget);
        }
        Ok(())
    }

    /// Per-loader timeout as a [`Duration`], if configured.
    pub fn loader_timeout(&self) -> Option<Duration> {
        self.loader_timeout_ms.map(Duration::from_millis)
    }

    /// Set case-sensitive literal matching.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = enabled;
        self
    }

    /// Set the maximum nesting depth.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the per-loader timeout in milliseconds.
    ///
    /// # Example
    /// ```rust,ignore
    /// let config = RouterConfig::new().with_loader_timeout(2_000);
    /// ```
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_loader_timeout(mut self, millis: u64) -> Self {
        self.loader_timeout_ms = Some(millis);
        self
    }

    /// Enable or disable redirect following in the navigator.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_follow_redirects(mut self, enabled: bool) -> Self {
        self.follow_redirects = enabled;
        self
    }

    /// Set the redirect budget.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Enable or disable debug logging.
    #[must_use = "This method returns a new RouterConfig and does not modify self"]
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }
}
