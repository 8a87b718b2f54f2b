//! Core logging types.

use serde::{Deserialize, Serialize};

/// Number of characters kept by [`NavigationId::short`].
pub const SHORT_ID_LENGTH: usize = 8;

/// Unique identifier for a navigation, used for log correlation.
///
/// Uses UUID v7 for time-ordered, sortable identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationId(uuid::Uuid);

impl NavigationId {
    /// Creates a new unique navigation ID using UUID v7.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Returns the short form of the ID (first [`SHORT_ID_LENGTH`] characters).
    pub fn short(&self) -> String {
        let full = self.0.to_string();
        full.chars().take(SHORT_ID_LENGTH).collect()
    }
}

impl Default for NavigationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NavigationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for NavigationId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl std::str::FromStr for NavigationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

/// How a navigation ended, as recorded in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The chain loaded and composed.
    Rendered,
    /// A loader redirected.
    Redirect,
    /// An error boundary presents a failure.
    Fallback,
    /// The failure could not be presented.
    Failed,
    /// Superseded or cancelled.
    Cancelled,
}

impl OutcomeKind {
    /// Snake-case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Rendered => "rendered",
            OutcomeKind::Redirect => "redirect",
            OutcomeKind::Fallback => "fallback",
            OutcomeKind::Failed => "failed",
            OutcomeKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = NavigationId::new();
        let b = NavigationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_and_parse() {
        let id = NavigationId::new();
        assert_eq!(id.short().len(), SHORT_ID_LENGTH);
        assert!(id.to_string().starts_with(&id.short()));

        let parsed: NavigationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_outcome_kind_serializes_as_its_name() {
        for kind in [
            OutcomeKind::Rendered,
            OutcomeKind::Redirect,
            OutcomeKind::Fallback,
            OutcomeKind::Failed,
            OutcomeKind::Cancelled,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }
}
