//! Loader outcomes and the per-navigation outcome map

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;

use crate::error::LoaderError;
use crate::tree::NodeId;

/// Tagged result of one loader invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LoaderOutcome {
    /// Loaded data; `Value::Null` for nodes without a loader
    Data(Value),
    /// Stop loading and navigate to the target instead
    Redirect(String),
    /// The resource addressed by the path does not exist
    NotFound,
    /// The loader failed
    Error(LoaderError),
}

impl LoaderOutcome {
    /// Outcome recorded for a node that has no loader.
    pub fn empty() -> Self {
        Self::Data(Value::Null)
    }

    /// True for `Data`.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    /// The loaded data, if any.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Data(value) => Some(value),
            _ => None,
        }
    }

    /// Short outcome label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Data(_) => "data",
            Self::Redirect(_) => "redirect",
            Self::NotFound => "not_found",
            Self::Error(_) => "error",
        }
    }
}

/// Control-flow signal a loader returns instead of data.
///
/// Loaders return [`LoaderResult<T>`]; `Ok(value)` becomes
/// [`LoaderOutcome::Data`] and each signal maps onto the matching outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderSignal {
    /// Redirect to the given path
    Redirect(String),
    /// The addressed resource does not exist
    NotFound,
    /// Loading failed
    Error(LoaderError),
}

impl LoaderSignal {
    /// Redirect to `target`.
    pub fn redirect(target: impl Into<String>) -> Self {
        Self::Redirect(target.into())
    }

    /// Report the resource as missing.
    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Fail with a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(LoaderError::new(message))
    }
}

impl From<LoaderError> for LoaderSignal {
    fn from(err: LoaderError) -> Self {
        Self::Error(err)
    }
}

impl From<serde_json::Error> for LoaderSignal {
    fn from(err: serde_json::Error) -> Self {
        Self::Error(err.into())
    }
}

impl From<LoaderSignal> for LoaderOutcome {
    fn from(signal: LoaderSignal) -> Self {
        match signal {
            LoaderSignal::Redirect(target) => Self::Redirect(target),
            LoaderSignal::NotFound => Self::NotFound,
            LoaderSignal::Error(err) => Self::Error(err),
        }
    }
}

/// Result type returned by loaders.
pub type LoaderResult<T> = Result<T, LoaderSignal>;

/// Outcomes keyed by node id, in the order the nodes were loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeMap {
    entries: Vec<(NodeId, LoaderOutcome)>,
}

impl OutcomeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Record an outcome, replacing an earlier one for the same node.
    pub fn insert(&mut self, node_id: NodeId, outcome: LoaderOutcome) {
        match self.entries.iter_mut().find(|(id, _)| *id == node_id) {
            Some(slot) => slot.1 = outcome,
            None => self.entries.push((node_id, outcome)),
        }
    }

    /// Outcome for a node.
    pub fn get(&self, node_id: &str) -> Option<&LoaderOutcome> {
        self.entries
            .iter()
            .find(|(id, _)| id.as_str() == node_id)
            .map(|(_, outcome)| outcome)
    }

    /// Loaded data for a node.
    pub fn data(&self, node_id: &str) -> Option<&Value> {
        self.get(node_id).and_then(LoaderOutcome::data)
    }

    /// True if the node has an outcome.
    pub fn contains(&self, node_id: &str) -> bool {
        self.get(node_id).is_some()
    }

    /// Number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &LoaderOutcome)> {
        self.entries.iter().map(|(id, outcome)| (id, outcome))
    }
}

impl Serialize for OutcomeMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, outcome) in &self.entries {
            map.serialize_entry(id, outcome)?;
        }
        map.end()
    }
}
