//! Common types shared across the router

use std::collections::BTreeMap;

/// Path parameter bindings, keyed by parameter name.
///
/// A `BTreeMap` keeps iteration order stable so equal matches compare and
/// serialize identically.
pub type Params = BTreeMap<String, String>;

/// Rendered output handed to the rendering collaborator.
///
/// The router never interprets views; render capabilities produce them and
/// the composer only threads them through layout outlets.
pub type View = serde_json::Value;

/// Parameter name bound by a trailing splat segment.
pub const SPLAT_PARAM: &str = "*";
