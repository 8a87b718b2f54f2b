//! Route tree lifecycle logging functions.

/// Log completion of a route tree build. Logged at Info level.
///
/// # Example
///
/// ```rust,ignore
/// log_tree_built(12, 9);
/// ```
pub fn log_tree_built(node_count: usize, routable_count: usize) {
    tracing::info!(
        node_count = %node_count,
        routable_count = %routable_count,
        "Route tree built"
    );
}

/// Log registration of a single route node. Logged at Trace level.
pub fn log_route_registered(node_id: &str, kind: &str, module: &str) {
    tracing::trace!(
        node_id = %node_id,
        kind = %kind,
        module = %module,
        "Route registered"
    );
}

/// Log installation of the process-wide tree. Logged at Debug level.
pub fn log_tree_installed(node_count: usize) {
    tracing::debug!(node_count = %node_count, "Route tree installed");
}
