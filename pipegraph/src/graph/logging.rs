//! Logging utilities for pipeline execution.
//!
//! Structured `tracing` events for graph runs, node execution, routing decisions and
//! retries. Subscribers are installed by the embedding application.

use std::time::Duration;

use crate::error::{NodeError, PipelineError};

/// Log node execution start.
pub fn log_node_start(node_id: &str, label: &str) {
    tracing::debug!(node_id = node_id, label = label, "Starting node execution");
}

/// Log node execution completion.
pub fn log_node_complete(node_id: &str, next: Option<&str>) {
    tracing::debug!(node_id = node_id, next = next, "Node execution complete");
}

/// Log a router decision.
pub fn log_route(node_id: &str, condition: &str, target: &str) {
    tracing::debug!(
        node_id = node_id,
        condition = condition,
        target = target,
        "Router selected route"
    );
}

/// Log a retry scheduled after a failed attempt.
pub fn log_retry(node_id: &str, attempt: u32, max_attempts: u32, delay: Duration, error: &NodeError) {
    tracing::warn!(
        node_id = node_id,
        attempt,
        max_attempts,
        delay_ms = delay.as_millis() as u64,
        error = %error,
        "Retrying node after retryable error"
    );
}

/// Log graph execution start.
pub fn log_graph_start(start_id: &str) {
    tracing::info!(start = start_id, "Starting pipeline execution");
}

/// Log graph execution completion.
pub fn log_graph_complete(steps: usize) {
    tracing::info!(steps, "Pipeline execution complete");
}

/// Log graph execution error.
pub fn log_graph_error(error: &PipelineError) {
    tracing::error!(node_id = error.node_id(), error = %error, "Pipeline execution error");
}

/// Log a run task that died without returning (a node panicked).
pub fn log_graph_aborted(node_id: &str, message: &str) {
    tracing::error!(node_id = node_id, message = message, "Pipeline run aborted");
}
