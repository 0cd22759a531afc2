//! Node and pipeline execution error types.
//!
//! [`NodeError`] is what a node or router callable returns. [`PipelineError`] is what
//! a run returns: the node error wrapped with the failing node id, or a routing error.

use thiserror::Error;

/// Boxed error from an external provider (LLM client, HTTP client, ...).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by a node or router callable.
///
/// The core does not decide which variants are transient; that is the job of the
/// predicate in [`RetryPolicy`](crate::RetryPolicy). `RateLimited` exists so that
/// collaborators without their own error types can still signal throttling, and
/// `Provider` carries vendor errors so a predicate can downcast them.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Execution failed with a message (validation failure, bad input, ...).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The provider throttled the request.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Error raised by an external provider, kept intact for the retry predicate.
    #[error(transparent)]
    Provider(#[from] BoxError),
}

impl NodeError {
    /// True for [`NodeError::RateLimited`]. Used as the default retry predicate.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, NodeError::RateLimited(_))
    }

    /// Returns the provider error as `E` when this is a `Provider` error of that type.
    pub fn provider_error<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            NodeError::Provider(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Error returned by [`CompiledPipeline::invoke`](crate::CompiledPipeline::invoke).
///
/// Every variant names the node it happened at.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A node (or router callable) failed; retries, if any, are exhausted.
    #[error("node '{node_id}' failed after {attempts} attempt(s): {source}")]
    Node {
        node_id: String,
        attempts: u32,
        #[source]
        source: NodeError,
    },

    /// A router produced a condition with no entry in its route table.
    #[error("router '{node_id}' has no route for condition '{condition}'")]
    Routing { node_id: String, condition: String },

    /// The id is not a node of the compiled pipeline.
    #[error("unknown node: {node_id}")]
    UnknownNode { node_id: String },

    /// A routing decision was requested from an ordinary node.
    #[error("node '{node_id}' is not a router")]
    NotARouter { node_id: String },

    /// The run visited more steps than the graph has nodes.
    #[error("step limit of {limit} exceeded at node '{node_id}'")]
    StepLimitExceeded { node_id: String, limit: usize },
}

impl PipelineError {
    /// Id of the node the run failed at.
    pub fn node_id(&self) -> &str {
        match self {
            PipelineError::Node { node_id, .. }
            | PipelineError::Routing { node_id, .. }
            | PipelineError::UnknownNode { node_id }
            | PipelineError::NotARouter { node_id }
            | PipelineError::StepLimitExceeded { node_id, .. } => node_id,
        }
    }

    /// The underlying node error, when the failure came from a node callable.
    pub fn node_error(&self) -> Option<&NodeError> {
        match self {
            PipelineError::Node { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Number of attempts made at the failing node (1 for routing errors).
    pub fn attempts(&self) -> u32 {
        match self {
            PipelineError::Node { attempts, .. } => *attempts,
            _ => 1,
        }
    }
}
