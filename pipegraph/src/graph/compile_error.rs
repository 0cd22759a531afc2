//! Graph build error.
//!
//! Returned by [`build`](super::build) and `PipelineGraph::compile` when the node/edge
//! set is not a valid pipeline. Build errors are deterministic and never retried.

use thiserror::Error;

/// Why a node/edge set could not be compiled. Carries the offending node id when known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphBuildError {
    /// Two definitions share the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// An edge, or the start/end designation, refers to an id with no definition.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// An edge out of a router has no condition label.
    #[error("edge {from} -> {to} leaves router '{from}' without a condition label")]
    MissingCondition { from: String, to: String },

    /// An edge out of an ordinary node carries a condition label.
    #[error("edge {from} -> {to} has condition '{condition}' but '{from}' is not a router")]
    UnexpectedCondition {
        from: String,
        to: String,
        condition: String,
    },

    /// A router has two edges with the same condition label.
    #[error("router '{router}' has more than one route for condition '{condition}'")]
    DuplicateRoute { router: String, condition: String },

    /// Following edges from this node eventually leads back to it.
    #[error("cycle detected at node: {0}")]
    CycleDetected(String),

    /// No path leads from the start node to the end node.
    #[error("end node '{end}' is not reachable from start node '{start}'")]
    UnreachableEnd { start: String, end: String },

    /// The node cannot be reached from the start node.
    #[error("node '{0}' is not reachable from the start node")]
    OrphanedNode(String),

    /// A router with no outgoing edges.
    #[error("router '{0}' has no outgoing edges")]
    RouterWithoutRoutes(String),

    /// An ordinary node with more than one outgoing edge.
    #[error("node '{0}' has more than one successor; only routers may branch")]
    AmbiguousSuccessor(String),

    /// An ordinary node other than the end node with no outgoing edge.
    #[error("node '{0}' has no successor and is not the end node")]
    DeadEnd(String),

    /// The end node has outgoing edges.
    #[error("end node '{0}' must not have outgoing edges")]
    EndHasSuccessors(String),
}

impl GraphBuildError {
    /// Id of the node the error is about.
    pub fn node_id(&self) -> &str {
        match self {
            GraphBuildError::DuplicateNode(id)
            | GraphBuildError::NodeNotFound(id)
            | GraphBuildError::CycleDetected(id)
            | GraphBuildError::OrphanedNode(id)
            | GraphBuildError::RouterWithoutRoutes(id)
            | GraphBuildError::AmbiguousSuccessor(id)
            | GraphBuildError::DeadEnd(id)
            | GraphBuildError::EndHasSuccessors(id) => id,
            GraphBuildError::MissingCondition { from, .. }
            | GraphBuildError::UnexpectedCondition { from, .. } => from,
            GraphBuildError::DuplicateRoute { router, .. } => router,
            GraphBuildError::UnreachableEnd { end, .. } => end,
        }
    }
}
