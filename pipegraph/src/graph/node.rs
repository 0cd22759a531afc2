//! Graph nodes: ordinary steps and routers.
//!
//! An ordinary [`Node`] receives the pipeline state and returns the next state; its
//! successor is fixed by the graph. A [`Router`] reads the state and returns a condition
//! label; the compiled graph maps the label to the successor through the router's route
//! table. [`NodeDefinition`] ties either kind to an id, a diagnostic label and an optional
//! retry policy override.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NodeError;
use crate::retry::RetryPolicy;
use crate::state::PipelineState;

/// One ordinary step: state in, state out.
///
/// Implementations may perform I/O (LLM calls, HTTP) and may be invoked more than once
/// for the same input when the retry policy allows it.
#[async_trait]
pub trait Node: Send + Sync {
    async fn run(&self, state: PipelineState) -> Result<PipelineState, NodeError>;
}

/// A conditional step: reads the state and names the branch to take.
///
/// `incoming` holds the ids of the nodes with an edge into this router, so a router fed
/// from several places can look up which of them produced output (see
/// [`PipelineState::output_from_any`]). The returned label must be a key of the
/// router's route table; anything else aborts the run with a routing error.
#[async_trait]
pub trait Router: Send + Sync {
    async fn route(&self, state: &PipelineState, incoming: &[String])
        -> Result<String, NodeError>;
}

/// Node backed by an async closure.
pub struct FnNode<F> {
    f: F,
}

impl<F, Fut> FnNode<F>
where
    F: Fn(PipelineState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PipelineState, NodeError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps the closure as `Arc<dyn Node>`.
    pub fn arc(f: F) -> Arc<dyn Node> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Node for FnNode<F>
where
    F: Fn(PipelineState) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PipelineState, NodeError>> + Send + 'static,
{
    async fn run(&self, state: PipelineState) -> Result<PipelineState, NodeError> {
        (self.f)(state).await
    }
}

/// Router backed by a synchronous closure.
pub struct FnRouter<F> {
    f: F,
}

impl<F> FnRouter<F>
where
    F: Fn(&PipelineState, &[String]) -> Result<String, NodeError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }

    pub fn arc(f: F) -> Arc<dyn Router> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F> Router for FnRouter<F>
where
    F: Fn(&PipelineState, &[String]) -> Result<String, NodeError> + Send + Sync + 'static,
{
    async fn route(
        &self,
        state: &PipelineState,
        incoming: &[String],
    ) -> Result<String, NodeError> {
        (self.f)(state, incoming)
    }
}

/// What a node does when executed.
#[derive(Clone)]
pub enum NodeKind {
    Ordinary(Arc<dyn Node>),
    Router(Arc<dyn Router>),
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Ordinary(_) => f.write_str("Ordinary"),
            NodeKind::Router(_) => f.write_str("Router"),
        }
    }
}

/// A node as handed to the graph builder.
#[derive(Clone, Debug)]
pub struct NodeDefinition {
    /// Unique within a graph.
    pub id: String,
    /// Human-readable name used in logs and diagnostics.
    pub label: String,
    pub kind: NodeKind,
    /// Overrides the graph-wide retry policy for this node.
    pub retry_policy: Option<RetryPolicy>,
}

impl NodeDefinition {
    /// Ordinary node; the label defaults to the id.
    pub fn node(id: impl Into<String>, node: Arc<dyn Node>) -> Self {
        Self::with_kind(id, NodeKind::Ordinary(node))
    }

    /// Router node; the label defaults to the id.
    pub fn router(id: impl Into<String>, router: Arc<dyn Router>) -> Self {
        Self::with_kind(id, NodeKind::Router(router))
    }

    fn with_kind(id: impl Into<String>, kind: NodeKind) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind,
            retry_policy: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn is_router(&self) -> bool {
        matches!(self.kind, NodeKind::Router(_))
    }
}
