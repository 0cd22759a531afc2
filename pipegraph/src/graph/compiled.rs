//! Compiled pipeline: immutable execution plan, supports invoke, stream and route.
//!
//! Built by `PipelineGraph::compile` or [`build`](super::build). Holds one compiled step
//! per node id: an ordinary node with its static successor, or a router dispatch with its
//! route table. Every step carries the retry policy it runs under. The plan is shared
//! behind an `Arc`, so clones are cheap and concurrent runs need no locking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinError;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::PipelineError;
use crate::retry::{execute_with_retry, RetryPolicy};
use crate::state::PipelineState;
use crate::stream::{StreamEvent, StreamMode};

use super::logging;
use super::node::Node;
use super::router::{RouteDecision, RouteTable, RouterDispatch};
use super::run_context::{emit_failed, RunContext};

/// What executing one node means.
#[derive(Clone)]
pub(crate) enum StepAction {
    /// Run the node; continue at `next`, or stop when `next` is `None` (end node).
    Node {
        node: Arc<dyn Node>,
        next: Option<String>,
    },
    /// Ask the router and continue at the node its route table selects.
    Route(RouterDispatch),
}

#[derive(Clone)]
pub(crate) struct CompiledStep {
    pub(crate) label: String,
    pub(crate) action: StepAction,
    pub(crate) retry: Arc<RetryPolicy>,
}

/// Compiled pipeline: validated, immutable, ready to run any number of times.
///
/// A run starts at the start node and follows static successors and router decisions
/// until the end node has executed. The graph is acyclic, so a run executes at most one
/// step per node.
#[derive(Clone)]
pub struct CompiledPipeline {
    pub(super) steps: Arc<HashMap<String, CompiledStep>>,
    pub(super) start: String,
    pub(super) end: String,
}

impl std::fmt::Debug for CompiledPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPipeline")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("node_count", &self.steps.len())
            .finish()
    }
}

impl CompiledPipeline {
    pub fn start_id(&self) -> &str {
        &self.start
    }

    pub fn end_id(&self) -> &str {
        &self.end
    }

    pub fn node_count(&self) -> usize {
        self.steps.len()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.steps.contains_key(node_id)
    }

    /// Diagnostic label of a node.
    pub fn label(&self, node_id: &str) -> Option<&str> {
        self.steps.get(node_id).map(|step| step.label.as_str())
    }

    pub fn is_router(&self, node_id: &str) -> bool {
        matches!(
            self.steps.get(node_id).map(|step| &step.action),
            Some(StepAction::Route(_))
        )
    }

    /// Route table of a router node; `None` for ordinary or unknown nodes.
    pub fn route_table(&self, node_id: &str) -> Option<&RouteTable> {
        match &self.steps.get(node_id)?.action {
            StepAction::Route(dispatch) => Some(&dispatch.routes),
            StepAction::Node { .. } => None,
        }
    }

    /// Ids of the nodes with an edge into router `node_id`, as passed to the router.
    pub fn incoming(&self, node_id: &str) -> Option<&[String]> {
        match &self.steps.get(node_id)?.action {
            StepAction::Route(dispatch) => Some(dispatch.incoming.as_slice()),
            StepAction::Node { .. } => None,
        }
    }

    /// Possible next nodes: the static successor, or every route target of a router.
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        match self.steps.get(node_id).map(|step| &step.action) {
            Some(StepAction::Node { next, .. }) => next.as_deref().into_iter().collect(),
            Some(StepAction::Route(dispatch)) => dispatch.routes.targets().collect(),
            None => Vec::new(),
        }
    }

    /// Retry policy attached to `node_id`.
    pub fn retry_policy(&self, node_id: &str) -> Option<&RetryPolicy> {
        self.steps.get(node_id).map(|step| step.retry.as_ref())
    }

    fn step(&self, node_id: &str) -> Result<&CompiledStep, PipelineError> {
        self.steps
            .get(node_id)
            .ok_or_else(|| PipelineError::UnknownNode {
                node_id: node_id.to_string(),
            })
    }

    /// Evaluates router `router_id` against `state` without running the pipeline.
    ///
    /// Same dispatch the executor uses: the router call runs under the node's retry
    /// policy and an unmatched label is a [`PipelineError::Routing`].
    pub async fn route(
        &self,
        router_id: &str,
        state: &PipelineState,
    ) -> Result<RouteDecision, PipelineError> {
        let step = self.step(router_id)?;
        match &step.action {
            StepAction::Route(dispatch) => dispatch.dispatch(router_id, &step.retry, state).await,
            StepAction::Node { .. } => Err(PipelineError::NotARouter {
                node_id: router_id.to_string(),
            }),
        }
    }

    /// Shared run loop used by invoke() and stream(). Returns the number of steps taken.
    async fn run_loop(
        &self,
        state: &mut PipelineState,
        run_ctx: Option<&RunContext>,
    ) -> Result<usize, PipelineError> {
        let limit = self.steps.len();
        let mut current_id = self.start.clone();
        let mut taken = 0;
        loop {
            if taken >= limit {
                return Err(PipelineError::StepLimitExceeded {
                    node_id: current_id,
                    limit,
                });
            }
            taken += 1;

            let step = self.step(&current_id)?;
            logging::log_node_start(&current_id, &step.label);
            if let Some(ctx) = run_ctx {
                ctx.enter(&current_id);
            }

            let next = match &step.action {
                StepAction::Node { node, next } => {
                    let input: &PipelineState = state;
                    let node: &dyn Node = node.as_ref();
                    let new_state =
                        execute_with_retry(&step.retry, &current_id, move || node.run(input.clone()))
                            .await
                            .map_err(|failure| PipelineError::Node {
                                node_id: current_id.clone(),
                                attempts: failure.attempts,
                                source: failure.error,
                            })?;
                    *state = new_state;
                    if let Some(ctx) = run_ctx {
                        ctx.emit_update(&current_id, state).await;
                    }
                    next.clone()
                }
                StepAction::Route(dispatch) => {
                    let decision = dispatch.dispatch(&current_id, &step.retry, state).await?;
                    if let Some(ctx) = run_ctx {
                        ctx.emit_route(&current_id, &decision).await;
                    }
                    Some(decision.target)
                }
            };
            logging::log_node_complete(&current_id, next.as_deref());

            if current_id == self.end {
                return Ok(taken);
            }
            match next {
                Some(id) => current_id = id,
                None => return Ok(taken),
            }
        }
    }

    /// Runs the pipeline from the start node with `state` and returns the final state.
    ///
    /// - Ordinary node: its returned state replaces the current one; continue at its successor.
    /// - Router: state is left untouched; continue at the node its route table selects.
    /// - End node: stop after it executes.
    ///
    /// Errors carry the failing node id: [`PipelineError::Node`] once the node's retry
    /// policy gives up, [`PipelineError::Routing`] when a router's label has no route.
    pub async fn invoke(&self, state: PipelineState) -> Result<PipelineState, PipelineError> {
        let mut state = state;
        logging::log_graph_start(&self.start);
        match self.run_loop(&mut state, None).await {
            Ok(taken) => {
                logging::log_graph_complete(taken);
                Ok(state)
            }
            Err(error) => {
                logging::log_graph_error(&error);
                Err(error)
            }
        }
    }

    /// Streams a run in a spawned task, emitting the events selected by `stream_mode`.
    ///
    /// A failed run ends the stream with [`StreamEvent::Failed`]. That includes a node
    /// that panics: the panic is reported as `Failed` for the step that was executing.
    pub fn stream(
        &self,
        state: PipelineState,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent> {
        let (tx, rx) = mpsc::channel(128);
        let (current_tx, current_rx) = watch::channel(self.start.clone());
        let graph = self.clone();
        let run_ctx = RunContext {
            stream_tx: tx.clone(),
            stream_mode: stream_mode.into(),
            current_node: current_tx,
        };

        let run = tokio::spawn(async move {
            let mut state = state;
            logging::log_graph_start(&graph.start);
            match graph.run_loop(&mut state, Some(&run_ctx)).await {
                Ok(taken) => logging::log_graph_complete(taken),
                Err(error) => {
                    logging::log_graph_error(&error);
                    run_ctx.emit_failure(&error).await;
                }
            }
        });

        tokio::spawn(async move {
            if let Err(join_error) = run.await {
                let node_id = current_rx.borrow().clone();
                let message = abort_message(join_error);
                logging::log_graph_aborted(&node_id, &message);
                emit_failed(&tx, &node_id, message).await;
            }
        });

        ReceiverStream::new(rx)
    }
}

fn abort_message(join_error: JoinError) -> String {
    if !join_error.is_panic() {
        return format!("run aborted: {}", join_error);
    }
    let payload = join_error.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("node panicked: {}", detail)
}

/// Runs `compiled` with `initial_state`; same as [`CompiledPipeline::invoke`].
pub async fn run(
    compiled: &CompiledPipeline,
    initial_state: PipelineState,
) -> Result<PipelineState, PipelineError> {
    compiled.invoke(initial_state).await
}
