//! # pipegraph
//!
//! Pipeline graphs for chatbot back ends: build a directed acyclic graph of processing
//! nodes and routers, validate it once, then run it any number of times, concurrently,
//! with a per-run **state-in, state-out** map threaded through the nodes.
//!
//! ## Design Principles
//!
//! - **Validate once**: [`build`] rejects cycles, unreachable nodes, a missing end,
//!   unlabeled router edges and ambiguous successors before anything runs.
//! - **Routers only route**: a [`Router`] returns a condition label; the compiled route
//!   table maps it to the next node. An unknown label is a [`PipelineError::Routing`].
//! - **Retries are policy**: each node call runs under a [`RetryPolicy`] (exponential
//!   backoff with jitter); what counts as transient is an injected predicate.
//! - **Runs share nothing mutable**: [`CompiledPipeline`] is immutable and `Clone`; each run
//!   owns its [`PipelineState`].
//!
//! ## Main Modules
//!
//! - [`graph`]: `PipelineGraph`, `build`, `CompiledPipeline`, `Node`, `Router`.
//! - [`retry`]: `RetryPolicy`, `execute_with_retry`.
//! - [`state`]: `PipelineState` and its well-known keys.
//! - [`registry`]: `PipelineDefinition` (serde) and `NodeRegistry` with builtin kinds.
//! - [`stream`]: events emitted by `CompiledPipeline::stream`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pipegraph::{FnNode, FnRouter, PipelineGraph, PipelineState, RetryPolicy};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut graph = PipelineGraph::new("start", "end");
//! graph
//!     .add_node("start", FnNode::arc(|s: PipelineState| async move { Ok(s) }))
//!     .add_router(
//!         "is_question",
//!         FnRouter::arc(|s: &PipelineState, _: &[String]| {
//!             Ok(if s.input_text().ends_with('?') { "yes" } else { "no" }.to_string())
//!         }),
//!     )
//!     .add_node("answer", FnNode::arc(|mut s: PipelineState| async move {
//!         s.record_output("answer", "Let me check.");
//!         Ok(s)
//!     }))
//!     .add_node("end", FnNode::arc(|s: PipelineState| async move { Ok(s) }))
//!     .add_edge("start", "is_question")
//!     .add_conditional_edge("is_question", "answer", "yes")
//!     .add_conditional_edge("is_question", "end", "no")
//!     .add_edge("answer", "end");
//!
//! let pipeline = graph.compile(RetryPolicy::default()).unwrap();
//! let out = pipeline.invoke(PipelineState::from_input("Where is my order?")).await.unwrap();
//! println!("{}", out.input_text());
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod registry;
pub mod retry;
pub mod state;
pub mod stream;

pub use error::{BoxError, NodeError, PipelineError};
pub use graph::{
    build, run, CompiledPipeline, Edge, FnNode, FnRouter, GraphBuildError, Node,
    NodeDefinition, NodeKind, PipelineGraph, RouteDecision, RouteTable, Router,
};
pub use registry::{
    DefinitionError, NodeFactory, NodeRegistry, NodeSpec, PipelineDefinition, RetryOverride,
};
pub use retry::{execute_with_retry, RetryFailure, RetryPolicy, RetryPredicate};
pub use state::{PipelineState, LAST_NODE_OUTPUT, OUTPUTS};
pub use stream::{StreamEvent, StreamMode};
