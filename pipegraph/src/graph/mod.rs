//! Pipeline graph: nodes, routers and edges; build (validate) then run.
//!
//! Add nodes and edges to a [`PipelineGraph`] (or hand lists to [`build`]), compile it
//! into a [`CompiledPipeline`], then invoke it with a [`PipelineState`](crate::PipelineState).

mod compile_error;
mod compiled;
mod edge;
pub mod logging;
mod node;
mod pipeline_graph;
mod router;
mod run_context;
mod validate;

pub use compile_error::GraphBuildError;
pub use compiled::{run, CompiledPipeline};
pub use edge::Edge;
pub use node::{FnNode, FnRouter, Node, NodeDefinition, NodeKind, Router};
pub use pipeline_graph::{build, PipelineGraph};
pub use router::{RouteDecision, RouteTable};
