//! Streaming types for pipeline runs.
//!
//! Defines stream modes and events emitted by `CompiledPipeline::stream` while a run
//! progresses, so a chat front end can show intermediate results.

use crate::state::PipelineState;

/// Stream mode selector: which kinds of events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Emit full state after each ordinary node completes.
    Values,
    /// Emit the node id together with the state after that node.
    Updates,
    /// Emit every router decision.
    Routes,
}

/// Streamed event emitted while running a pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    /// Full state snapshot after a node finishes.
    Values(PipelineState),
    /// Node id and the state it produced.
    Updates { node_id: String, state: PipelineState },
    /// A router chose `target` because it evaluated to `condition`.
    Route {
        node_id: String,
        condition: String,
        target: String,
    },
    /// The run aborted at `node_id`. Always emitted, whatever the modes; last event of the stream.
    Failed { node_id: String, message: String },
}
