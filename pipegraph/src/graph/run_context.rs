//! Run context for streaming runs: the event sender plus the selected stream modes.

use std::collections::HashSet;

use tokio::sync::{mpsc, watch};

use crate::error::PipelineError;
use crate::state::PipelineState;
use crate::stream::{StreamEvent, StreamMode};

use super::router::RouteDecision;

pub(crate) struct RunContext {
    pub(crate) stream_tx: mpsc::Sender<StreamEvent>,
    pub(crate) stream_mode: HashSet<StreamMode>,
    /// Id of the step currently executing; read when the run task aborts.
    pub(crate) current_node: watch::Sender<String>,
}

impl RunContext {
    // Send errors are ignored: the consumer may have dropped the stream.

    pub(crate) fn enter(&self, node_id: &str) {
        self.current_node.send_replace(node_id.to_string());
    }

    pub(crate) async fn emit_update(&self, node_id: &str, state: &PipelineState) {
        if self.stream_mode.contains(&StreamMode::Values) {
            let _ = self.stream_tx.send(StreamEvent::Values(state.clone())).await;
        }
        if self.stream_mode.contains(&StreamMode::Updates) {
            let _ = self
                .stream_tx
                .send(StreamEvent::Updates {
                    node_id: node_id.to_string(),
                    state: state.clone(),
                })
                .await;
        }
    }

    pub(crate) async fn emit_route(&self, node_id: &str, decision: &RouteDecision) {
        if self.stream_mode.contains(&StreamMode::Routes) {
            let _ = self
                .stream_tx
                .send(StreamEvent::Route {
                    node_id: node_id.to_string(),
                    condition: decision.condition.clone(),
                    target: decision.target.clone(),
                })
                .await;
        }
    }

    pub(crate) async fn emit_failure(&self, error: &PipelineError) {
        emit_failed(&self.stream_tx, error.node_id(), error.to_string()).await;
    }
}

pub(crate) async fn emit_failed(tx: &mpsc::Sender<StreamEvent>, node_id: &str, message: String) {
    let _ = tx
        .send(StreamEvent::Failed {
            node_id: node_id.to_string(),
            message,
        })
        .await;
}
