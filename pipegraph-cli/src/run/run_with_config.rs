//! Run a pipeline definition with a given config, returns final state.

use std::collections::HashSet;

use pipegraph::{PipelineDefinition, PipelineState, StreamEvent, StreamMode};
use tokio_stream::StreamExt;

use super::{compile_definition, Error};
use crate::config::RunConfig;

/// Compiles `definition` with `config` and invokes it with `state`.
pub async fn run_with_config(
    config: &RunConfig,
    definition: &PipelineDefinition,
    state: PipelineState,
) -> Result<PipelineState, Error> {
    let compiled = compile_definition(definition, config)?;
    tracing::debug!(
        start = compiled.start_id(),
        nodes = compiled.node_count(),
        max_attempts = config.max_attempts,
        "pipeline compiled"
    );
    Ok(compiled.invoke(state).await?)
}

/// Like [`run_with_config`], printing each node update and router decision to stderr.
pub async fn stream_with_config(
    config: &RunConfig,
    definition: &PipelineDefinition,
    state: PipelineState,
) -> Result<PipelineState, Error> {
    let compiled = compile_definition(definition, config)?;
    let modes: HashSet<StreamMode> = [StreamMode::Updates, StreamMode::Routes].into();
    let mut stream = compiled.stream(state.clone(), modes);

    let mut last = state;
    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Updates { node_id, state } => {
                eprintln!("[{}] {}", node_id, state.input_text());
                last = state;
            }
            StreamEvent::Route {
                node_id,
                condition,
                target,
            } => eprintln!("[{}] {} -> {}", node_id, condition, target),
            StreamEvent::Failed { node_id, message } => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("run failed at '{}': {}", node_id, message),
                )
                .into())
            }
            StreamEvent::Values(_) => {}
        }
    }
    Ok(last)
}
