//! Invoke: linear runs, state threading and the free `run` function.

use pipegraph::{run, PipelineGraph, PipelineState, RetryPolicy};
use serde_json::json;

use crate::common::AppendNode;

/// **Scenario**: `start → A → end` builds; running from `{}` visits A once and its output
/// flows on as `last_node_output`.
#[tokio::test]
async fn linear_graph_runs_each_node_once() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_node("A", AppendNode::arc("A"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "A")
        .add_edge("A", "end");
    let compiled = graph.compile(RetryPolicy::default()).expect("compiles");

    let out = run(&compiled, PipelineState::new()).await.unwrap();
    assert_eq!(out.outputs_of("A"), &[json!("A(start())")]);
    assert_eq!(out.last_node_output(), Some(&json!("end(A(start()))")));
}

#[tokio::test]
async fn initial_state_keys_survive_the_run() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "end");
    let compiled = graph.compile(RetryPolicy::default()).unwrap();

    let mut state = PipelineState::from_input("hi");
    state.insert("session_id", "s-42");
    let out = compiled.invoke(state).await.unwrap();
    assert_eq!(out.get("session_id"), Some(&json!("s-42")));
    assert_eq!(out.input_text(), "end(start(hi))");
}

/// **Scenario**: the compiled pipeline is reusable; runs do not leak into each other.
#[tokio::test]
async fn compiled_pipeline_is_reusable() {
    let mut graph = PipelineGraph::new("only", "only");
    graph.add_node("only", AppendNode::arc("only"));
    let compiled = graph.compile(RetryPolicy::default()).unwrap();

    let first = compiled.invoke(PipelineState::from_input("a")).await.unwrap();
    let second = compiled.invoke(PipelineState::from_input("b")).await.unwrap();
    assert_eq!(first.outputs_of("only"), &[json!("only(a)")]);
    assert_eq!(second.outputs_of("only"), &[json!("only(b)")]);
}
