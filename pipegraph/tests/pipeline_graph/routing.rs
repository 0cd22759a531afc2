//! Router dispatch through full runs: chosen branch, routing errors, purity.

use std::sync::Arc;

use pipegraph::{
    CompiledPipeline, FnRouter, PipelineError, PipelineGraph, PipelineState, RouteDecision,
};
use serde_json::json;

use crate::common::{fast_policy, AppendNode, FlakyNode, SpyNode};

/// Router `R` reading the `answer` key, routes `{"yes": "Y", "no": "N"}` (or only "yes").
fn yes_no_graph(with_no_route: bool, n: Arc<SpyNode>) -> CompiledPipeline {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_router(
            "R",
            FnRouter::arc(|state: &PipelineState, _: &[String]| {
                Ok(state
                    .get("answer")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string())
            }),
        )
        .add_node("Y", AppendNode::arc("Y"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "R")
        .add_conditional_edge("R", "Y", "yes")
        .add_edge("Y", "end");
    if with_no_route {
        graph
            .add_node("N", n)
            .add_conditional_edge("R", "N", "no")
            .add_edge("N", "end");
    }
    graph.compile(fast_policy(3)).expect("compiles")
}

fn answer(value: &str) -> PipelineState {
    let mut state = PipelineState::from_input("q");
    state.insert("answer", value);
    state
}

/// **Scenario**: R evaluates to "yes"; the run goes R → Y → end and never visits N.
#[tokio::test]
async fn router_takes_matching_branch() {
    let n = Arc::new(SpyNode::default());
    let compiled = yes_no_graph(true, n.clone());

    let out = compiled.invoke(answer("yes")).await.unwrap();
    assert_eq!(out.outputs_of("Y"), &[json!("Y(start(q))")]);
    assert_eq!(out.last_node_output(), Some(&json!("end(Y(start(q)))")));
    assert_eq!(n.calls(), 0);
}

/// **Scenario**: route table `{"yes": "Y"}` and state evaluating to "no": routing error
/// at R, no retry, nothing after R runs.
#[tokio::test]
async fn unmatched_condition_is_routing_error() {
    let compiled = yes_no_graph(false, Arc::new(SpyNode::default()));

    let err = compiled.invoke(answer("no")).await.unwrap_err();
    match &err {
        PipelineError::Routing { node_id, condition } => {
            assert_eq!(node_id, "R");
            assert_eq!(condition, "no");
        }
        other => panic!("expected Routing, got {:?}", other),
    }
    assert_eq!(err.attempts(), 1);
}

/// **Scenario**: dispatch is a pure function of state: same state, same decision,
/// and the state passed in is unchanged.
#[tokio::test]
async fn dispatch_is_pure() {
    let compiled = yes_no_graph(true, Arc::new(SpyNode::default()));
    for value in ["yes", "no"] {
        let state = answer(value);
        let before = state.clone();
        let first = compiled.route("R", &state).await.unwrap();
        let second = compiled.route("R", &state).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(state, before);
    }
    assert_eq!(
        compiled.route("R", &answer("no")).await.unwrap(),
        RouteDecision {
            condition: "no".into(),
            target: "N".into()
        }
    );
}

/// **Scenario**: a router fed by two nodes reads whichever of them produced output.
#[tokio::test]
async fn router_sees_incoming_ids() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_router(
            "pick",
            FnRouter::arc(|state: &PipelineState, _: &[String]| {
                Ok(if state.input_text().contains("urgent") {
                    "escalate"
                } else {
                    "normal"
                }
                .to_string())
            }),
        )
        .add_node("escalate", AppendNode::arc("escalate"))
        .add_node("normal", AppendNode::arc("normal"))
        .add_router(
            "R",
            FnRouter::arc(|state: &PipelineState, incoming: &[String]| {
                let source = incoming
                    .iter()
                    .find(|id| !state.outputs_of(id).is_empty())
                    .cloned()
                    .unwrap_or_default();
                Ok(source)
            }),
        )
        .add_node("after_escalate", AppendNode::arc("after_escalate"))
        .add_node("after_normal", AppendNode::arc("after_normal"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "pick")
        .add_conditional_edge("pick", "escalate", "escalate")
        .add_conditional_edge("pick", "normal", "normal")
        .add_edge("escalate", "R")
        .add_edge("normal", "R")
        .add_conditional_edge("R", "after_escalate", "escalate")
        .add_conditional_edge("R", "after_normal", "normal")
        .add_edge("after_escalate", "end")
        .add_edge("after_normal", "end");
    let compiled = graph.compile(fast_policy(1)).unwrap();
    assert_eq!(
        compiled.incoming("R"),
        Some(&["escalate".to_string(), "normal".to_string()][..])
    );

    let out = compiled
        .invoke(PipelineState::from_input("urgent: refund"))
        .await
        .unwrap();
    assert_eq!(out.outputs_of("after_escalate").len(), 1);
    assert!(out.outputs_of("after_normal").is_empty());

    let out = compiled.invoke(PipelineState::from_input("hi")).await.unwrap();
    assert_eq!(out.outputs_of("after_normal").len(), 1);
}

/// **Scenario**: a node failing after a router reports its own id, not the router's.
#[tokio::test]
async fn failure_after_router_names_failing_node() {
    let flaky = FlakyNode::always_failing();
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_router(
            "R",
            FnRouter::arc(|_: &PipelineState, _: &[String]| Ok("go".to_string())),
        )
        .add_node("llm", flaky.clone())
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "R")
        .add_conditional_edge("R", "llm", "go")
        .add_edge("llm", "end");
    let err = graph
        .compile(fast_policy(3))
        .unwrap()
        .invoke(PipelineState::new())
        .await
        .unwrap_err();
    assert_eq!(err.node_id(), "llm");
    assert_eq!(flaky.calls(), 1);
}
