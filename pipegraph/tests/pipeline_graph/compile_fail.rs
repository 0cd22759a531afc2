//! Build failure cases: cycles, unreachable end, orphans, malformed routers and nodes.

use std::sync::Arc;

use pipegraph::{
    build, Edge, FnRouter, GraphBuildError, NodeDefinition, PipelineGraph, PipelineState,
    RetryPolicy,
};

use crate::common::{AppendNode, SpyNode};

fn yes_router() -> Arc<dyn pipegraph::Router> {
    FnRouter::arc(|_: &PipelineState, _: &[String]| Ok("yes".to_string()))
}

/// **Scenario**: adding `C → A` to `start → A → B → C → end` is a cycle; a node on it is
/// named and no node ever runs.
#[tokio::test]
async fn cycle_is_rejected_before_any_node_runs() {
    let spies: Vec<Arc<SpyNode>> = (0..5).map(|_| Arc::new(SpyNode::default())).collect();
    let ids = ["start", "A", "B", "C", "end"];
    let nodes = ids
        .iter()
        .zip(&spies)
        .map(|(id, spy)| NodeDefinition::node(*id, spy.clone()))
        .collect();
    let edges = vec![
        Edge::new("start", "A"),
        Edge::new("A", "B"),
        Edge::new("B", "C"),
        Edge::new("C", "end"),
        Edge::new("C", "A"),
    ];

    match build(nodes, edges, "start", "end", RetryPolicy::default()) {
        Err(GraphBuildError::CycleDetected(node)) => {
            assert!(["A", "B", "C"].contains(&node.as_str()), "{}", node)
        }
        other => panic!("expected CycleDetected, got {:?}", other.err()),
    }
    assert!(spies.iter().all(|spy| spy.calls() == 0));
}

/// **Scenario**: a cycle through a router branch is rejected as well.
#[test]
fn cycle_through_router_branch_is_rejected() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_router("R", yes_router())
        .add_node("retry_answer", AppendNode::arc("retry_answer"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "R")
        .add_conditional_edge("R", "end", "yes")
        .add_conditional_edge("R", "retry_answer", "no")
        .add_edge("retry_answer", "R");
    assert!(matches!(
        graph.compile(RetryPolicy::default()),
        Err(GraphBuildError::CycleDetected(_))
    ));
}

#[test]
fn unreachable_end_is_rejected() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_node("a", AppendNode::arc("a"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "a")
        .add_edge("end", "a");
    match graph.compile(RetryPolicy::default()) {
        Err(GraphBuildError::UnreachableEnd { start, end }) => {
            assert_eq!(start, "start");
            assert_eq!(end, "end");
        }
        other => panic!("expected UnreachableEnd, got {:?}", other.err()),
    }
}

#[test]
fn orphaned_node_is_rejected() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_node("orphan", AppendNode::arc("orphan"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "end")
        .add_edge("orphan", "end");
    assert_eq!(
        graph.compile(RetryPolicy::default()).err(),
        Some(GraphBuildError::OrphanedNode("orphan".into()))
    );
}

#[test]
fn router_without_routes_is_rejected() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_router("triage", yes_router())
        .add_router("R", yes_router())
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "triage")
        .add_conditional_edge("triage", "R", "yes")
        .add_conditional_edge("triage", "end", "no");
    assert_eq!(
        graph.compile(RetryPolicy::default()).err(),
        Some(GraphBuildError::RouterWithoutRoutes("R".into()))
    );
}

#[test]
fn ordinary_node_with_two_successors_is_ambiguous() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_node("a", AppendNode::arc("a"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "a")
        .add_edge("start", "end")
        .add_edge("a", "end");
    let err = graph.compile(RetryPolicy::default()).unwrap_err();
    assert_eq!(err, GraphBuildError::AmbiguousSuccessor("start".into()));
    assert_eq!(err.node_id(), "start");
}

/// **Scenario**: an ordinary node other than end with no successor is a dead end.
#[test]
fn dead_end_node_is_rejected() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_router("R", yes_router())
        .add_node("stuck", AppendNode::arc("stuck"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "R")
        .add_conditional_edge("R", "end", "yes")
        .add_conditional_edge("R", "stuck", "no");
    assert_eq!(
        graph.compile(RetryPolicy::default()).err(),
        Some(GraphBuildError::DeadEnd("stuck".into()))
    );
}

#[test]
fn end_with_successors_is_rejected() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_node("end", AppendNode::arc("end"))
        .add_node("after", AppendNode::arc("after"))
        .add_edge("start", "end")
        .add_edge("end", "after");
    assert_eq!(
        graph.compile(RetryPolicy::default()).err(),
        Some(GraphBuildError::EndHasSuccessors("end".into()))
    );
}

#[test]
fn edge_to_unknown_node_is_rejected() {
    let mut graph = PipelineGraph::new("start", "end");
    graph
        .add_node("start", AppendNode::arc("start"))
        .add_node("end", AppendNode::arc("end"))
        .add_edge("start", "missing");
    match graph.compile(RetryPolicy::default()) {
        Err(GraphBuildError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        other => panic!("expected NodeNotFound, got {:?}", other.err()),
    }
}

/// **Scenario**: building is referentially transparent; the same input gives the same error.
#[test]
fn build_is_deterministic() {
    let make = || {
        let mut graph = PipelineGraph::new("start", "end");
        graph
            .add_node("start", AppendNode::arc("start"))
            .add_node("x", AppendNode::arc("x"))
            .add_node("y", AppendNode::arc("y"))
            .add_node("end", AppendNode::arc("end"))
            .add_edge("start", "x")
            .add_edge("x", "y")
            .add_edge("y", "x")
            .add_edge("y", "end");
        graph.compile(RetryPolicy::default()).err()
    };
    let first = make();
    assert!(first.is_some());
    for _ in 0..10 {
        assert_eq!(make(), first);
    }
}
