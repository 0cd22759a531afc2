//! Pipelines loaded from JSON definitions through the builtin node registry.

use pipegraph::{
    DefinitionError, GraphBuildError, NodeRegistry, PipelineDefinition, PipelineError,
    PipelineState,
};
use serde_json::json;

use crate::common::fast_policy;

const INTENT_BOT: &str = r#"{
    "start": "start",
    "end": "end",
    "nodes": [
        { "id": "start", "kind": "start" },
        { "id": "route", "kind": "state_key_router", "params": { "key": "intent" } },
        { "id": "billing", "kind": "template", "params": { "template": "Billing team: {input}" } },
        { "id": "sales", "kind": "set_value", "params": { "value": "Sales will call you." } },
        { "id": "end", "kind": "end" }
    ],
    "edges": [
        { "source": "start", "target": "route" },
        { "source": "route", "target": "billing", "condition": "billing" },
        { "source": "route", "target": "sales", "condition": "sales" },
        { "source": "billing", "target": "end" },
        { "source": "sales", "target": "end" }
    ]
}"#;

fn with_intent(input: &str, intent: &str) -> PipelineState {
    let mut state = PipelineState::from_input(input);
    state.insert("intent", intent);
    state
}

#[tokio::test]
async fn json_definition_runs_end_to_end() {
    let compiled = PipelineDefinition::from_json(INTENT_BOT)
        .unwrap()
        .compile(&NodeRegistry::with_builtins(), fast_policy(1))
        .unwrap();

    let out = compiled
        .invoke(with_intent("invoice missing", "billing"))
        .await
        .unwrap();
    assert_eq!(
        out.last_node_output(),
        Some(&json!("Billing team: invoice missing"))
    );

    let out = compiled.invoke(with_intent("quote?", "sales")).await.unwrap();
    assert_eq!(out.last_node_output(), Some(&json!("Sales will call you.")));
}

/// **Scenario**: a state value with no route is a routing error at the router node.
#[tokio::test]
async fn unrouted_intent_fails_at_router() {
    let compiled = PipelineDefinition::from_json(INTENT_BOT)
        .unwrap()
        .compile(&NodeRegistry::with_builtins(), fast_policy(3))
        .unwrap();
    let err = compiled
        .invoke(with_intent("hello", "support"))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, PipelineError::Routing { node_id, condition } if node_id == "route" && condition == "support"),
        "{:?}",
        err
    );
}

#[test]
fn definition_with_unknown_kind_is_rejected() {
    let mut definition = PipelineDefinition::from_json(INTENT_BOT).unwrap();
    definition.nodes[3].kind = "vector_search".into();
    let err = definition
        .compile(&NodeRegistry::with_builtins(), fast_policy(1))
        .unwrap_err();
    assert!(
        matches!(&err, DefinitionError::UnknownKind { node_id, .. } if node_id == "sales"),
        "{}",
        err
    );
}

#[test]
fn definition_with_orphan_is_rejected() {
    let mut definition = PipelineDefinition::from_json(INTENT_BOT).unwrap();
    definition.edges.retain(|edge| edge.target != "sales");
    let err = definition
        .compile(&NodeRegistry::with_builtins(), fast_policy(1))
        .unwrap_err();
    assert!(
        matches!(err, DefinitionError::Build(GraphBuildError::OrphanedNode(ref id)) if id == "sales"),
        "{}",
        err
    );
}

#[test]
fn definition_serializes_back_to_the_same_document() {
    let definition = PipelineDefinition::from_json(INTENT_BOT).unwrap();
    let value = serde_json::to_value(&definition).unwrap();
    let expected: serde_json::Value = serde_json::from_str(INTENT_BOT).unwrap();
    assert_eq!(value, expected);
}
