//! Generic node kinds usable from any pipeline definition.
//!
//! Ordinary kinds record their output under the node id, so routers can find it through
//! their incoming ids. Routers never modify state.

use serde::Deserialize;
use serde_json::Value;

use crate::error::NodeError;
use crate::graph::{FnNode, FnRouter, NodeKind};
use crate::state::PipelineState;

use super::{DefinitionError, NodeSpec};

pub const START: &str = "start";
pub const END: &str = "end";
pub const PASSTHROUGH: &str = "passthrough";
pub const SET_VALUE: &str = "set_value";
pub const TEMPLATE: &str = "template";
pub const STATE_KEY_ROUTER: &str = "state_key_router";
pub const KEYWORD_ROUTER: &str = "keyword_router";

/// Placeholder replaced by the node's input in `template` nodes.
pub const INPUT_PLACEHOLDER: &str = "{input}";

fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Forwards its input unchanged: `start`, `end` and `passthrough`.
pub fn passthrough(spec: &NodeSpec) -> Result<NodeKind, DefinitionError> {
    let id = spec.id.clone();
    Ok(NodeKind::Ordinary(FnNode::arc(move |mut state: PipelineState| {
        let id = id.clone();
        async move {
            let input = state.last_node_output().cloned().unwrap_or(Value::Null);
            state.record_output(&id, input);
            Ok(state)
        }
    })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SetValueParams {
    value: Value,
    /// Also stored under this state key when set.
    #[serde(default)]
    key: Option<String>,
}

/// Emits a constant `value`, e.g. a canned reply.
pub fn set_value(spec: &NodeSpec) -> Result<NodeKind, DefinitionError> {
    let params: SetValueParams = spec.params_as()?;
    let id = spec.id.clone();
    Ok(NodeKind::Ordinary(FnNode::arc(move |mut state: PipelineState| {
        let id = id.clone();
        let value = params.value.clone();
        let key = params.key.clone();
        async move {
            if let Some(key) = key {
                state.insert(key, value.clone());
            }
            state.record_output(&id, value);
            Ok(state)
        }
    })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateParams {
    template: String,
}

/// Emits `template` with every `{input}` replaced by the input text.
pub fn template(spec: &NodeSpec) -> Result<NodeKind, DefinitionError> {
    let params: TemplateParams = spec.params_as()?;
    let id = spec.id.clone();
    Ok(NodeKind::Ordinary(FnNode::arc(move |mut state: PipelineState| {
        let id = id.clone();
        let rendered = params
            .template
            .replace(INPUT_PLACEHOLDER, &state.input_text());
        async move {
            state.record_output(&id, rendered);
            Ok(state)
        }
    })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StateKeyParams {
    key: String,
    /// Label used when the key is unset or null.
    #[serde(default)]
    default: Option<String>,
}

/// Routes on the value stored under `key`.
pub fn state_key_router(spec: &NodeSpec) -> Result<NodeKind, DefinitionError> {
    let params: StateKeyParams = spec.params_as()?;
    Ok(NodeKind::Router(FnRouter::arc(
        move |state: &PipelineState, _incoming: &[String]| {
            match (state.get(&params.key), &params.default) {
                (Some(value), _) if !value.is_null() => Ok(text_of(Some(value))),
                (_, Some(default)) => Ok(default.clone()),
                _ => Err(NodeError::ExecutionFailed(format!(
                    "state key '{}' is not set",
                    params.key
                ))),
            }
        },
    )))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KeywordParams {
    keywords: Vec<String>,
    /// Label used when no keyword matches.
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    case_sensitive: bool,
}

/// Routes on the first keyword (in declaration order) contained in the input.
///
/// The input is the latest output of the router's incoming nodes, falling back to
/// `last_node_output`. The label is the keyword itself.
pub fn keyword_router(spec: &NodeSpec) -> Result<NodeKind, DefinitionError> {
    let params: KeywordParams = spec.params_as()?;
    if params.keywords.is_empty() && params.default.is_none() {
        return Err(DefinitionError::invalid_params(
            spec,
            "needs at least one keyword or a default",
        ));
    }
    Ok(NodeKind::Router(FnRouter::arc(
        move |state: &PipelineState, incoming: &[String]| {
            let input = text_of(
                state
                    .output_from_any(incoming)
                    .or_else(|| state.last_node_output()),
            );
            let haystack = if params.case_sensitive {
                input
            } else {
                input.to_lowercase()
            };
            let hit = params.keywords.iter().find(|keyword| {
                if params.case_sensitive {
                    haystack.contains(keyword.as_str())
                } else {
                    haystack.contains(&keyword.to_lowercase())
                }
            });
            match (hit, &params.default) {
                (Some(keyword), _) => Ok(keyword.clone()),
                (None, Some(default)) => Ok(default.clone()),
                (None, None) => Err(NodeError::ExecutionFailed(
                    "no keyword matched and no default is set".into(),
                )),
            }
        },
    )))
}
