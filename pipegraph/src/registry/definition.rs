//! Serializable pipeline definitions and their compilation through a [`NodeRegistry`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::graph::{build, CompiledPipeline, Edge, GraphBuildError, NodeDefinition};
use crate::retry::RetryPolicy;

use super::NodeRegistry;

/// Error turning a [`PipelineDefinition`] into a [`CompiledPipeline`].
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The definition document is not valid JSON or does not match the schema.
    #[error("invalid pipeline definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// No factory is registered for the node's kind.
    #[error("node '{node_id}': unknown kind '{kind}'")]
    UnknownKind { node_id: String, kind: String },

    /// The node's params do not fit its kind.
    #[error("node '{node_id}' ({kind}): invalid params: {message}")]
    InvalidParams {
        node_id: String,
        kind: String,
        message: String,
    },

    /// The nodes were built but the graph does not validate.
    #[error(transparent)]
    Build(#[from] GraphBuildError),
}

impl DefinitionError {
    pub fn invalid_params(spec: &NodeSpec, message: impl Into<String>) -> Self {
        DefinitionError::InvalidParams {
            node_id: spec.id.clone(),
            kind: spec.kind.clone(),
            message: message.into(),
        }
    }
}

/// Per-node retry settings; unset fields keep the pipeline-wide value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<bool>,
}

impl RetryOverride {
    /// `base` with the fields set here replaced. The retryability predicate is kept.
    pub fn apply(&self, base: &RetryPolicy) -> RetryPolicy {
        let mut policy = base.clone();
        if let Some(n) = self.max_attempts {
            policy = policy.with_max_attempts(n);
        }
        if let Some(ms) = self.initial_interval_ms {
            policy = policy.with_initial_interval(Duration::from_millis(ms));
        }
        if let Some(factor) = self.backoff_factor {
            policy = policy.with_backoff_factor(factor);
        }
        if let Some(ms) = self.max_interval_ms {
            policy = policy.with_max_interval(Duration::from_millis(ms));
        }
        if let Some(jitter) = self.jitter {
            policy = policy.with_jitter(jitter);
        }
        policy
    }
}

/// One node entry of a stored pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    /// Registry kind name, e.g. `template` or `keyword_router`.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Kind-specific settings.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryOverride>,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            label: None,
            params: Value::Null,
            retry: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryOverride) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Deserializes `params` into the kind's settings type; `null` reads as `{}`.
    pub fn params_as<T>(&self) -> Result<T, DefinitionError>
    where
        T: serde::de::DeserializeOwned,
    {
        let params = match &self.params {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };
        serde_json::from_value(params).map_err(|e| DefinitionError::invalid_params(self, e.to_string()))
    }
}

/// A pipeline as stored in configuration: nodes by kind, edges, start and end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub start: String,
    pub end: String,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl PipelineDefinition {
    pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds every node through `registry`, then validates and compiles the graph.
    ///
    /// `retry_policy` applies to nodes without a `retry` entry; entries override it
    /// field by field.
    pub fn compile(
        &self,
        registry: &NodeRegistry,
        retry_policy: RetryPolicy,
    ) -> Result<CompiledPipeline, DefinitionError> {
        let mut definitions = Vec::with_capacity(self.nodes.len());
        for spec in &self.nodes {
            let kind = registry.create(spec)?;
            let mut definition = NodeDefinition {
                id: spec.id.clone(),
                label: spec.id.clone(),
                kind,
                retry_policy: None,
            };
            if let Some(label) = &spec.label {
                definition = definition.with_label(label.clone());
            }
            if let Some(retry) = &spec.retry {
                definition = definition.with_retry_policy(retry.apply(&retry_policy));
            }
            definitions.push(definition);
        }
        let compiled = build(
            definitions,
            self.edges.clone(),
            self.start.clone(),
            self.end.clone(),
            retry_policy,
        )?;
        Ok(compiled)
    }
}
