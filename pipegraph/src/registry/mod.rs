//! Node registry: turns stored pipeline definitions into executable nodes.
//!
//! A [`PipelineDefinition`] names each node's `kind`; the [`NodeRegistry`] maps kind
//! names to factories that build the node (or router) from the node's `params`.
//! [`NodeRegistry::with_builtins`] registers the generic kinds in [`builtin`].

pub mod builtin;
mod definition;

use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::NodeKind;

pub use definition::{DefinitionError, NodeSpec, PipelineDefinition, RetryOverride};

/// Builds a node from its definition entry.
pub type NodeFactory = Arc<dyn Fn(&NodeSpec) -> Result<NodeKind, DefinitionError> + Send + Sync>;

/// Registry of node kinds available to pipeline definitions.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    factories: HashMap<String, NodeFactory>,
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `kind`, replacing any earlier factory of that name.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&NodeSpec) -> Result<NodeKind, DefinitionError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
        self
    }

    /// Removes a kind. Returns whether it was registered.
    pub fn unregister(&mut self, kind: &str) -> bool {
        self.factories.remove(kind).is_some()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Builds the node described by `spec`.
    pub fn create(&self, spec: &NodeSpec) -> Result<NodeKind, DefinitionError> {
        let factory = self
            .factories
            .get(&spec.kind)
            .ok_or_else(|| DefinitionError::UnknownKind {
                node_id: spec.id.clone(),
                kind: spec.kind.clone(),
            })?;
        let kind = factory(spec)?;
        tracing::debug!(node_id = %spec.id, kind = %spec.kind, "node created from definition");
        Ok(kind)
    }

    /// Registry with every kind from [`builtin`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register(builtin::START, builtin::passthrough)
            .register(builtin::END, builtin::passthrough)
            .register(builtin::PASSTHROUGH, builtin::passthrough)
            .register(builtin::SET_VALUE, builtin::set_value)
            .register(builtin::TEMPLATE, builtin::template)
            .register(builtin::STATE_KEY_ROUTER, builtin::state_key_router)
            .register(builtin::KEYWORD_ROUTER, builtin::keyword_router);
        registry
    }
}
