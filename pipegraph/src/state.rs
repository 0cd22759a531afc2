//! Pipeline state: the key-value context threaded through one run.
//!
//! Nodes receive the state by value and return the next state. Two keys are reserved:
//! [`LAST_NODE_OUTPUT`] holds the value the next node consumes, and [`OUTPUTS`] keeps
//! every node's outputs keyed by node name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the value the next node consumes as input.
pub const LAST_NODE_OUTPUT: &str = "last_node_output";

/// Key of the per-node-name output history.
pub const OUTPUTS: &str = "outputs";

/// Mapping from string keys to JSON values, owned by exactly one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineState {
    values: Map<String, Value>,
}

impl PipelineState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state whose `last_node_output` is `input`, e.g. the inbound chat message.
    pub fn from_input(input: impl Into<Value>) -> Self {
        let mut state = Self::new();
        state.insert(LAST_NODE_OUTPUT, input);
        state
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The value the next node consumes; `None` before any input was set.
    pub fn last_node_output(&self) -> Option<&Value> {
        self.get(LAST_NODE_OUTPUT)
    }

    /// `last_node_output` as text: strings verbatim, other values as JSON, empty when unset.
    pub fn input_text(&self) -> String {
        match self.last_node_output() {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Outputs recorded so far under `node_name`, oldest first.
    pub fn outputs_of(&self, node_name: &str) -> &[Value] {
        match self
            .values
            .get(OUTPUTS)
            .and_then(|outputs| outputs.get(node_name))
        {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    /// Most recent output of the first node in `node_names` that produced one.
    pub fn output_from_any<S: AsRef<str>>(&self, node_names: &[S]) -> Option<&Value> {
        node_names
            .iter()
            .find_map(|name| self.outputs_of(name.as_ref()).last())
    }

    /// Sets `last_node_output` to `output` and appends it to the history of `node_name`.
    ///
    /// A non-object value under [`OUTPUTS`] is replaced.
    pub fn record_output(&mut self, node_name: &str, output: impl Into<Value>) {
        let output = output.into();
        let outputs = self
            .values
            .entry(OUTPUTS)
            .or_insert_with(|| Value::Object(Map::new()));
        if !outputs.is_object() {
            *outputs = Value::Object(Map::new());
        }
        if let Value::Object(by_node) = outputs {
            let history = by_node
                .entry(node_name)
                .or_insert_with(|| Value::Array(Vec::new()));
            match history {
                Value::Array(items) => items.push(output.clone()),
                other => *other = Value::Array(vec![output.clone()]),
            }
        }
        self.values.insert(LAST_NODE_OUTPUT.to_string(), output);
    }

    /// Consumes the state and returns the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.values
    }
}

impl From<Map<String, Value>> for PipelineState {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}
