//! Directed edge between two nodes, optionally labelled with a router condition.

use serde::{Deserialize, Serialize};

/// `source → target`. `condition` is set only when `source` is a router: it is the label
/// the router must return for the run to follow this edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            condition: None,
        }
    }

    /// Edge taken when the router `source` returns `condition`.
    pub fn conditional(
        source: impl Into<String>,
        target: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            condition: Some(condition.into()),
        }
    }
}
