//! Router dispatch: route tables and the wrapper that turns a router's condition label
//! into the id of the next node.

use std::sync::Arc;

use crate::error::PipelineError;
use crate::retry::{execute_with_retry, RetryPolicy};
use crate::state::PipelineState;

use super::logging;
use super::node::Router;

/// Condition label → target node id for one router, in edge declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<(String, String)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route. Returns `false` (and leaves the table unchanged) if `condition`
    /// is already present.
    pub fn insert(&mut self, condition: impl Into<String>, target: impl Into<String>) -> bool {
        let condition = condition.into();
        if self.get(&condition).is_some() {
            return false;
        }
        self.routes.push((condition, target.into()));
        true
    }

    /// Target for `condition`, if the table has one.
    pub fn get(&self, condition: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|(label, _)| label == condition)
            .map(|(_, target)| target.as_str())
    }

    pub fn conditions(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(label, _)| label.as_str())
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(_, target)| target.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// A router's decision: the label it produced and the node it selects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDecision {
    pub condition: String,
    pub target: String,
}

/// Compiled form of a router node: the router, its route table and its incoming node ids.
#[derive(Clone)]
pub(crate) struct RouterDispatch {
    pub(crate) router: Arc<dyn Router>,
    pub(crate) routes: RouteTable,
    pub(crate) incoming: Vec<String>,
}

impl RouterDispatch {
    /// Evaluates the router against `state` and resolves the label through the route table.
    ///
    /// The router call runs under `policy`. A label missing from the table is a
    /// [`PipelineError::Routing`] and is not retried.
    pub(crate) async fn dispatch(
        &self,
        node_id: &str,
        policy: &RetryPolicy,
        state: &PipelineState,
    ) -> Result<RouteDecision, PipelineError> {
        let condition = execute_with_retry(policy, node_id, || {
            self.router.route(state, &self.incoming)
        })
        .await
        .map_err(|failure| PipelineError::Node {
            node_id: node_id.to_string(),
            attempts: failure.attempts,
            source: failure.error,
        })?;

        match self.routes.get(&condition) {
            Some(target) => {
                logging::log_route(node_id, &condition, target);
                Ok(RouteDecision {
                    target: target.to_string(),
                    condition,
                })
            }
            None => Err(PipelineError::Routing {
                node_id: node_id.to_string(),
                condition,
            }),
        }
    }
}
