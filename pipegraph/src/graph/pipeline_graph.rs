//! Pipeline graph: node definitions + edges + designated start and end nodes.
//!
//! Add nodes with `add_node` / `add_router`, connect them with `add_edge` and
//! `add_conditional_edge`, then `compile` with a retry policy to get a
//! [`CompiledPipeline`]. [`build`] is the same operation for callers that already hold
//! node and edge lists (e.g. loaded from a stored pipeline definition).

use std::collections::HashMap;
use std::sync::Arc;

use crate::retry::RetryPolicy;

use super::compile_error::GraphBuildError;
use super::compiled::{CompiledPipeline, CompiledStep, StepAction};
use super::edge::Edge;
use super::node::{Node, NodeDefinition, NodeKind, Router};
use super::router::{RouteTable, RouterDispatch};
use super::validate::{find_cycle, reachable_from, Adjacency};

/// Pipeline graph before validation.
///
/// Unlike a map keyed by id, definitions are kept in insertion order and a repeated id
/// is reported by `compile` instead of silently replacing the earlier node.
pub struct PipelineGraph {
    start: String,
    end: String,
    nodes: Vec<NodeDefinition>,
    edges: Vec<Edge>,
}

impl PipelineGraph {
    /// Creates an empty graph whose runs begin at `start` and finish at `end`.
    /// Both ids must be added as nodes before `compile()`.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Adds an ordinary node. Returns `&mut Self` for method chaining.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node>) -> &mut Self {
        self.add_definition(NodeDefinition::node(id, node))
    }

    /// Adds a router node; its outgoing edges must be added with `add_conditional_edge`.
    pub fn add_router(&mut self, id: impl Into<String>, router: Arc<dyn Router>) -> &mut Self {
        self.add_definition(NodeDefinition::router(id, router))
    }

    /// Adds a fully specified node (label, retry override).
    pub fn add_definition(&mut self, definition: NodeDefinition) -> &mut Self {
        self.nodes.push(definition);
        self
    }

    /// Adds an edge from ordinary node `from_id` to `to_id`.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push(Edge::new(from_id, to_id));
        self
    }

    /// Adds the edge router `from_id` takes when it returns `condition`.
    pub fn add_conditional_edge(
        &mut self,
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        condition: impl Into<String>,
    ) -> &mut Self {
        self.edges.push(Edge::conditional(from_id, to_id, condition));
        self
    }

    /// Validates the graph and builds the executable pipeline. See [`build`].
    pub fn compile(self, retry_policy: RetryPolicy) -> Result<CompiledPipeline, GraphBuildError> {
        build(self.nodes, self.edges, self.start, self.end, retry_policy)
    }
}

/// Validates `nodes`/`edges` and compiles them into a [`CompiledPipeline`].
///
/// Checks, in order: unique ids and known edge endpoints; condition labels present
/// exactly on router edges; no cycle (a node on it is reported); `end_id` and every
/// node reachable from `start_id`; routers have at least one route with unique labels,
/// ordinary nodes other than `end_id` have exactly one successor, `end_id` has none.
///
/// `retry_policy` is attached to every node without its own override. Building has no
/// side effects; the same input always yields the same result.
pub fn build(
    nodes: Vec<NodeDefinition>,
    edges: Vec<Edge>,
    start_id: impl Into<String>,
    end_id: impl Into<String>,
    retry_policy: RetryPolicy,
) -> Result<CompiledPipeline, GraphBuildError> {
    let start = start_id.into();
    let end = end_id.into();

    let mut by_id: HashMap<&str, &NodeDefinition> = HashMap::with_capacity(nodes.len());
    let mut order: Vec<&str> = Vec::with_capacity(nodes.len());
    for def in &nodes {
        if by_id.insert(def.id.as_str(), def).is_some() {
            return Err(GraphBuildError::DuplicateNode(def.id.clone()));
        }
        order.push(def.id.as_str());
    }
    for id in [&start, &end] {
        if !by_id.contains_key(id.as_str()) {
            return Err(GraphBuildError::NodeNotFound(id.clone()));
        }
    }

    let mut adjacency: Adjacency<'_> = HashMap::new();
    let mut outgoing: HashMap<&str, Vec<&Edge>> = HashMap::new();
    let mut incoming: HashMap<&str, Vec<String>> = HashMap::new();
    for edge in &edges {
        let source = by_id
            .get(edge.source.as_str())
            .ok_or_else(|| GraphBuildError::NodeNotFound(edge.source.clone()))?;
        if !by_id.contains_key(edge.target.as_str()) {
            return Err(GraphBuildError::NodeNotFound(edge.target.clone()));
        }
        match (source.is_router(), &edge.condition) {
            (true, None) => {
                return Err(GraphBuildError::MissingCondition {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                })
            }
            (false, Some(condition)) => {
                return Err(GraphBuildError::UnexpectedCondition {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                    condition: condition.clone(),
                })
            }
            _ => {}
        }
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        outgoing.entry(edge.source.as_str()).or_default().push(edge);
        let fed_by = incoming.entry(edge.target.as_str()).or_default();
        if !fed_by.contains(&edge.source) {
            fed_by.push(edge.source.clone());
        }
    }

    if let Some(node) = find_cycle(&order, &adjacency) {
        return Err(GraphBuildError::CycleDetected(node));
    }

    let reachable = reachable_from(start.as_str(), &adjacency);
    if !reachable.contains(end.as_str()) {
        return Err(GraphBuildError::UnreachableEnd {
            start: start.clone(),
            end: end.clone(),
        });
    }
    if let Some(orphan) = order.iter().find(|id| !reachable.contains(**id)) {
        return Err(GraphBuildError::OrphanedNode(orphan.to_string()));
    }

    let shared_policy = Arc::new(retry_policy);
    let mut steps = HashMap::with_capacity(nodes.len());
    for def in &nodes {
        let out = outgoing
            .get(def.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let action = if def.id == end {
            if !out.is_empty() {
                return Err(GraphBuildError::EndHasSuccessors(def.id.clone()));
            }
            match &def.kind {
                NodeKind::Ordinary(node) => StepAction::Node {
                    node: Arc::clone(node),
                    next: None,
                },
                NodeKind::Router(_) => {
                    return Err(GraphBuildError::RouterWithoutRoutes(def.id.clone()))
                }
            }
        } else {
            match &def.kind {
                NodeKind::Ordinary(node) => match out {
                    [] => return Err(GraphBuildError::DeadEnd(def.id.clone())),
                    [edge] => StepAction::Node {
                        node: Arc::clone(node),
                        next: Some(edge.target.clone()),
                    },
                    _ => return Err(GraphBuildError::AmbiguousSuccessor(def.id.clone())),
                },
                NodeKind::Router(router) => {
                    if out.is_empty() {
                        return Err(GraphBuildError::RouterWithoutRoutes(def.id.clone()));
                    }
                    let mut routes = RouteTable::new();
                    for edge in out {
                        let condition = edge.condition.clone().unwrap_or_default();
                        if !routes.insert(condition.clone(), edge.target.clone()) {
                            return Err(GraphBuildError::DuplicateRoute {
                                router: def.id.clone(),
                                condition,
                            });
                        }
                    }
                    StepAction::Route(RouterDispatch {
                        router: Arc::clone(router),
                        routes,
                        incoming: incoming.get(def.id.as_str()).cloned().unwrap_or_default(),
                    })
                }
            }
        };
        let retry = match &def.retry_policy {
            Some(policy) => Arc::new(policy.clone()),
            None => Arc::clone(&shared_policy),
        };
        steps.insert(
            def.id.clone(),
            CompiledStep {
                label: def.label.clone(),
                action,
                retry,
            },
        );
    }

    Ok(CompiledPipeline {
        steps: Arc::new(steps),
        start,
        end,
    })
}
