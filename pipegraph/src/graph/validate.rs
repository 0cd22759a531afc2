//! Structural checks over the edge set: cycle detection and reachability.
//!
//! Both work on an adjacency map built once by the builder. Traversal order follows the
//! order nodes and edges were declared, so the reported node is deterministic.

use std::collections::{HashMap, HashSet, VecDeque};

/// Successor ids per node id, in edge declaration order.
pub(super) type Adjacency<'a> = HashMap<&'a str, Vec<&'a str>>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Three-colour DFS over every node. Returns a node that lies on a cycle, if any.
///
/// A gray node is on the current DFS path; reaching one again closes a cycle through it.
pub(super) fn find_cycle(node_ids: &[&str], adjacency: &Adjacency<'_>) -> Option<String> {
    let mut color: HashMap<&str, Color> = node_ids.iter().map(|id| (*id, Color::White)).collect();

    for &root in node_ids {
        if color.get(root).copied() != Some(Color::White) {
            continue;
        }
        color.insert(root, Color::Gray);
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            match adjacency.get(node).and_then(|succ| succ.get(next)) {
                Some(&child) => {
                    frame.1 += 1;
                    match color.get(child).copied().unwrap_or(Color::White) {
                        Color::Gray => return Some(child.to_string()),
                        Color::White => {
                            color.insert(child, Color::Gray);
                            stack.push((child, 0));
                        }
                        Color::Black => {}
                    }
                }
                None => {
                    color.insert(node, Color::Black);
                    stack.pop();
                }
            }
        }
    }
    None
}

/// Breadth-first search from `start`; returns every node reachable from it, `start` included.
pub(super) fn reachable_from<'a>(start: &'a str, adjacency: &Adjacency<'a>) -> HashSet<&'a str> {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        if !reachable.insert(node) {
            continue;
        }
        for &successor in adjacency.get(node).into_iter().flatten() {
            if !reachable.contains(successor) {
                queue.push_back(successor);
            }
        }
    }
    reachable
}
