// src/network/order.rs

//! Linear orderings of a [`Network`] consistent with its edges.
//!
//! Every ordering is computed from the child lists, so a network whose parent
//! index is stale still orders correctly. Dangling child references are
//! ignored here; [`Network::validate`] reports them.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::errors::{DdoptimError, Result};
use crate::network::graph::Network;
use crate::network::node::NodeId;

/// Parents before children, via Kahn's algorithm.
///
/// In-degree is the number of distinct parents of a node. The queue is seeded
/// with in-degree zero nodes in network order, which makes the result
/// deterministic for a given network. If fewer ids than nodes come out, the
/// leftover nodes sit on or behind a cycle and are returned in the error.
pub fn topological_order(network: &Network) -> Result<Vec<NodeId>> {
    let mut in_degree: HashMap<&str, usize> = network.ids().map(|id| (id, 0)).collect();

    for node in network.nodes() {
        let mut seen: HashSet<&str> = HashSet::new();
        for child in node.children.iter() {
            if !seen.insert(child.id.as_str()) {
                continue;
            }
            if let Some(degree) = in_degree.get_mut(child.id.as_str()) {
                *degree += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = network
        .ids()
        .filter(|id| in_degree.get(id).copied() == Some(0))
        .collect();

    let mut order: Vec<NodeId> = Vec::with_capacity(network.len());
    let mut emitted: HashSet<&str> = HashSet::with_capacity(network.len());

    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        emitted.insert(id);

        let mut seen: HashSet<&str> = HashSet::new();
        for child in network.children(id) {
            if !seen.insert(child.id.as_str()) {
                continue;
            }
            if let Some(degree) = in_degree.get_mut(child.id.as_str()) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(child.id.as_str());
                }
            }
        }
    }

    if order.len() < network.len() {
        let stuck: Vec<NodeId> = network
            .ids()
            .filter(|id| !emitted.contains(id))
            .map(|id| id.to_string())
            .collect();
        warn!(?stuck, "cycle detected while ordering network");
        return Err(DdoptimError::Cycle(stuck));
    }

    debug!(nodes = order.len(), "computed topological order");
    Ok(order)
}

/// Children before parents. Used by the bottom-up lead-time passes.
pub fn reverse_topological_order(network: &Network) -> Result<Vec<NodeId>> {
    let mut order = topological_order(network)?;
    order.reverse();
    Ok(order)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first ordering where every node appears after all of its ancestors.
///
/// Traversal starts from each id in `starts` (then from every remaining node,
/// so the result always covers the whole network) and walks parent links
/// before emitting a node. Entering from a leaf therefore still emits the
/// whole ancestor chain first. Parent links are derived from child lists on
/// the fly.
pub fn parent_first_order<'a>(
    network: &Network,
    starts: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<NodeId>> {
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::with_capacity(network.len());
    for node in network.nodes() {
        for child in node.children.iter() {
            if network.contains(&child.id) {
                parents
                    .entry(child.id.as_str())
                    .or_default()
                    .push(node.id.as_str());
            }
        }
    }

    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(network.len());
    let mut order: Vec<NodeId> = Vec::with_capacity(network.len());

    let start_ids: Vec<&str> = starts
        .into_iter()
        .filter_map(|id| network.get_node(id).map(|n| n.id.as_str()))
        .chain(network.ids())
        .collect();

    for start in start_ids {
        if marks.contains_key(start) {
            continue;
        }

        // (node, index of the next parent to visit)
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        marks.insert(start, Mark::InProgress);

        while let Some(top) = stack.last_mut() {
            let (id, next) = *top;
            let node_parents = parents.get(id).map(|p| p.as_slice()).unwrap_or(&[]);

            if let Some(&parent) = node_parents.get(next) {
                top.1 += 1;
                match marks.get(parent) {
                    None => {
                        marks.insert(parent, Mark::InProgress);
                        stack.push((parent, 0));
                    }
                    Some(Mark::InProgress) => {
                        let cycle: Vec<NodeId> = stack
                            .iter()
                            .map(|(n, _)| n.to_string())
                            .skip_while(|n| n != parent)
                            .collect();
                        warn!(?cycle, "cycle detected in parent-first traversal");
                        return Err(DdoptimError::Cycle(cycle));
                    }
                    Some(Mark::Done) => {}
                }
            } else {
                marks.insert(id, Mark::Done);
                order.push(id.to_string());
                stack.pop();
            }
        }
    }

    debug!(nodes = order.len(), "computed parent-first order");
    Ok(order)
}
