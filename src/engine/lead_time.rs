// src/engine/lead_time.rs

//! Bottom-up longest-path lead times.
//!
//! - CLT ignores buffers: `clt = lead_time + max(child.clt)`.
//! - DLT stops at buffers: buffered children are left out of the max, so a
//!   node whose children are all buffered (or that has none) gets
//!   `dlt = lead_time`.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::errors::Result;
use crate::network::{Network, NodeId, reverse_topological_order};

/// Recompute CLT for every node.
pub fn compute_clt(network: &mut Network) -> Result<()> {
    let order = reverse_topological_order(network)?;
    compute_clt_in_order(network, &order);
    Ok(())
}

/// Recompute DLT for every node from the current buffer flags.
pub fn compute_dlt(network: &mut Network) -> Result<()> {
    let order = reverse_topological_order(network)?;
    compute_dlt_in_order(network, &order);
    Ok(())
}

pub(crate) fn compute_clt_in_order(network: &mut Network, bottom_up: &[NodeId]) {
    let values = longest_paths(network, bottom_up, false);
    for node in network.nodes_mut() {
        node.derived.clt = values.get(&node.id).copied();
    }
    info!(nodes = values.len(), "CLT calculation complete");
}

pub(crate) fn compute_dlt_in_order(network: &mut Network, bottom_up: &[NodeId]) {
    let values = longest_paths(network, bottom_up, true);
    for node in network.nodes_mut() {
        node.derived.dlt = values.get(&node.id).copied();
    }
    info!(nodes = values.len(), "DLT calculation complete");
}

/// Longest path from any leaf up to each node, visiting children first.
///
/// With `decouple_at_buffers`, a buffered child contributes nothing to its
/// parent's path.
fn longest_paths(
    network: &Network,
    bottom_up: &[NodeId],
    decouple_at_buffers: bool,
) -> HashMap<NodeId, f64> {
    let mut values: HashMap<NodeId, f64> = HashMap::with_capacity(bottom_up.len());

    for id in bottom_up {
        let Some(node) = network.get_node(id) else {
            continue;
        };

        let mut upstream = 0.0_f64;
        let mut buffered_children = 0usize;
        for child in node.children.iter() {
            let Some(child_node) = network.get_node(&child.id) else {
                continue;
            };
            if decouple_at_buffers && child_node.has_buffer {
                buffered_children += 1;
                continue;
            }
            if let Some(&v) = values.get(&child.id) {
                upstream = upstream.max(v);
            }
        }

        let value = node.lead_time + upstream;
        debug!(
            node = %id,
            lead_time = node.lead_time,
            upstream,
            buffered_children,
            value,
            decoupled = decouple_at_buffers,
            "lead time aggregated"
        );
        values.insert(id.clone(), value);
    }

    values
}
