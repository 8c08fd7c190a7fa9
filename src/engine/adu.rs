// src/engine/adu.rs

//! Top-down demand propagation.
//!
//! `calculated_adu = adjusted_independent_adu + Σ parent.calculated_adu × quantity`,
//! evaluated in parent-before-child order so every parent is final before
//! any of its children is visited.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::errors::Result;
use crate::network::{Network, NodeId, topological_order};

/// Run the ADU pass over the whole network.
///
/// The order is computed before any field is written, so a cycle leaves the
/// network exactly as it was.
pub fn propagate_adu(network: &mut Network, seasonal_multiplier: f64) -> Result<()> {
    let order = topological_order(network)?;
    network.rebuild_parents();
    propagate_adu_in_order(network, &order, seasonal_multiplier);
    Ok(())
}

/// ADU pass over a precomputed parent-first order.
pub(crate) fn propagate_adu_in_order(
    network: &mut Network,
    order: &[NodeId],
    seasonal_multiplier: f64,
) {
    for node in network.nodes_mut() {
        node.derived.adjusted_independent_adu = if node.independent_adu > 0.0 {
            node.independent_adu * seasonal_multiplier
        } else {
            0.0
        };
    }

    let mut totals: HashMap<NodeId, f64> = HashMap::with_capacity(order.len());

    for id in order {
        let Some(node) = network.get_node(id) else {
            continue;
        };

        let dependent: f64 = node
            .parents()
            .iter()
            .map(|p| totals.get(&p.id).copied().unwrap_or(0.0) * p.quantity)
            .sum();
        let total = node.derived.adjusted_independent_adu + dependent;

        debug!(
            node = %id,
            independent = node.derived.adjusted_independent_adu,
            dependent,
            total,
            "calculated ADU"
        );
        totals.insert(id.clone(), total);
    }

    for node in network.nodes_mut() {
        node.derived.calculated_adu = totals.get(&node.id).copied();
    }

    info!(
        nodes = order.len(),
        seasonal_multiplier, "ADU propagation complete"
    );
}
