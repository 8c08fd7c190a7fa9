// src/engine/delivery.rs

//! Delivery lead time for customer-facing nodes.
//!
//! A buffered node ships from stock (delivery time 0); otherwise the customer
//! waits the node's DLT. The gap to the tolerance is split into the missing
//! part (late) and the exceeding part (margin).

use tracing::{debug, info};

use crate::network::{Network, Node};

/// Recompute delivery fields for one node.
pub fn compute_node_delivery(node: &mut Node) {
    if !node.is_customer_facing() {
        node.derived.delivery_lead_time = None;
        node.derived.missing_customer_lead_time = None;
        node.derived.lt_exceeding = None;
        return;
    }

    let delivery = if node.has_buffer {
        0.0
    } else {
        node.derived.dlt.unwrap_or(0.0)
    };
    let tolerance = node.effective_tolerance();

    node.derived.delivery_lead_time = Some(delivery);
    node.derived.missing_customer_lead_time = Some((delivery - tolerance).max(0.0));
    node.derived.lt_exceeding = Some((tolerance - delivery).max(0.0));

    debug!(
        node = %node.id,
        delivery,
        tolerance,
        missing = node.derived.missing_customer_lead_time,
        exceeding = node.derived.lt_exceeding,
        "delivery lead time"
    );
}

/// Recompute delivery fields for every node.
pub fn compute_delivery(network: &mut Network) {
    let mut customer_facing = 0usize;
    for node in network.nodes_mut() {
        compute_node_delivery(node);
        if node.is_customer_facing() {
            customer_facing += 1;
        }
    }
    info!(customer_facing, "delivery lead time calculated");
}
