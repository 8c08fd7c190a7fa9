// src/engine/metrics.rs

use crate::network::Network;

/// Network-wide indicators derived from an up-to-date network.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetworkMetrics {
    pub buffer_count: usize,
    pub total_inventory_value: f64,
    /// Sum of `missing_customer_lead_time` over customer-facing nodes.
    pub total_missing_customer_lead_time: f64,
    /// ADU-weighted mean of `lt_exceeding` over customer-facing nodes that
    /// have a positive tolerance; 0 when there are none.
    pub average_lt_exceeding: f64,
}

impl NetworkMetrics {
    pub fn from_network(network: &Network) -> Self {
        let mut metrics = NetworkMetrics::default();
        let mut weighted_exceeding = 0.0;
        let mut weight = 0.0;

        for node in network.nodes() {
            if node.has_buffer {
                if let Some(sizing) = &node.derived.buffer_sizing {
                    metrics.buffer_count += 1;
                    metrics.total_inventory_value += sizing.inventory_value;
                }
            }

            if !node.is_customer_facing() {
                continue;
            }
            if let Some(missing) = node.derived.missing_customer_lead_time {
                metrics.total_missing_customer_lead_time += missing;
            }
            if node.effective_tolerance() > 0.0 {
                if let (Some(exceeding), Some(adu)) =
                    (node.derived.lt_exceeding, node.derived.calculated_adu)
                {
                    weighted_exceeding += exceeding * adu;
                    weight += adu;
                }
            }
        }

        if weight > 0.0 {
            metrics.average_lt_exceeding = weighted_exceeding / weight;
        }
        metrics
    }

    /// Every customer requirement is met.
    pub fn tolerances_met(&self) -> bool {
        self.total_missing_customer_lead_time <= 0.0
    }
}
