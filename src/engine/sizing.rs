// src/engine/sizing.rs

//! Red/yellow/green zone sizing for buffered nodes.
//!
//! The order of the steps matters: the red zone's security term is derived
//! from the delay-based part of green (`green_delay`), not from the final
//! green zone and not from yellow. It stays that way even when MOQ or the
//! order cycle make green larger.

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::network::{Network, Node};
use crate::profiles::ProfileRegistry;

/// Zones and levels for one buffered node. Integer-valued except
/// `inventory_value`, which is rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferSizing {
    /// Lead-time demand: `round(ADU × DLT)`.
    pub yellow: f64,
    /// Order size: `max(green_delay, green_moq, green_cycle)`.
    pub green: f64,
    /// Safety stock: `red_base + red_security`.
    pub red: f64,

    pub top_of_red: f64,
    pub top_of_yellow: f64,
    pub top_of_green: f64,
    /// `round(red + green / 2)`.
    pub average_stock: f64,
    pub inventory_value: f64,

    pub lead_time_factor: f64,
    pub variability_factor: f64,
    pub green_delay: f64,
    pub green_moq: f64,
    pub green_cycle: f64,
    pub red_base: f64,
    pub red_security: f64,
}

/// Totals returned by [`size_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizingSummary {
    pub buffer_count: usize,
    pub total_inventory_value: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Size one node in place.
///
/// Clears the sizing when the node is not buffered or when ADU, DLT or the
/// profile key is missing; those cases are skips, not errors. A profile key
/// absent from `registry` is an error and leaves the node untouched.
pub fn size_buffer(node: &mut Node, registry: &ProfileRegistry) -> Result<()> {
    if !node.has_buffer {
        node.derived.buffer_sizing = None;
        return Ok(());
    }

    let Some(key) = node.buffer_profile.as_ref() else {
        warn!(node = %node.id, "cannot size buffer: no buffer profile");
        node.derived.buffer_sizing = None;
        return Ok(());
    };
    let profile = registry.require(&node.id, key)?;

    let (adu, dlt) = match (node.derived.calculated_adu, node.derived.dlt) {
        (Some(adu), Some(dlt)) if adu > 0.0 && dlt > 0.0 => (adu, dlt),
        (adu, dlt) => {
            warn!(node = %node.id, ?adu, ?dlt, "cannot size buffer: missing ADU or DLT");
            node.derived.buffer_sizing = None;
            return Ok(());
        }
    };

    let yellow = (adu * dlt).round();

    let lead_time_factor = profile.lead_time_factor(dlt);
    let green_delay = (yellow * lead_time_factor).round();
    let green_moq = node.moq;
    let green_cycle = (adu * node.order_cycle).round();
    let green = green_delay.max(green_moq).max(green_cycle);

    let variability_factor = profile.variability_factor;
    let red_base = green_delay;
    let red_security = (red_base * variability_factor).round();
    let red = red_base + red_security;

    let top_of_red = red;
    let top_of_yellow = red + yellow;
    let top_of_green = red + yellow + green;
    let average_stock = (red + green / 2.0).round();
    let inventory_value = round2(average_stock * node.unit_cost);

    debug!(
        node = %node.id,
        red,
        yellow,
        green,
        average_stock,
        inventory_value,
        "buffer sized"
    );

    node.derived.buffer_sizing = Some(BufferSizing {
        yellow,
        green,
        red,
        top_of_red,
        top_of_yellow,
        top_of_green,
        average_stock,
        inventory_value,
        lead_time_factor,
        variability_factor,
        green_delay,
        green_moq,
        green_cycle,
        red_base,
        red_security,
    });
    Ok(())
}

/// Size every node; unbuffered nodes get their sizing cleared.
///
/// Profile keys of buffered nodes are checked up front so an unknown key
/// fails the whole call before any node is touched.
pub fn size_all(network: &mut Network, registry: &ProfileRegistry) -> Result<SizingSummary> {
    for node in network.nodes().filter(|n| n.has_buffer) {
        if let Some(key) = &node.buffer_profile {
            registry.require(&node.id, key)?;
        }
    }

    let mut summary = SizingSummary::default();
    for node in network.nodes_mut() {
        size_buffer(node, registry)?;
        if let Some(sizing) = &node.derived.buffer_sizing {
            summary.buffer_count += 1;
            summary.total_inventory_value += sizing.inventory_value;
        }
    }

    info!(
        buffers = summary.buffer_count,
        total_inventory_value = summary.total_inventory_value,
        "buffer sizing complete"
    );
    Ok(summary)
}
