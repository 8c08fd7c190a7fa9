// src/config/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::config::model::{RawNetworkFile, RawNode, RawSettingsFile, Settings};
use crate::errors::{DdoptimError, Result};
use crate::network::{ChildLink, Network, NetworkMetadata, Node};
use crate::profiles::ProfileRegistry;

impl TryFrom<RawNetworkFile> for Network {
    type Error = DdoptimError;

    /// Structural checks only: ids, duplicates, dangling children, cycles.
    /// Field ranges are left to [`Network::validate`] so a file with a bad
    /// lead time still loads and can be fixed by an edit.
    fn try_from(raw: RawNetworkFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_network(&raw)?;

        let mut network = Network::new(NetworkMetadata::from(raw.metadata));
        let nodes = raw
            .nodes
            .into_iter()
            .map(node_from_raw)
            .collect::<Result<Vec<Node>>>()?;
        network.extend_nodes(nodes)?;

        debug!(nodes = network.len(), name = %network.metadata.name, "network built");
        Ok(network)
    }
}

impl TryFrom<RawSettingsFile> for Settings {
    type Error = DdoptimError;

    fn try_from(raw: RawSettingsFile) -> std::result::Result<Self, Self::Error> {
        let multiplier = raw.config.seasonal_multiplier;
        if !(multiplier > 0.0 && multiplier.is_finite()) {
            return Err(DdoptimError::ConfigError(format!(
                "[config].seasonal_multiplier must be > 0 (got {multiplier})"
            )));
        }

        let profiles = if raw.profile.is_empty() {
            ProfileRegistry::standard()
        } else {
            ProfileRegistry::new(raw.profile)?
        };

        Ok(Settings::new_unchecked(raw.config, profiles))
    }
}

fn node_from_raw(raw: RawNode) -> Result<Node> {
    let id = raw
        .id
        .ok_or_else(|| DdoptimError::LoadError("node without id".to_string()))?;

    let mut node = Node::new(id, raw.lead_time);
    if let Some(name) = raw.name.filter(|n| !n.is_empty()) {
        node.name = name;
    }
    if let Some(category) = raw.category {
        node.category = category;
    }
    node.children = raw
        .children
        .into_iter()
        .map(|c| ChildLink::new(c.id, c.quantity))
        .collect();
    node.independent_adu = raw.independent_adu;
    node.customer_tolerance = raw.customer_tolerance;
    node.has_buffer = raw.has_buffer;
    node.buffer_locked = raw.buffer_locked;
    node.buffer_rationale = raw.buffer_rationale;
    node.buffer_profile = raw.buffer_profile;
    node.moq = raw.moq;
    node.order_cycle = raw.order_cycle;
    node.unit_cost = raw.unit_cost;
    Ok(node)
}

fn validate_raw_network(raw: &RawNetworkFile) -> Result<()> {
    ensure_ids(raw)?;
    validate_children(raw)?;
    validate_dag(raw)?;
    Ok(())
}

fn ensure_ids(raw: &RawNetworkFile) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for (index, node) in raw.nodes.iter().enumerate() {
        let id = match node.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return Err(DdoptimError::LoadError(format!(
                    "node at index {index} is missing an 'id'"
                )));
            }
        };
        if !seen.insert(id) {
            return Err(DdoptimError::DuplicateNode(id.to_string()));
        }
    }
    Ok(())
}

fn validate_children(raw: &RawNetworkFile) -> Result<()> {
    let ids: HashSet<&str> = raw.nodes.iter().filter_map(|n| n.id.as_deref()).collect();

    for node in raw.nodes.iter() {
        let parent = node.id.as_deref().unwrap_or_default();
        for child in node.children.iter() {
            if !ids.contains(child.id.as_str()) {
                return Err(DdoptimError::OrphanChild {
                    parent: parent.to_string(),
                    child: child.id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_dag(raw: &RawNetworkFile) -> Result<()> {
    // Edge direction: parent -> child.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for node in raw.nodes.iter() {
        if let Some(id) = node.id.as_deref() {
            graph.add_node(id);
        }
    }

    for node in raw.nodes.iter() {
        let Some(parent) = node.id.as_deref() else {
            continue;
        };
        for child in node.children.iter() {
            graph.add_edge(parent, child.id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(DdoptimError::Cycle(vec![cycle.node_id().to_string()])),
    }
}
